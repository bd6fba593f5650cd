use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use structopt::StructOpt;

mod actions;
mod compiled;
mod grammar_file;
mod symbol_table;

use actions::SExprActions;
use compiled::CompiledTable;
use grammar_file::GrammarFile;
use lr_core::{FirstSets, ParseTable};
use lr_parse::Parser;

fn with_changed_extension(path: &Path, new_extension: &str) -> PathBuf {
    let mut new_path = PathBuf::new();
    if let Some(dir) = path.parent() {
        new_path.push(dir);
    }
    new_path.push(path.file_stem().unwrap_or_default());
    new_path.set_extension(new_extension);
    new_path
}

fn die(message: impl std::fmt::Display, code: i32) -> ! {
    writeln!(std::io::stderr(), "{}", message).ok();
    std::process::exit(code);
}

#[derive(Debug, StructOpt)]
#[structopt(name = "parsegen", about = "Builds and drives canonical LR(1) parse tables")]
enum Command {
    /// Compile a grammar file into a parse table.
    BuildTable {
        /// Path to a JSON grammar description.
        #[structopt(parse(from_os_str))]
        grammar: PathBuf,
        /// Where to write the compiled table (defaults to the grammar's
        /// path with a `.lrtbl` extension).
        #[structopt(short, long, parse(from_os_str))]
        out: Option<PathBuf>,
        /// Overwrite the output file if it already exists.
        #[structopt(short, long)]
        force: bool,
    },
    /// Parse an input file against a previously compiled table.
    Parse {
        /// Path to a table produced by `build-table`.
        #[structopt(parse(from_os_str))]
        table: PathBuf,
        /// Path to the text to parse.
        #[structopt(parse(from_os_str))]
        input: PathBuf,
    },
}

fn main() {
    env_logger::init();
    match Command::from_args() {
        Command::BuildTable { grammar, out, force } => build_table(&grammar, out, force),
        Command::Parse { table, input } => parse(&table, &input),
    }
}

fn build_table(grammar_path: &Path, out: Option<PathBuf>, force: bool) {
    let out_path = out.unwrap_or_else(|| with_changed_extension(grammar_path, "lrtbl"));
    if out_path.exists() && !force {
        die(
            format!("{}: output file already exists", out_path.display()),
            2,
        );
    }

    let text = match fs::read_to_string(grammar_path) {
        Ok(text) => text,
        Err(err) => die(format!("error reading {}: {}", grammar_path.display(), err), 2),
    };

    let grammar_file = match GrammarFile::parse(&text) {
        Ok(g) => g,
        Err(err) => die(err, 2),
    };

    let (grammar, symbols) = match grammar_file.into_grammar() {
        Ok(pair) => pair,
        Err(err) => die(err, 2),
    };

    let first_sets = FirstSets::compute(&grammar);
    let table = match ParseTable::build(&grammar, &first_sets) {
        Ok(table) => table,
        Err(err) => die(err, 2),
    };

    let compiled = match CompiledTable::build(&grammar, &table, symbols) {
        Ok(compiled) => compiled,
        Err(err) => die(err, 2),
    };
    let json = match compiled.to_json() {
        Ok(json) => json,
        Err(err) => die(err, 2),
    };

    if let Err(err) = fs::write(&out_path, json) {
        die(format!("error writing {}: {}", out_path.display(), err), 2);
    }

    log::info!("wrote {} states to {}", table.state_count(), out_path.display());
}

fn parse(table_path: &Path, input_path: &Path) {
    let table_text = match fs::read_to_string(table_path) {
        Ok(text) => text,
        Err(err) => die(format!("error reading {}: {}", table_path.display(), err), 2),
    };
    let compiled = match CompiledTable::from_json(&table_text) {
        Ok(compiled) => compiled,
        Err(err) => die(err, 2),
    };
    let (grammar, table, symbols) = match compiled.load() {
        Ok(triple) => triple,
        Err(err) => die(err, 2),
    };

    let input_text = match fs::read_to_string(input_path) {
        Ok(text) => text,
        Err(err) => die(format!("error reading {}: {}", input_path.display(), err), 2),
    };

    let id_patterns: Vec<(symbol_table::TerminalId, String)> = symbols
        .entries()
        .map(|(name, id)| (id, format!("\\A{}", regex::escape(name))))
        .collect();
    let literal_lexemes: Vec<(symbol_table::TerminalId, &str)> = id_patterns
        .iter()
        .map(|(id, pattern)| (*id, pattern.as_str()))
        .collect();

    let end_marker = grammar.end_of_input().value;
    let skip_rules = [r"\A\s+"];
    let lexer = match lexan::LexicalAnalyzer::new(&literal_lexemes, &[], &skip_rules, end_marker) {
        Ok(lexer) => lexer,
        Err(err) => die(err, 2),
    };

    let token_stream = lexer.token_stream(input_text, input_path.to_string_lossy().to_string());
    let actions = SExprActions {
        grammar: &grammar,
        symbols: &symbols,
    };
    let parser = Parser::new(&table, actions);
    let lhs_names = |id: u32| grammar.production(id).lhs.clone();
    let rhs_lens = |id: u32| grammar.production(id).len();
    let rhs_keep = |id: u32| {
        grammar
            .production(id)
            .rhs
            .iter()
            .map(|element| element.keep())
            .collect::<Vec<bool>>()
    };

    match parser.parse(token_stream, &lhs_names, &rhs_lens, &rhs_keep) {
        Ok((tree, root)) => {
            println!("{}", tree.data(root));
        }
        Err(err) => die(err, 1),
    }
}
