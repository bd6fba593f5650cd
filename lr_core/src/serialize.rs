use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grammar::{Grammar, GrammarError};
use crate::production::Production;
use crate::symbol::{GrammarElement, NonTerminal, Terminal};
use crate::table::{Action, ParseTable};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug)]
pub enum SerializationError {
    UnsupportedVersion { found: u32, supported: u32 },
    Json(serde_json::Error),
    Grammar(GrammarError),
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SerializationError::UnsupportedVersion { found, supported } => write!(
                f,
                "unsupported table format version {} (this build reads version {})",
                found, supported
            ),
            SerializationError::Json(err) => write!(f, "malformed table document: {}", err),
            SerializationError::Grammar(err) => write!(f, "invalid embedded grammar: {}", err),
        }
    }
}

impl std::error::Error for SerializationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SerializationError::Json(err) => Some(err),
            SerializationError::Grammar(err) => Some(err),
            SerializationError::UnsupportedVersion { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        SerializationError::Json(err)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Document<T> {
    version: u32,
    grammar: DocGrammar<T>,
    action: Vec<DocActionRow<T>>,
    goto: Vec<DocGotoRow>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocGrammar<T> {
    start: String,
    end_of_input: T,
    productions: Vec<DocProduction<T>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocProduction<T> {
    id: u32,
    lhs: String,
    rhs: Vec<GrammarElement<T>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocActionRow<T> {
    state: usize,
    terminal: T,
    negated: bool,
    action: Action,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocGotoRow {
    state: usize,
    non_terminal: String,
    target: usize,
}

/// Renders a grammar and its built table to the versioned JSON document
/// described in §5. The embedded grammar lets a loader reject a document
/// whose terminal/non-terminal shapes no longer line up with the table that
/// was built from them, rather than trusting the table blindly.
pub fn to_json<T>(grammar: &Grammar<T>, table: &ParseTable<T>) -> Result<String, SerializationError>
where
    T: Clone + Ord + fmt::Debug + fmt::Display + Serialize,
{
    let productions = grammar
        .productions()
        .iter()
        .filter(|p| p.id != grammar.augmented_start_id())
        .map(|p: &Production<T>| DocProduction {
            id: p.id,
            lhs: p.lhs.name.to_string(),
            rhs: p.rhs.clone(),
        })
        .collect();

    let doc_grammar = DocGrammar {
        start: grammar.start().name.to_string(),
        end_of_input: grammar.end_of_input().value,
        productions,
    };

    let action = table
        .action_rows()
        .map(|((state, terminal), action)| DocActionRow {
            state: *state,
            terminal: terminal.value.clone(),
            negated: terminal.negated,
            action: action.clone(),
        })
        .collect();

    let goto = table
        .goto_rows()
        .map(|((state, element), target)| DocGotoRow {
            state: *state,
            non_terminal: element
                .as_non_terminal()
                .expect("goto row key is always a non-terminal")
                .name
                .to_string(),
            target: *target,
        })
        .collect();

    let document = Document {
        version: FORMAT_VERSION,
        grammar: doc_grammar,
        action,
        goto,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parses a document produced by [`to_json`], rejecting any format version
/// this build does not know how to read (§5) before looking at the rest of
/// the payload.
pub fn from_json<T>(text: &str) -> Result<(Grammar<T>, ParseTable<T>), SerializationError>
where
    T: Clone + Ord + fmt::Debug + fmt::Display + for<'de> Deserialize<'de>,
{
    let probe: VersionProbe = serde_json::from_str(text)?;
    if probe.version != FORMAT_VERSION {
        return Err(SerializationError::UnsupportedVersion {
            found: probe.version,
            supported: FORMAT_VERSION,
        });
    }

    let document: Document<T> = serde_json::from_str(text)?;

    let productions = document
        .grammar
        .productions
        .into_iter()
        .map(|p| Production::new(p.id, NonTerminal::new(p.lhs), p.rhs))
        .collect();
    let grammar = Grammar::new(
        NonTerminal::new(document.grammar.start),
        document.grammar.end_of_input,
        productions,
    )
    .map_err(SerializationError::Grammar)?;

    let mut action: BTreeMap<(usize, Terminal<T>), Action> = BTreeMap::new();
    for row in document.action {
        let terminal = Terminal {
            value: row.terminal,
            negated: row.negated,
        };
        action.insert((row.state, terminal), row.action);
    }

    let mut goto: BTreeMap<(usize, GrammarElement<T>), usize> = BTreeMap::new();
    for row in document.goto {
        let element = GrammarElement::non_terminal(row.non_terminal, true);
        goto.insert((row.state, element), row.target);
    }

    let state_count = action
        .keys()
        .map(|(state, _)| *state)
        .chain(goto.keys().map(|(state, _)| *state))
        .max()
        .map(|max| max + 1)
        .unwrap_or(0);

    let table = ParseTable::from_parts(action, goto, state_count);
    Ok((grammar, table))
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}
