use std::fmt;

use serde::Deserialize;

use lr_core::{Grammar, GrammarError, GrammarElement, NonTerminal, Production};

use crate::symbol_table::{SymbolTable, TerminalId};

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ElementSpec {
    Terminal {
        value: String,
        #[serde(default = "default_true")]
        keep: bool,
    },
    NegatedTerminal {
        value: String,
        #[serde(default = "default_true")]
        keep: bool,
    },
    NonTerminal {
        name: String,
        #[serde(default = "default_true")]
        keep: bool,
    },
}

#[derive(Debug, Deserialize)]
struct ProductionSpec {
    lhs: String,
    #[serde(default)]
    rhs: Vec<ElementSpec>,
}

/// The on-disk shape of a grammar passed to `parsegen build-table`: plain
/// strings for non-terminal names and terminal values, converted into
/// interned [`TerminalId`]s when building the in-memory [`Grammar`].
#[derive(Debug, Deserialize)]
pub struct GrammarFile {
    start: String,
    end_of_input: String,
    productions: Vec<ProductionSpec>,
}

#[derive(Debug)]
pub enum GrammarFileError {
    Json(serde_json::Error),
    Grammar(GrammarError),
}

impl fmt::Display for GrammarFileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GrammarFileError::Json(err) => write!(f, "malformed grammar file: {}", err),
            GrammarFileError::Grammar(err) => write!(f, "invalid grammar: {}", err),
        }
    }
}

impl std::error::Error for GrammarFileError {}

impl From<serde_json::Error> for GrammarFileError {
    fn from(err: serde_json::Error) -> Self {
        GrammarFileError::Json(err)
    }
}

impl GrammarFile {
    pub fn parse(text: &str) -> Result<Self, GrammarFileError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn into_grammar(self) -> Result<(Grammar<TerminalId>, SymbolTable), GrammarFileError> {
        let mut symbols = SymbolTable::new();
        let end_of_input = symbols.intern(&self.end_of_input);

        let mut productions = Vec::with_capacity(self.productions.len());
        for (i, spec) in self.productions.into_iter().enumerate() {
            let rhs = spec
                .rhs
                .into_iter()
                .map(|element| match element {
                    ElementSpec::Terminal { value, keep } => {
                        GrammarElement::terminal(symbols.intern(&value), keep)
                    }
                    ElementSpec::NegatedTerminal { value, keep } => {
                        GrammarElement::negated_terminal(symbols.intern(&value), keep)
                    }
                    ElementSpec::NonTerminal { name, keep } => {
                        GrammarElement::non_terminal(name, keep)
                    }
                })
                .collect();
            productions.push(Production::new(i as u32, NonTerminal::new(spec.lhs), rhs));
        }

        let grammar = Grammar::new(NonTerminal::new(self.start), end_of_input, productions)
            .map_err(GrammarFileError::Grammar)?;
        Ok((grammar, symbols))
    }
}
