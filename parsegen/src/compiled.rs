use std::fmt;

use serde::{Deserialize, Serialize};

use lr_core::serialize::SerializationError;
use lr_core::{Grammar, ParseTable};

use crate::symbol_table::{SymbolTable, TerminalId};

/// The file `parsegen build-table` writes and `parsegen parse` reads: the
/// versioned table document from `lr_core::serialize` plus the name table
/// needed to turn a user's literal terminals back into a lexicon.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompiledTable {
    symbols: SymbolTable,
    table_document: String,
}

#[derive(Debug)]
pub enum CompiledTableError {
    Json(serde_json::Error),
    Table(SerializationError),
}

impl fmt::Display for CompiledTableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompiledTableError::Json(err) => write!(f, "malformed compiled table file: {}", err),
            CompiledTableError::Table(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CompiledTableError {}

impl From<serde_json::Error> for CompiledTableError {
    fn from(err: serde_json::Error) -> Self {
        CompiledTableError::Json(err)
    }
}

impl From<SerializationError> for CompiledTableError {
    fn from(err: SerializationError) -> Self {
        CompiledTableError::Table(err)
    }
}

impl CompiledTable {
    pub fn build(
        grammar: &Grammar<TerminalId>,
        table: &ParseTable<TerminalId>,
        symbols: SymbolTable,
    ) -> Result<Self, CompiledTableError> {
        let table_document = lr_core::serialize::to_json(grammar, table)?;
        Ok(Self {
            symbols,
            table_document,
        })
    }

    pub fn to_json(&self) -> Result<String, CompiledTableError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, CompiledTableError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(self) -> Result<(Grammar<TerminalId>, ParseTable<TerminalId>, SymbolTable), CompiledTableError> {
        let (grammar, table) = lr_core::serialize::from_json::<TerminalId>(&self.table_document)?;
        Ok((grammar, table, self.symbols))
    }
}
