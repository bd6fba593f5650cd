use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A terminal handle cheap enough to be `Copy`, as `lexan`/`lr_core`/
/// `lr_parse` all require of their terminal-value type parameter. Grammar
/// files name terminals by string; this interns each distinct name to a
/// small index so the rest of the pipeline never has to carry `String`
/// around as a token tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TerminalId(pub u32);

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Maps terminal names to [`TerminalId`]s and back. Built once while
/// reading a grammar file and carried alongside the compiled table so the
/// `parse` subcommand can rebuild a lexicon and render diagnostics using
/// the names a user actually typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolTable {
    names: Vec<String>,
    ids: BTreeMap<String, TerminalId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            ids: BTreeMap::new(),
        }
    }

    pub fn intern(&mut self, name: &str) -> TerminalId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = TerminalId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    pub fn name(&self, id: TerminalId) -> &str {
        self.names
            .get(id.0 as usize)
            .map(String::as_str)
            .unwrap_or("?")
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, TerminalId)> {
        self.ids.iter().map(|(name, &id)| (name.as_str(), id))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
