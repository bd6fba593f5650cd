use std::fmt;

use serde::{Deserialize, Serialize};

use crate::symbol::{GrammarElement, NonTerminal};

/// A single grammar rule `lhs -> rhs` (§3). `id` is a dense index assigned
/// by [`crate::grammar::Grammar`] at construction time and is excluded from
/// equality: two productions with identical `lhs`/`rhs` but different ids
/// would otherwise never compare equal, which would defeat deduplication
/// when a grammar is assembled from generated and hand-written rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Production<T> {
    pub id: u32,
    pub lhs: NonTerminal,
    pub rhs: Vec<GrammarElement<T>>,
}

impl<T> Production<T> {
    pub fn new(id: u32, lhs: NonTerminal, rhs: Vec<GrammarElement<T>>) -> Self {
        Self { id, lhs, rhs }
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rhs.len()
    }
}

impl<T: PartialEq> PartialEq for Production<T> {
    fn eq(&self, other: &Self) -> bool {
        self.lhs == other.lhs && self.rhs == other.rhs
    }
}
impl<T: Eq> Eq for Production<T> {}

impl<T: fmt::Display> fmt::Display for Production<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        if self.rhs.is_empty() {
            write!(f, " ε")?;
        }
        for element in &self.rhs {
            write!(f, " {}", element)?;
        }
        Ok(())
    }
}
