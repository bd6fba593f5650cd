use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::production::Production;
use crate::symbol::{GrammarElement, Terminal};

/// A canonical LR(1) item: a production, a dot position within its
/// right-hand side, and a single lookahead terminal (§3). Unlike LALR
/// construction, the lookahead is carried directly on the item rather than
/// merged into a per-state lookahead set (see DESIGN.md's Resolved Open
/// Question on the canonical-vs-LALR split).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LRItem<T> {
    pub production_id: u32,
    pub dot: usize,
    pub lookahead: Terminal<T>,
}

impl<T> LRItem<T> {
    pub fn new(production_id: u32, dot: usize, lookahead: Terminal<T>) -> Self {
        Self {
            production_id,
            dot,
            lookahead,
        }
    }

    pub fn start(production_id: u32, lookahead: Terminal<T>) -> Self {
        Self::new(production_id, 0, lookahead)
    }

    pub fn is_complete(&self, production: &Production<T>) -> bool {
        self.dot >= production.len()
    }

    pub fn symbol_after_dot<'p>(
        &self,
        production: &'p Production<T>,
    ) -> Option<&'p GrammarElement<T>> {
        production.rhs.get(self.dot)
    }

    pub fn symbols_after_dot<'p>(&self, production: &'p Production<T>) -> &'p [GrammarElement<T>] {
        &production.rhs[self.dot.min(production.len())..]
    }

    pub fn advanced(&self) -> Self
    where
        T: Clone,
    {
        Self {
            production_id: self.production_id,
            dot: self.dot + 1,
            lookahead: self.lookahead.clone(),
        }
    }
}

impl<T: fmt::Display> LRItem<T> {
    pub fn display<'p>(&self, production: &'p Production<T>) -> ItemDisplay<'_, 'p, T> {
        ItemDisplay {
            item: self,
            production,
        }
    }
}

/// Helper for printing an item alongside the production it indexes into,
/// since `LRItem` alone knows only a numeric `production_id`.
pub struct ItemDisplay<'i, 'p, T> {
    item: &'i LRItem<T>,
    production: &'p Production<T>,
}

impl<'i, 'p, T: fmt::Display> fmt::Display for ItemDisplay<'i, 'p, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ->", self.production.lhs)?;
        for (i, element) in self.production.rhs.iter().enumerate() {
            if i == self.item.dot {
                write!(f, " .")?;
            }
            write!(f, " {}", element)?;
        }
        if self.item.dot >= self.production.rhs.len() {
            write!(f, " .")?;
        }
        write!(f, ", {}", self.item.lookahead)
    }
}

/// A set of LR(1) items sharing one automaton state (§3). Ordered so that
/// two states built via different closure orders but containing the same
/// items compare equal and hash identically, which state-merging in
/// [`crate::graph`] depends on.
pub type ItemSet<T> = BTreeSet<LRItem<T>>;
