use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::grammar::Grammar;
use crate::graph::StateGraph;
use crate::item::ItemSet;
use crate::sets::FirstSets;
use crate::symbol::{GrammarElement, Terminal};

/// What the driver does on a given `(state, lookahead)` cell (§4.E).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Shift(usize),
    Reduce(u32),
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "shift {}", state),
            Action::Reduce(production) => write!(f, "reduce {}", production),
            Action::Accept => write!(f, "accept"),
        }
    }
}

/// The small vector most cells resolve to: at most one action. It only ever
/// holds more than one entry transiently, while [`ParseTable::build`] is
/// still accumulating candidates for a cell before deciding whether that
/// cell is a genuine conflict.
type ActionSlot = SmallVec<[Action; 2]>;

/// A shift/reduce or reduce/reduce conflict discovered while assembling the
/// ACTION table (§4.E). Carries enough of the offending state to let a
/// caller print a useful diagnostic without re-deriving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict<T> {
    pub state: usize,
    pub lookahead: Terminal<T>,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictError<T> {
    pub conflicts: Vec<Conflict<T>>,
}

impl<T: fmt::Display> fmt::Display for ConflictError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} parse table conflict(s):", self.conflicts.len())?;
        for conflict in &self.conflicts {
            write!(f, "  state {} on {}: ", conflict.state, conflict.lookahead)?;
            let rendered: Vec<String> = conflict.actions.iter().map(|a| a.to_string()).collect();
            writeln!(f, "{}", rendered.join(" vs "))?;
        }
        Ok(())
    }
}

impl<T: fmt::Display + fmt::Debug> std::error::Error for ConflictError<T> {}

/// The assembled ACTION/GOTO tables driving `lr_parse`'s shift-reduce loop
/// (§4.E, §4.F). ACTION lookups prefer an exact terminal match over a
/// negated one in the same state, matching the "exact beats negated" rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseTable<T> {
    action: BTreeMap<(usize, Terminal<T>), Action>,
    goto: BTreeMap<(usize, GrammarElement<T>), usize>,
    state_count: usize,
}

impl<T> ParseTable<T>
where
    T: Clone + Ord + fmt::Debug + fmt::Display,
{
    pub fn build(grammar: &Grammar<T>, first_sets: &FirstSets<T>) -> Result<Self, ConflictError<T>> {
        let graph = StateGraph::build(grammar, first_sets);
        Self::from_graph(grammar, &graph)
    }

    fn from_graph(grammar: &Grammar<T>, graph: &StateGraph<T>) -> Result<Self, ConflictError<T>> {
        let mut slots: BTreeMap<(usize, Terminal<T>), ActionSlot> = BTreeMap::new();
        let mut goto: BTreeMap<(usize, GrammarElement<T>), usize> = BTreeMap::new();

        for (&(state, ref symbol), &target) in &graph.transitions {
            if symbol.is_terminal() {
                let terminal = symbol.as_terminal().unwrap().clone();
                slots
                    .entry((state, terminal))
                    .or_default()
                    .push(Action::Shift(target));
            } else {
                goto.insert((state, symbol.clone()), target);
            }
        }

        for (state_id, items) in graph.states.iter().enumerate() {
            reduce_actions(grammar, state_id, items, &mut slots);
        }

        let mut action: BTreeMap<(usize, Terminal<T>), Action> = BTreeMap::new();
        let mut conflicts = Vec::new();
        for (key, mut slot) in slots {
            dedup_slot(&mut slot);
            if slot.len() == 1 {
                action.insert(key, slot.into_iter().next().unwrap());
            } else {
                conflicts.push(Conflict {
                    state: key.0,
                    lookahead: key.1,
                    actions: slot.into_vec(),
                });
            }
        }

        if !conflicts.is_empty() {
            return Err(ConflictError { conflicts });
        }

        Ok(Self {
            action,
            goto,
            state_count: graph.states.len(),
        })
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    /// Reassembles a table from its raw cells, used when loading a
    /// previously-serialized table (§5) without re-running closure.
    pub(crate) fn from_parts(
        action: BTreeMap<(usize, Terminal<T>), Action>,
        goto: BTreeMap<(usize, GrammarElement<T>), usize>,
        state_count: usize,
    ) -> Self {
        Self {
            action,
            goto,
            state_count,
        }
    }

    pub(crate) fn action_rows(&self) -> impl Iterator<Item = (&(usize, Terminal<T>), &Action)> {
        self.action.iter()
    }

    pub(crate) fn goto_rows(&self) -> impl Iterator<Item = (&(usize, GrammarElement<T>), &usize)> {
        self.goto.iter()
    }

    /// ACTION lookup for `(state, terminal)`: an exact match on `terminal`
    /// wins over any negated entry covering it (§4.E).
    pub fn action(&self, state: usize, terminal: &T) -> Option<&Action> {
        let exact = Terminal::exact(terminal.clone());
        if let Some(action) = self.action.get(&(state, exact)) {
            return Some(action);
        }
        self.action
            .iter()
            .find(|((s, t), _)| *s == state && t.negated && t.value != *terminal)
            .map(|(_, action)| action)
    }

    /// Whether any ACTION row, in any state, is keyed on `terminal` (exact
    /// or negated) — i.e. whether the grammar this table was built from
    /// ever mentions it. Lets a driver distinguish "this token's type has
    /// no matching grammar terminal at all" (§6's `ParserTokenDefinition`
    /// lookup) from "this terminal is defined but not expected here".
    pub fn defines_terminal(&self, terminal: &T) -> bool {
        self.action.keys().any(|(_, t)| t.value == *terminal)
    }

    pub fn goto(&self, state: usize, non_terminal: &crate::symbol::NonTerminal) -> Option<usize> {
        // `keep` is ignored by `GrammarElement`'s `Ord`, so any value works
        // as a lookup key here regardless of what the GOTO edge was built
        // with.
        let key = GrammarElement::non_terminal(non_terminal.name.clone(), true);
        self.goto.get(&(state, key)).copied()
    }
}

fn dedup_slot(slot: &mut ActionSlot) {
    slot.sort_by_key(|a| match a {
        Action::Shift(s) => (0u8, *s as u32),
        Action::Reduce(p) => (1u8, *p),
        Action::Accept => (2u8, 0),
    });
    slot.dedup();
}

fn reduce_actions<T>(
    grammar: &Grammar<T>,
    state_id: usize,
    items: &ItemSet<T>,
    slots: &mut BTreeMap<(usize, Terminal<T>), ActionSlot>,
) where
    T: Clone + Ord + fmt::Debug,
{
    for item in items {
        let production = grammar.production(item.production_id);
        if !item.is_complete(production) {
            continue;
        }
        if item.production_id == grammar.augmented_start_id() {
            slots
                .entry((state_id, item.lookahead.clone()))
                .or_default()
                .push(Action::Accept);
        } else {
            slots
                .entry((state_id, item.lookahead.clone()))
                .or_default()
                .push(Action::Reduce(item.production_id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::production::Production;
    use crate::symbol::{GrammarElement, NonTerminal};

    fn sum_grammar() -> Grammar<char> {
        // S -> E
        // E -> E '+' T | T
        // T -> 'n'
        let productions = vec![
            Production::new(0, NonTerminal::new("S"), vec![GrammarElement::non_terminal("E", true)]),
            Production::new(
                1,
                NonTerminal::new("E"),
                vec![
                    GrammarElement::non_terminal("E", true),
                    GrammarElement::terminal('+', true),
                    GrammarElement::non_terminal("T", true),
                ],
            ),
            Production::new(2, NonTerminal::new("E"), vec![GrammarElement::non_terminal("T", true)]),
            Production::new(3, NonTerminal::new("T"), vec![GrammarElement::terminal('n', true)]),
        ];
        Grammar::new(NonTerminal::new("S"), '$', productions).unwrap()
    }

    #[test]
    fn builds_conflict_free_table_for_left_recursive_sum() {
        let grammar = sum_grammar();
        let first = FirstSets::compute(&grammar);
        let table = ParseTable::build(&grammar, &first).unwrap();
        assert!(table.state_count() > 1);
    }

    #[test]
    fn dangling_structure_produces_shift_reduce_conflict() {
        // S -> 'i' S | 'i' S 'e' S | 'a'   (classic dangling-else shape)
        let productions = vec![
            Production::new(
                0,
                NonTerminal::new("S"),
                vec![
                    GrammarElement::terminal('i', true),
                    GrammarElement::non_terminal("S", true),
                ],
            ),
            Production::new(
                1,
                NonTerminal::new("S"),
                vec![
                    GrammarElement::terminal('i', true),
                    GrammarElement::non_terminal("S", true),
                    GrammarElement::terminal('e', true),
                    GrammarElement::non_terminal("S", true),
                ],
            ),
            Production::new(2, NonTerminal::new("S"), vec![GrammarElement::terminal('a', true)]),
        ];
        let grammar = Grammar::new(NonTerminal::new("S"), '$', productions).unwrap();
        let first = FirstSets::compute(&grammar);
        let err = ParseTable::build(&grammar, &first).unwrap_err();
        assert!(err.conflicts.iter().any(|c| {
            c.actions.iter().any(|a| matches!(a, Action::Shift(_)))
                && c.actions.iter().any(|a| matches!(a, Action::Reduce(_)))
        }));
    }

    #[test]
    fn ambiguous_alternatives_produce_reduce_reduce_conflict() {
        // S -> A | B, A -> 'x', B -> 'x': both complete on lookahead '$'.
        let productions = vec![
            Production::new(0, NonTerminal::new("S"), vec![GrammarElement::non_terminal("A", true)]),
            Production::new(1, NonTerminal::new("S"), vec![GrammarElement::non_terminal("B", true)]),
            Production::new(2, NonTerminal::new("A"), vec![GrammarElement::terminal('x', true)]),
            Production::new(3, NonTerminal::new("B"), vec![GrammarElement::terminal('x', true)]),
        ];
        let grammar = Grammar::new(NonTerminal::new("S"), '$', productions).unwrap();
        let first = FirstSets::compute(&grammar);
        let err = ParseTable::build(&grammar, &first).unwrap_err();
        assert!(err
            .conflicts
            .iter()
            .any(|c| c.actions.len() == 2 && c.actions.iter().all(|a| matches!(a, Action::Reduce(_)))));
    }
}
