use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::grammar::Grammar;
use crate::item::{ItemSet, LRItem};
use crate::sets::FirstSets;
use crate::symbol::GrammarElement;

/// Closure of a set of LR(1) items under the grammar's productions (§4.C):
/// repeatedly adds, for every item with the dot before a non-terminal `B`,
/// one item per `B`-production with dot at zero and lookahead taken from
/// FIRST of the symbols following `B` (folding in the original item's own
/// lookahead when that tail can vanish).
pub fn closure<T>(grammar: &Grammar<T>, first_sets: &FirstSets<T>, items: ItemSet<T>) -> ItemSet<T>
where
    T: Clone + Ord + fmt::Debug,
{
    let mut items = items;
    let mut worklist: VecDeque<LRItem<T>> = items.iter().cloned().collect();
    while let Some(item) = worklist.pop_front() {
        let production = grammar.production(item.production_id);
        let Some(GrammarElement::NonTerminal { non_terminal, .. }) =
            item.symbol_after_dot(production)
        else {
            continue;
        };
        let tail = item.symbols_after_dot(production);
        let tail = &tail[1.min(tail.len())..];
        let lookaheads = first_sets.of_sequence(tail, &item.lookahead);
        for &candidate_id in grammar.production_ids_for(non_terminal) {
            for lookahead in &lookaheads {
                let new_item = LRItem::start(candidate_id, lookahead.clone());
                if items.insert(new_item.clone()) {
                    worklist.push_back(new_item);
                }
            }
        }
    }
    items
}

/// GOTO(I, X): the closure of every item in `items` advanced past `symbol`,
/// restricted to items whose dotted symbol is exactly `symbol` (§4.C).
pub fn goto<T>(
    grammar: &Grammar<T>,
    first_sets: &FirstSets<T>,
    items: &ItemSet<T>,
    symbol: &GrammarElement<T>,
) -> ItemSet<T>
where
    T: Clone + Ord + fmt::Debug,
{
    let mut moved: ItemSet<T> = ItemSet::new();
    for item in items {
        let production = grammar.production(item.production_id);
        if item.symbol_after_dot(production) == Some(symbol) {
            moved.insert(item.advanced());
        }
    }
    closure(grammar, first_sets, moved)
}

/// The canonical collection of LR(1) states together with their GOTO edges
/// (§4.D). States are numbered in the order they are first discovered by a
/// breadth-first exploration starting from state 0, so construction is
/// deterministic regardless of iteration order over sets.
pub struct StateGraph<T> {
    pub states: Vec<ItemSet<T>>,
    pub transitions: BTreeMap<(usize, GrammarElement<T>), usize>,
}

impl<T> StateGraph<T>
where
    T: Clone + Ord + fmt::Debug,
{
    pub fn build(grammar: &Grammar<T>, first_sets: &FirstSets<T>) -> Self {
        let start_item = LRItem::start(grammar.augmented_start_id(), grammar.end_of_input());
        let mut start_set = ItemSet::new();
        start_set.insert(start_item);
        let start_state = closure(grammar, first_sets, start_set);

        let mut states: Vec<ItemSet<T>> = vec![start_state.clone()];
        let mut index_of: BTreeMap<ItemSet<T>, usize> = BTreeMap::new();
        index_of.insert(start_state, 0);
        let mut transitions: BTreeMap<(usize, GrammarElement<T>), usize> = BTreeMap::new();

        let mut queue: VecDeque<usize> = VecDeque::new();
        queue.push_back(0);

        while let Some(state_id) = queue.pop_front() {
            let symbols = outgoing_symbols(grammar, &states[state_id]);
            for symbol in symbols {
                let target = goto(grammar, first_sets, &states[state_id], &symbol);
                if target.is_empty() {
                    continue;
                }
                let target_id = match index_of.get(&target) {
                    Some(&id) => id,
                    None => {
                        let id = states.len();
                        index_of.insert(target.clone(), id);
                        states.push(target);
                        queue.push_back(id);
                        id
                    }
                };
                transitions.insert((state_id, symbol), target_id);
            }
        }

        Self {
            states,
            transitions,
        }
    }
}

fn outgoing_symbols<T>(grammar: &Grammar<T>, items: &ItemSet<T>) -> Vec<GrammarElement<T>>
where
    T: Clone + Ord + fmt::Debug,
{
    let mut symbols: std::collections::BTreeSet<GrammarElement<T>> = std::collections::BTreeSet::new();
    for item in items {
        let production = grammar.production(item.production_id);
        if let Some(symbol) = item.symbol_after_dot(production) {
            symbols.insert(symbol.clone());
        }
    }
    symbols.into_iter().collect()
}
