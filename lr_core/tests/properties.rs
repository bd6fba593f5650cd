//! Universally-quantified properties of FIRST-set computation and closure
//! that a handful of hand-picked unit tests can't pin down: the work-list
//! fixed point is genuinely closed under its own derivation rule, grows
//! monotonically as alternatives are added, and closure is idempotent.

use proptest::prelude::*;

use lr_core::graph::closure;
use lr_core::item::{ItemSet, LRItem};
use lr_core::{FirstSets, Grammar, GrammarElement, NonTerminal, Production};

const NON_TERMINALS: [&str; 3] = ["A", "B", "C"];
const TERMINALS: [char; 4] = ['a', 'b', 'c', 'd'];

fn element_strategy() -> impl Strategy<Value = GrammarElement<char>> {
    prop_oneof![
        (0..TERMINALS.len()).prop_map(|i| GrammarElement::terminal(TERMINALS[i], true)),
        (0..NON_TERMINALS.len()).prop_map(|i| GrammarElement::non_terminal(NON_TERMINALS[i], true)),
    ]
}

/// A `(lhs index, rhs)` pair, cheap to turn into a [`Production`] once a
/// dense id has been assigned.
fn production_spec_strategy() -> impl Strategy<Value = (usize, Vec<GrammarElement<char>>)> {
    (
        0..NON_TERMINALS.len(),
        prop::collection::vec(element_strategy(), 0..4),
    )
}

fn grammar_strategy() -> impl Strategy<Value = Grammar<char>> {
    prop::collection::vec(production_spec_strategy(), 1..8).prop_map(|specs| {
        // The start symbol is whichever non-terminal the first generated
        // production defines, so `start` is always defined.
        let start_index = specs[0].0;
        let productions = specs
            .into_iter()
            .enumerate()
            .map(|(i, (lhs_index, rhs))| {
                Production::new(i as u32, NonTerminal::new(NON_TERMINALS[lhs_index]), rhs)
            })
            .collect();
        Grammar::new(NonTerminal::new(NON_TERMINALS[start_index]), '$', productions)
            .expect("arbitrary productions over A/B/C never collide with the reserved name or end marker")
    })
}

proptest! {
    /// For every production `lhs -> rhs`, the rule FIRST derives from it
    /// (terminals contribute themselves, non-terminals contribute their own
    /// FIRST set and, if nullable, let the scan continue) adds nothing that
    /// `FirstSets::compute` hasn't already recorded for `lhs`. A work-list
    /// fixed point that still had something left to add would fail this.
    #[test]
    fn first_sets_are_closed_under_their_own_rule(grammar in grammar_strategy()) {
        let first = FirstSets::compute(&grammar);
        for production in grammar.productions() {
            if production.id == grammar.augmented_start_id() {
                continue;
            }
            let mut rhs_nullable = true;
            for element in &production.rhs {
                match element {
                    GrammarElement::Terminal { terminal, .. } => {
                        prop_assert!(first.of_non_terminal(&production.lhs).contains(terminal));
                        rhs_nullable = false;
                        break;
                    }
                    GrammarElement::NonTerminal { non_terminal, .. } => {
                        let addition = first.of_non_terminal(non_terminal).clone();
                        for terminal in &addition {
                            prop_assert!(first.of_non_terminal(&production.lhs).contains(terminal));
                        }
                        if !first.is_nullable(non_terminal) {
                            rhs_nullable = false;
                            break;
                        }
                    }
                }
            }
            if rhs_nullable {
                prop_assert!(first.is_nullable(&production.lhs));
            }
        }
    }

    /// Adding one more alternative to the grammar can only grow a
    /// non-terminal's FIRST set (and only ever turn non-nullable into
    /// nullable), never shrink it or take away nullability.
    #[test]
    fn first_sets_grow_monotonically_when_a_production_is_added(
        grammar in grammar_strategy(),
        extra in production_spec_strategy(),
    ) {
        let before = FirstSets::compute(&grammar);

        let mut productions: Vec<Production<char>> = grammar
            .productions()
            .iter()
            .filter(|p| p.id != grammar.augmented_start_id())
            .cloned()
            .collect();
        let next_id = productions.len() as u32;
        productions.push(Production::new(
            next_id,
            NonTerminal::new(NON_TERMINALS[extra.0]),
            extra.1,
        ));
        let grown = Grammar::new(grammar.start().clone(), '$', productions)
            .expect("adding one more alternative never violates a grammar invariant the original satisfied");
        let after = FirstSets::compute(&grown);

        for name in NON_TERMINALS.iter() {
            let nt = NonTerminal::new(*name);
            if !grammar.is_non_terminal(&nt) {
                continue;
            }
            prop_assert!(before.of_non_terminal(&nt).is_subset(after.of_non_terminal(&nt)));
            if before.is_nullable(&nt) {
                prop_assert!(after.is_nullable(&nt));
            }
        }
    }

    /// Closure is idempotent: once a set of items has been closed, closing
    /// it again adds nothing further.
    #[test]
    fn closure_is_idempotent(grammar in grammar_strategy()) {
        let first = FirstSets::compute(&grammar);
        let start_item = LRItem::start(grammar.augmented_start_id(), grammar.end_of_input());
        let mut seed: ItemSet<char> = ItemSet::new();
        seed.insert(start_item);

        let once = closure(&grammar, &first, seed);
        let twice = closure(&grammar, &first, once.clone());
        prop_assert_eq!(once, twice);
    }
}
