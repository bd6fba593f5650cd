use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use crate::grammar::Grammar;
use crate::symbol::{GrammarElement, NonTerminal, Terminal};

/// FIRST-set table for every non-terminal in a grammar, computed once up
/// front and reused by closure construction (§4.C). Built with a work-list
/// rather than repeated whole-grammar passes: a production is only
/// revisited when one of the non-terminals it depends on actually grew.
pub struct FirstSets<T> {
    nullable: BTreeSet<NonTerminal>,
    first: BTreeMap<NonTerminal, BTreeSet<Terminal<T>>>,
}

impl<T> FirstSets<T>
where
    T: Clone + Ord + fmt::Debug,
{
    pub fn compute(grammar: &Grammar<T>) -> Self {
        let mut nullable: BTreeSet<NonTerminal> = BTreeSet::new();
        let mut first: BTreeMap<NonTerminal, BTreeSet<Terminal<T>>> = BTreeMap::new();
        for production in grammar.productions() {
            first.entry(production.lhs.clone()).or_default();
            for element in &production.rhs {
                if let GrammarElement::NonTerminal { non_terminal, .. } = element {
                    // An undefined non-terminal (grammar.rs only warns, it
                    // doesn't reject) derives nothing: treat it as having
                    // an empty, non-nullable FIRST set.
                    first.entry(non_terminal.clone()).or_default();
                }
            }
        }

        // dependents[B] = productions whose FIRST set might grow when B's does.
        let mut dependents: BTreeMap<NonTerminal, BTreeSet<u32>> = BTreeMap::new();
        let mut queue: VecDeque<u32> = VecDeque::new();
        for production in grammar.productions() {
            queue.push_back(production.id);
        }

        while let Some(id) = queue.pop_front() {
            let production = grammar.production(id);
            let mut changed = false;
            let mut rhs_nullable = true;
            for element in &production.rhs {
                match element {
                    GrammarElement::Terminal { terminal, .. } => {
                        changed |= first
                            .entry(production.lhs.clone())
                            .or_default()
                            .insert(terminal.clone());
                        rhs_nullable = false;
                        break;
                    }
                    GrammarElement::NonTerminal { non_terminal, .. } => {
                        dependents
                            .entry(non_terminal.clone())
                            .or_default()
                            .insert(id);
                        let addition = first.get(non_terminal).cloned().unwrap_or_default();
                        let entry = first.entry(production.lhs.clone()).or_default();
                        for terminal in addition {
                            changed |= entry.insert(terminal);
                        }
                        if !nullable.contains(non_terminal) {
                            rhs_nullable = false;
                            break;
                        }
                    }
                }
            }
            if rhs_nullable && nullable.insert(production.lhs.clone()) {
                changed = true;
            }
            if changed {
                if let Some(affected) = dependents.get(&production.lhs) {
                    for &id in affected {
                        queue.push_back(id);
                    }
                }
            }
        }

        Self { nullable, first }
    }

    pub fn is_nullable(&self, non_terminal: &NonTerminal) -> bool {
        self.nullable.contains(non_terminal)
    }

    pub fn of_non_terminal(&self, non_terminal: &NonTerminal) -> &BTreeSet<Terminal<T>> {
        self.first.get(non_terminal).expect("undefined non-terminal")
    }

    /// FIRST of a symbol sequence followed by `lookahead`, used when
    /// computing the lookahead set for items produced by closure (§4.C):
    /// FIRST(βa) where β is the tail of a production after the dotted
    /// non-terminal and `a` is the dotted item's own lookahead.
    pub fn of_sequence(
        &self,
        symbols: &[GrammarElement<T>],
        lookahead: &Terminal<T>,
    ) -> BTreeSet<Terminal<T>> {
        let mut result = BTreeSet::new();
        let mut all_nullable = true;
        for element in symbols {
            match element {
                GrammarElement::Terminal { terminal, .. } => {
                    result.insert(terminal.clone());
                    all_nullable = false;
                    break;
                }
                GrammarElement::NonTerminal { non_terminal, .. } => {
                    result.extend(self.of_non_terminal(non_terminal).iter().cloned());
                    if !self.is_nullable(non_terminal) {
                        all_nullable = false;
                        break;
                    }
                }
            }
        }
        if all_nullable {
            result.insert(lookahead.clone());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::production::Production;

    fn grammar() -> Grammar<char> {
        // S -> A B
        // A -> 'a' | ε
        // B -> 'b'
        let productions = vec![
            Production::new(
                0,
                NonTerminal::new("S"),
                vec![
                    GrammarElement::non_terminal("A", true),
                    GrammarElement::non_terminal("B", true),
                ],
            ),
            Production::new(1, NonTerminal::new("A"), vec![GrammarElement::terminal('a', true)]),
            Production::new(2, NonTerminal::new("A"), vec![]),
            Production::new(3, NonTerminal::new("B"), vec![GrammarElement::terminal('b', true)]),
        ];
        Grammar::new(NonTerminal::new("S"), '$', productions).unwrap()
    }

    #[test]
    fn nullable_non_terminal_is_detected() {
        let grammar = grammar();
        let first = FirstSets::compute(&grammar);
        assert!(first.is_nullable(&NonTerminal::new("A")));
        assert!(!first.is_nullable(&NonTerminal::new("B")));
    }

    #[test]
    fn first_of_s_includes_a_and_b_through_nullable_a() {
        let grammar = grammar();
        let first = FirstSets::compute(&grammar);
        let first_s = first.of_non_terminal(&NonTerminal::new("S"));
        assert!(first_s.contains(&Terminal::exact('a')));
        assert!(first_s.contains(&Terminal::exact('b')));
    }

    #[test]
    fn sequence_first_falls_through_to_lookahead_when_all_nullable() {
        let grammar = grammar();
        let first = FirstSets::compute(&grammar);
        let symbols = vec![GrammarElement::<char>::non_terminal("A", true)];
        let lookahead = Terminal::exact('$');
        let result = first.of_sequence(&symbols, &lookahead);
        assert!(result.contains(&Terminal::exact('a')));
        assert!(result.contains(&lookahead));
    }
}
