use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Debug;

use crate::production::Production;
use crate::symbol::{GrammarElement, NonTerminal, Terminal};

/// Errors raised while assembling a [`Grammar`] from caller-supplied
/// productions (§4.A). These are caller mistakes, not automaton-construction
/// conflicts: the latter are [`crate::table::ConflictError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A production's left-hand side collides with the reserved augmented
    /// start non-terminal name `S'`.
    ReservedNonTerminalName { name: String },
    /// The end-of-input terminal appeared on the right-hand side of a
    /// production; it may only ever be synthesized by the augmented start
    /// rule.
    EndOfInputInProduction { production: String },
    /// `start` does not name the left-hand side of any supplied production.
    UndefinedStart { start: String },
    /// A production's right-hand side references a non-terminal that no
    /// production defines.
    UndefinedNonTerminal { name: String, used_in: String },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GrammarError::ReservedNonTerminalName { name } => write!(
                f,
                "non-terminal {:?} collides with the reserved augmented start symbol",
                name
            ),
            GrammarError::EndOfInputInProduction { production } => write!(
                f,
                "end-of-input terminal used in production right-hand side: {}",
                production
            ),
            GrammarError::UndefinedStart { start } => {
                write!(f, "start symbol {:?} has no production", start)
            }
            GrammarError::UndefinedNonTerminal { name, used_in } => write!(
                f,
                "non-terminal {:?} used in `{}` is never defined",
                name, used_in
            ),
        }
    }
}

impl std::error::Error for GrammarError {}

/// A context-free grammar augmented with a synthetic start production
/// `S' -> start` (§3, §4.A). Owns every [`Production`] and indexes them by
/// left-hand side so closure computation (§4.C) can find alternatives for a
/// non-terminal without a linear scan.
#[derive(Debug, Clone)]
pub struct Grammar<T> {
    start: NonTerminal,
    end_of_input: T,
    augmented_start_id: u32,
    productions: Vec<Production<T>>,
    productions_by_lhs: BTreeMap<NonTerminal, Vec<u32>>,
}

impl<T> Grammar<T>
where
    T: Clone + Eq + Ord + Debug + fmt::Display,
{
    pub fn new(
        start: NonTerminal,
        end_of_input: T,
        mut productions: Vec<Production<T>>,
    ) -> Result<Self, GrammarError> {
        for production in &productions {
            if production.lhs.is_augmented_start() {
                return Err(GrammarError::ReservedNonTerminalName {
                    name: production.lhs.to_string(),
                });
            }
            for element in &production.rhs {
                if let GrammarElement::Terminal { terminal, .. } = element {
                    if !terminal.negated && terminal.value == end_of_input {
                        return Err(GrammarError::EndOfInputInProduction {
                            production: production.to_string(),
                        });
                    }
                }
            }
        }

        let mut productions_by_lhs: BTreeMap<NonTerminal, Vec<u32>> = BTreeMap::new();
        for (i, production) in productions.iter_mut().enumerate() {
            production.id = i as u32;
            productions_by_lhs
                .entry(production.lhs.clone())
                .or_default()
                .push(production.id);
        }

        if !productions_by_lhs.contains_key(&start) {
            return Err(GrammarError::UndefinedStart {
                start: start.to_string(),
            });
        }

        for production in &productions {
            for element in &production.rhs {
                if let GrammarElement::NonTerminal { non_terminal, .. } = element {
                    if !productions_by_lhs.contains_key(non_terminal) {
                        log::warn!(
                            "non-terminal `{}` used in `{}` is never defined",
                            non_terminal,
                            production
                        );
                    }
                }
            }
        }

        let augmented_start_id = productions.len() as u32;
        let augmented = Production::new(
            augmented_start_id,
            NonTerminal::augmented_start(),
            vec![GrammarElement::non_terminal(start.name.clone(), true)],
        );
        productions_by_lhs
            .entry(NonTerminal::augmented_start())
            .or_default()
            .push(augmented_start_id);
        productions.push(augmented);

        Ok(Self {
            start,
            end_of_input,
            augmented_start_id,
            productions,
            productions_by_lhs,
        })
    }

    pub fn start(&self) -> &NonTerminal {
        &self.start
    }

    pub fn end_of_input(&self) -> Terminal<T> {
        Terminal::exact(self.end_of_input.clone())
    }

    pub fn augmented_start_id(&self) -> u32 {
        self.augmented_start_id
    }

    pub fn production(&self, id: u32) -> &Production<T> {
        &self.productions[id as usize]
    }

    pub fn productions(&self) -> &[Production<T>] {
        &self.productions
    }

    pub fn production_ids_for(&self, non_terminal: &NonTerminal) -> &[u32] {
        self.productions_by_lhs
            .get(non_terminal)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_non_terminal(&self, non_terminal: &NonTerminal) -> bool {
        self.productions_by_lhs.contains_key(non_terminal)
    }
}

/// Structural equality over `start`, `end_of_input` and `productions` only;
/// `productions_by_lhs` is excluded since it is a deterministic index over
/// `productions` and `start`, not independent state (same pattern as
/// [`Production`]'s own manual impl excluding `id`).
impl<T: PartialEq> PartialEq for Grammar<T> {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
            && self.end_of_input == other.end_of_input
            && self.productions == other.productions
    }
}
impl<T: Eq> Eq for Grammar<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn production(id: u32, lhs: &str, rhs: Vec<GrammarElement<char>>) -> Production<char> {
        Production::new(id, NonTerminal::new(lhs), rhs)
    }

    #[test]
    fn rejects_reserved_name() {
        let productions = vec![production(0, "S'", vec![])];
        let err = Grammar::new(NonTerminal::new("S'"), '$', productions).unwrap_err();
        assert!(matches!(err, GrammarError::ReservedNonTerminalName { .. }));
    }

    #[test]
    fn rejects_end_of_input_in_rhs() {
        let productions = vec![production(
            0,
            "S",
            vec![GrammarElement::terminal('$', true)],
        )];
        let err = Grammar::new(NonTerminal::new("S"), '$', productions).unwrap_err();
        assert!(matches!(err, GrammarError::EndOfInputInProduction { .. }));
    }

    #[test]
    fn rejects_undefined_start() {
        let productions = vec![production(0, "S", vec![])];
        let err = Grammar::new(NonTerminal::new("Q"), '$', productions).unwrap_err();
        assert!(matches!(err, GrammarError::UndefinedStart { .. }));
    }

    #[test]
    fn augments_start_symbol() {
        let productions = vec![production(
            0,
            "S",
            vec![GrammarElement::terminal('a', true)],
        )];
        let grammar = Grammar::new(NonTerminal::new("S"), '$', productions).unwrap();
        let augmented = grammar.production(grammar.augmented_start_id());
        assert!(augmented.lhs.is_augmented_start());
        assert_eq!(augmented.rhs.len(), 1);
    }
}
