use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// The reserved name of the synthetic augmented-start non-terminal. No user
/// grammar may define a non-terminal with this name (§4.A).
pub const AUGMENTED_START_NAME: &str = "S'";

/// A terminal symbol, identified by its semantic `value` and whether it is
/// negated ("any terminal other than `value`", §3). `negated` participates
/// in equality/ordering/hash because a negated row and an exact row are
/// different ACTION-table edges; it is not merely cosmetic like a
/// [`GrammarElement`]'s `keep` flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Terminal<T> {
    pub value: T,
    pub negated: bool,
}

impl<T> Terminal<T> {
    pub fn exact(value: T) -> Self {
        Self {
            value,
            negated: false,
        }
    }

    pub fn negated(value: T) -> Self {
        Self {
            value,
            negated: true,
        }
    }
}

impl<T: PartialEq> PartialEq for Terminal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.negated == other.negated
    }
}
impl<T: Eq> Eq for Terminal<T> {}

impl<T: PartialOrd> PartialOrd for Terminal<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match self.value.partial_cmp(&other.value) {
            Some(std::cmp::Ordering::Equal) => self.negated.partial_cmp(&other.negated),
            other => other,
        }
    }
}
impl<T: Ord> Ord for Terminal<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value
            .cmp(&other.value)
            .then(self.negated.cmp(&other.negated))
    }
}
impl<T: std::hash::Hash> std::hash::Hash for Terminal<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
        self.negated.hash(state);
    }
}

impl<T: fmt::Display> fmt::Display for Terminal<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.negated {
            write!(f, "¬{}", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

/// A non-terminal symbol, identified solely by `name` (§3).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NonTerminal {
    pub name: Rc<str>,
}

impl NonTerminal {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self { name: name.into() }
    }

    pub fn augmented_start() -> Self {
        Self::new(AUGMENTED_START_NAME)
    }

    pub fn is_augmented_start(&self) -> bool {
        &*self.name == AUGMENTED_START_NAME
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A single symbol on the right-hand side of a production (§3). `keep`
/// marks whether a matched child survives tree assembly (§4.F); it is
/// deliberately excluded from equality (see DESIGN.md's Resolved Open
/// Question on equality).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GrammarElement<T> {
    Terminal { terminal: Terminal<T>, keep: bool },
    NonTerminal { non_terminal: NonTerminal, keep: bool },
}

impl<T> GrammarElement<T> {
    pub fn terminal(value: T, keep: bool) -> Self {
        GrammarElement::Terminal {
            terminal: Terminal::exact(value),
            keep,
        }
    }

    pub fn negated_terminal(value: T, keep: bool) -> Self {
        GrammarElement::Terminal {
            terminal: Terminal::negated(value),
            keep,
        }
    }

    pub fn non_terminal(name: impl Into<Rc<str>>, keep: bool) -> Self {
        GrammarElement::NonTerminal {
            non_terminal: NonTerminal::new(name),
            keep,
        }
    }

    pub fn keep(&self) -> bool {
        match self {
            GrammarElement::Terminal { keep, .. } => *keep,
            GrammarElement::NonTerminal { keep, .. } => *keep,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GrammarElement::Terminal { .. })
    }

    pub fn is_non_terminal(&self) -> bool {
        matches!(self, GrammarElement::NonTerminal { .. })
    }

    pub fn as_terminal(&self) -> Option<&Terminal<T>> {
        match self {
            GrammarElement::Terminal { terminal, .. } => Some(terminal),
            GrammarElement::NonTerminal { .. } => None,
        }
    }

    pub fn as_non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            GrammarElement::NonTerminal { non_terminal, .. } => Some(non_terminal),
            GrammarElement::Terminal { .. } => None,
        }
    }
}

impl<T: PartialEq> PartialEq for GrammarElement<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                GrammarElement::Terminal { terminal: a, .. },
                GrammarElement::Terminal { terminal: b, .. },
            ) => a == b,
            (
                GrammarElement::NonTerminal { non_terminal: a, .. },
                GrammarElement::NonTerminal { non_terminal: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}
impl<T: Eq> Eq for GrammarElement<T> {}

impl<T: PartialOrd> PartialOrd for GrammarElement<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        use std::cmp::Ordering;
        match (self, other) {
            (
                GrammarElement::Terminal { terminal: a, .. },
                GrammarElement::Terminal { terminal: b, .. },
            ) => a.partial_cmp(b),
            (
                GrammarElement::NonTerminal { non_terminal: a, .. },
                GrammarElement::NonTerminal { non_terminal: b, .. },
            ) => a.partial_cmp(b),
            (GrammarElement::Terminal { .. }, GrammarElement::NonTerminal { .. }) => {
                Some(Ordering::Less)
            }
            (GrammarElement::NonTerminal { .. }, GrammarElement::Terminal { .. }) => {
                Some(Ordering::Greater)
            }
        }
    }
}
impl<T: Ord> Ord for GrammarElement<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.partial_cmp(other).expect("total order")
    }
}
impl<T: std::hash::Hash> std::hash::Hash for GrammarElement<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            GrammarElement::Terminal { terminal, .. } => {
                0u8.hash(state);
                terminal.hash(state);
            }
            GrammarElement::NonTerminal { non_terminal, .. } => {
                1u8.hash(state);
                non_terminal.hash(state);
            }
        }
    }
}

impl<T: fmt::Display> fmt::Display for GrammarElement<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GrammarElement::Terminal { terminal, keep } => {
                if *keep {
                    write!(f, "{}", terminal)
                } else {
                    write!(f, "~{}", terminal)
                }
            }
            GrammarElement::NonTerminal { non_terminal, keep } => {
                if *keep {
                    write!(f, "{}", non_terminal)
                } else {
                    write!(f, "~{}", non_terminal)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_equality_ignores_nothing_but_value_and_negation() {
        let a = GrammarElement::terminal(1, true);
        let b = GrammarElement::terminal(1, false);
        assert_eq!(a, b, "keep must not affect equality");

        let c = GrammarElement::negated_terminal(1, true);
        assert_ne!(a, c, "negated must affect equality");
    }

    #[test]
    fn non_terminal_equality_is_name_based() {
        let a = GrammarElement::<u32>::non_terminal("E", true);
        let b = GrammarElement::<u32>::non_terminal("E", false);
        assert_eq!(a, b);
        let c = GrammarElement::<u32>::non_terminal("T", true);
        assert_ne!(a, c);
    }

    #[test]
    fn augmented_start_name_is_reserved() {
        let start = NonTerminal::augmented_start();
        assert!(start.is_augmented_start());
        assert_eq!(start.name.as_ref(), "S'");
    }
}
