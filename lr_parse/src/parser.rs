use std::fmt::{Debug, Display};

use lexan::TokenStream;
use lr_core::{Action, ParseTable};

use crate::error::{ParseError, UnknownTokenError};
use crate::tree::{NodeId, Tree};

/// Hooks a grammar's semantic actions into the shift/reduce loop (§4.F).
/// `build_leaf` turns a matched token into the payload stored at a new leaf
/// node; `reduce` turns a production's already-built children into the
/// payload for their new parent.
pub trait SemanticActions<T, N> {
    fn build_leaf(&self, tag: T, lexeme: &str) -> N;
    fn reduce(&self, production_id: u32, children: &[N]) -> N;
}

/// Drives a table-driven shift/reduce parse over a token stream, assembling
/// a [`Tree`] as it goes (§4.F). One stack tracks automaton states, a
/// second tracks the `NodeId` of the subtree built so far for each stacked
/// symbol.
pub struct Parser<'t, T, N, A> {
    table: &'t ParseTable<T>,
    actions: A,
    _marker: std::marker::PhantomData<N>,
}

impl<'t, T, N, A> Parser<'t, T, N, A>
where
    T: Copy + Ord + Debug + Display,
    N: Clone,
    A: SemanticActions<T, N>,
{
    pub fn new(table: &'t ParseTable<T>, actions: A) -> Self {
        Self {
            table,
            actions,
            _marker: std::marker::PhantomData,
        }
    }

    /// Runs the parse to completion, returning the finished tree and the id
    /// of its root node. `rhs_keep` reports, for a production and each of
    /// its right-hand-side positions, whether that child survives tree
    /// assembly (§4.F): children at a `false` position are dropped before
    /// `SemanticActions::reduce` ever sees them.
    pub fn parse(
        &self,
        mut tokens: TokenStream<T>,
        lhs_names: &dyn Fn(u32) -> lr_core::NonTerminal,
        rhs_lens: &dyn Fn(u32) -> usize,
        rhs_keep: &dyn Fn(u32) -> Vec<bool>,
    ) -> Result<(Tree<N>, NodeId), ParseError<T>> {
        let mut states: Vec<usize> = vec![0];
        let mut tree: Option<Tree<N>> = None;
        let mut nodes: Vec<NodeId> = Vec::new();

        loop {
            let front = tokens.front().map_err(|err| {
                ParseError::UnknownToken(UnknownTokenError::new(
                    err.to_string(),
                    err.location().to_string(),
                ))
            })?;
            let state = *states.last().expect("state stack is never empty");

            if !self.table.defines_terminal(front.tag()) {
                return Err(ParseError::UnknownToken(UnknownTokenError::new(
                    format!("token `{}` has no matching grammar terminal", front.tag()),
                    front.location().to_string(),
                )));
            }

            match self.table.action(state, front.tag()) {
                Some(Action::Shift(next_state)) => {
                    let data = self.actions.build_leaf(*front.tag(), front.lexeme());
                    let id = match &mut tree {
                        Some(tree) => tree.push_internal(data, vec![]),
                        None => {
                            let (new_tree, id) = Tree::leaf(data);
                            tree = Some(new_tree);
                            id
                        }
                    };
                    nodes.push(id);
                    states.push(*next_state);
                    tokens.advance();
                }
                Some(Action::Reduce(production_id)) => {
                    let production_id = *production_id;
                    let len = rhs_lens(production_id);
                    let split_at = nodes.len() - len;
                    let children_ids: Vec<NodeId> = nodes.split_off(split_at);
                    states.truncate(states.len() - len);

                    let keep = rhs_keep(production_id);
                    let kept_ids: Vec<NodeId> = children_ids
                        .into_iter()
                        .zip(keep)
                        .filter(|(_, keep)| *keep)
                        .map(|(id, _)| id)
                        .collect();

                    let tree_ref = tree.as_ref().expect("tree exists once a shift has happened");
                    let children_data: Vec<N> = kept_ids
                        .iter()
                        .map(|&id| tree_ref.data(id).clone())
                        .collect();
                    let data = self.actions.reduce(production_id, &children_data);

                    let tree_mut = tree.as_mut().expect("tree exists once a shift has happened");
                    let id = tree_mut.push_internal(data, kept_ids);
                    nodes.push(id);

                    let from_state = *states.last().expect("state stack is never empty");
                    let lhs = lhs_names(production_id);
                    let goto_state = self
                        .table
                        .goto(from_state, &lhs)
                        .ok_or_else(|| ParseError::MissingGoto {
                            state: from_state,
                            non_terminal: lhs.to_string(),
                        })?;
                    states.push(goto_state);
                }
                Some(Action::Accept) => {
                    let root = *nodes.last().expect("accept only reachable after a reduction");
                    let mut tree = tree.expect("tree exists once a shift has happened");
                    tree = tree.with_root(root);
                    return Ok((tree, root));
                }
                None => {
                    return Err(ParseError::UnexpectedToken {
                        found: *front.tag(),
                        location: front.location().to_string(),
                        state,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use lexan::LexicalAnalyzer;
    use lr_core::{FirstSets, Grammar, GrammarElement, NonTerminal, Production, ParseTable};

    use super::*;

    /// Mirrors the shape of the parse, not any particular payload: a leaf
    /// records the terminal it matched, an internal node records which
    /// production reduced it and its already-built children.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Node {
        Leaf(char),
        Prod(u32, Vec<Node>),
    }

    struct StructuralActions;

    impl SemanticActions<char, Node> for StructuralActions {
        fn build_leaf(&self, tag: char, _lexeme: &str) -> Node {
            Node::Leaf(tag)
        }

        fn reduce(&self, production_id: u32, children: &[Node]) -> Node {
            Node::Prod(production_id, children.to_vec())
        }
    }

    fn run(
        grammar: &Grammar<char>,
        literals: &[(char, &str)],
        input: &str,
    ) -> Result<Node, ParseError<char>> {
        let first = FirstSets::compute(grammar);
        let table = ParseTable::build(grammar, &first).expect("grammar builds without conflicts");
        let lexer = LexicalAnalyzer::new(literals, &[], &[r"\A\s+"], '$').unwrap();
        let tokens = lexer.token_stream(input.to_string(), "test".to_string());
        let parser = Parser::new(&table, StructuralActions);
        let lhs_names = |id: u32| grammar.production(id).lhs.clone();
        let rhs_lens = |id: u32| grammar.production(id).len();
        let rhs_keep = |id: u32| {
            grammar
                .production(id)
                .rhs
                .iter()
                .map(|element| element.keep())
                .collect::<Vec<bool>>()
        };
        parser
            .parse(tokens, &lhs_names, &rhs_lens, &rhs_keep)
            .map(|(tree, root)| tree.data(root).clone())
    }

    #[test]
    fn balanced_parentheses_accept_with_nested_tree() {
        // S -> '(' S ')' | ε
        let productions = vec![
            Production::new(
                0,
                NonTerminal::new("S"),
                vec![
                    GrammarElement::terminal('(', true),
                    GrammarElement::non_terminal("S", true),
                    GrammarElement::terminal(')', true),
                ],
            ),
            Production::new(1, NonTerminal::new("S"), vec![]),
        ];
        let grammar = Grammar::new(NonTerminal::new("S"), '$', productions).unwrap();
        let literals = [('(', "\\A\\("), (')', "\\A\\)")];

        let root = run(&grammar, &literals, "(())").unwrap();
        let expected = Node::Prod(
            0,
            vec![
                Node::Leaf('('),
                Node::Prod(
                    0,
                    vec![Node::Leaf('('), Node::Prod(1, vec![]), Node::Leaf(')')],
                ),
                Node::Leaf(')'),
            ],
        );
        assert_eq!(root, expected);
    }

    #[test]
    fn arithmetic_precedence_nests_multiplication_under_addition() {
        // E -> E '+' T | T; T -> T '*' F | F; F -> '(' E ')' | 'i'
        let productions = vec![
            Production::new(
                0,
                NonTerminal::new("E"),
                vec![
                    GrammarElement::non_terminal("E", true),
                    GrammarElement::terminal('+', true),
                    GrammarElement::non_terminal("T", true),
                ],
            ),
            Production::new(1, NonTerminal::new("E"), vec![GrammarElement::non_terminal("T", true)]),
            Production::new(
                2,
                NonTerminal::new("T"),
                vec![
                    GrammarElement::non_terminal("T", true),
                    GrammarElement::terminal('*', true),
                    GrammarElement::non_terminal("F", true),
                ],
            ),
            Production::new(3, NonTerminal::new("T"), vec![GrammarElement::non_terminal("F", true)]),
            Production::new(
                4,
                NonTerminal::new("F"),
                vec![
                    GrammarElement::terminal('(', true),
                    GrammarElement::non_terminal("E", true),
                    GrammarElement::terminal(')', true),
                ],
            ),
            Production::new(5, NonTerminal::new("F"), vec![GrammarElement::terminal('i', true)]),
        ];
        let grammar = Grammar::new(NonTerminal::new("E"), '$', productions).unwrap();
        let literals = [
            ('+', "\\A\\+"),
            ('*', "\\A\\*"),
            ('(', "\\A\\("),
            (')', "\\A\\)"),
            ('i', "\\Ai"),
        ];

        let root = run(&grammar, &literals, "i + i * i").unwrap();
        match root {
            Node::Prod(0, children) => {
                assert_eq!(children.len(), 3);
                assert!(
                    matches!(&children[2], Node::Prod(2, _)),
                    "right-hand side of '+' must be the '*' subtree, got {:?}",
                    children[2]
                );
            }
            other => panic!("expected top-level E -> E + T, got {:?}", other),
        }
    }

    #[test]
    fn left_recursion_is_left_associative() {
        // L -> L ',' 'i' | 'i'
        let productions = vec![
            Production::new(
                0,
                NonTerminal::new("L"),
                vec![
                    GrammarElement::non_terminal("L", true),
                    GrammarElement::terminal(',', true),
                    GrammarElement::terminal('i', true),
                ],
            ),
            Production::new(1, NonTerminal::new("L"), vec![GrammarElement::terminal('i', true)]),
        ];
        let grammar = Grammar::new(NonTerminal::new("L"), '$', productions).unwrap();
        let literals = [(',', "\\A,"), ('i', "\\Ai")];

        let root = run(&grammar, &literals, "i,i,i").unwrap();
        let expected = Node::Prod(
            0,
            vec![
                Node::Prod(
                    0,
                    vec![Node::Prod(1, vec![Node::Leaf('i')]), Node::Leaf(','), Node::Leaf('i')],
                ),
                Node::Leaf(','),
                Node::Leaf('i'),
            ],
        );
        assert_eq!(root, expected);
    }

    #[test]
    fn lexical_scan_failure_surfaces_as_unknown_token_error() {
        // S -> 'a'; the lexicon has no rule at all for 'b', so it's a scan
        // failure rather than a token the grammar simply doesn't use.
        let productions = vec![Production::new(
            0,
            NonTerminal::new("S"),
            vec![GrammarElement::terminal('a', true)],
        )];
        let grammar = Grammar::new(NonTerminal::new("S"), '$', productions).unwrap();
        let literals = [('a', "\\Aa")];

        let err = run(&grammar, &literals, "a b").unwrap_err();
        assert!(matches!(err, ParseError::UnknownToken(_)));
    }

    #[test]
    fn token_with_no_matching_terminal_surfaces_as_unknown_token_error() {
        // S -> 'a'; the lexicon also recognizes 'b' as a token, but no
        // production ever uses it as a terminal, so it has no matching
        // grammar terminal even though the lexer matches it cleanly.
        let productions = vec![Production::new(
            0,
            NonTerminal::new("S"),
            vec![GrammarElement::terminal('a', true)],
        )];
        let grammar = Grammar::new(NonTerminal::new("S"), '$', productions).unwrap();
        let literals = [('a', "\\Aa"), ('b', "\\Ab")];

        let err = run(&grammar, &literals, "a b").unwrap_err();
        assert!(matches!(err, ParseError::UnknownToken(_)));
    }

    #[test]
    fn dropped_children_are_excluded_from_reduce_and_tree() {
        // S -> '(' E ')', with the parentheses marked keep=false: they
        // match lexemes but never reach `reduce` or become tree children.
        let productions = vec![
            Production::new(
                0,
                NonTerminal::new("S"),
                vec![
                    GrammarElement::terminal('(', false),
                    GrammarElement::non_terminal("E", true),
                    GrammarElement::terminal(')', false),
                ],
            ),
            Production::new(1, NonTerminal::new("E"), vec![GrammarElement::terminal('i', true)]),
        ];
        let grammar = Grammar::new(NonTerminal::new("S"), '$', productions).unwrap();
        let literals = [('(', "\\A\\("), (')', "\\A\\)"), ('i', "\\Ai")];

        let root = run(&grammar, &literals, "(i)").unwrap();
        assert_eq!(root, Node::Prod(0, vec![Node::Prod(1, vec![Node::Leaf('i')])]));
    }
}
