use lr_core::Grammar;
use lr_parse::SemanticActions;

use crate::symbol_table::{SymbolTable, TerminalId};

/// Renders a parse as a parenthesized s-expression, e.g. `(E (E + T) n)`.
/// Good enough to confirm a table drives a real parse from the command
/// line; a generated front end would replace this with real AST nodes.
pub struct SExprActions<'g> {
    pub grammar: &'g Grammar<TerminalId>,
    pub symbols: &'g SymbolTable,
}

impl<'g> SemanticActions<TerminalId, String> for SExprActions<'g> {
    fn build_leaf(&self, tag: TerminalId, lexeme: &str) -> String {
        let _ = tag;
        lexeme.to_string()
    }

    fn reduce(&self, production_id: u32, children: &[String]) -> String {
        let lhs = &self.grammar.production(production_id).lhs;
        if children.is_empty() {
            format!("({})", lhs)
        } else {
            format!("({} {})", lhs, children.join(" "))
        }
    }
}
