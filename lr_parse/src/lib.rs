//! Table-driven shift/reduce parser and the persistent syntax tree it
//! builds (§4.F, §6). Consumes a [`lr_core::ParseTable`] and a
//! [`lexan::TokenStream`]; produces a [`tree::Tree`] rooted at the
//! completed parse.

pub mod error;
pub mod parser;
pub mod tree;

pub use error::{ParseError, UnknownTokenError};
pub use parser::{Parser, SemanticActions};
pub use tree::{NodeId, Tree};
