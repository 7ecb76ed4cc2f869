//! Feature-source and Catch-source front ends that converge on one
//! language-neutral BDD tree.
//!
//! Two lexers ([`lex_feature`], [`lex_catch`]) and two parsers
//! ([`parse_feature`], [`parse_catch`]) produce the same [`BddTree`];
//! [`check_invariants`] validates the shape either of them is required
//! to uphold. Rendering a tree back to Catch source lives in the
//! sibling `catch-bdd-encoder` crate.

mod catch;
mod error;
mod feature;
mod token;
mod tree;

pub use catch::{lex_catch, parse_catch, CatchLexer};
pub use error::{Diagnostic, DiagnosticSink, Error, Result};
pub use feature::{lex_feature, parse_feature, FeatureLexer};
pub use token::{Sym, Token};
pub use tree::{check_invariants, BddNode, BddTree};
