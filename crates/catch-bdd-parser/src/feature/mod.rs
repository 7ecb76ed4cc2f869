mod lexer;
mod parser;

pub use lexer::{lex_feature, FeatureLexer};
pub use parser::parse_feature;
