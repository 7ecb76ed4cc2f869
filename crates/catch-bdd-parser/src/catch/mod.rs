mod cursor;
mod lexer;
mod parser;

pub use lexer::{lex_catch, CatchLexer};
pub use parser::parse_catch;
