use std::fmt;

/// The closed set of error kinds a pass over this crate can raise.
///
/// All three surface immediately to the caller (§7 of the
/// specification): partial BDD trees are never returned, and nothing
/// is recovered locally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Raised only by the Catch lexer: an unterminated block comment,
    /// an unterminated string literal, or a character with no
    /// transition in the finite automaton.
    #[error("{source_name}, {line}: {expected:?} expected")]
    Lexical {
        source_name: String,
        line: u32,
        expected: String,
        found: String,
    },

    /// Raised by either parser when the next token is not in the
    /// expected set.
    #[error("{source_name}, {line}: expected one of {expected:?}, found {found}")]
    Syntax {
        source_name: String,
        line: u32,
        expected: Vec<&'static str>,
        found: String,
    },

    /// Raised only by the emitter: the tree contains a node tag
    /// outside the closed set. A programming bug, not a user error.
    #[error("invariant violation: {0}")]
    Invariant(String),
}

/// A non-fatal observation surfaced through the caller-supplied
/// diagnostic sink (§7): a token whose symbol could not be classified,
/// or similar. Never blocks a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub source_name: String,
    pub line: u32,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}: {}", self.source_name, self.line, self.message)
    }
}

/// A sink for non-fatal diagnostics, supplied by the caller. Passing
/// `&mut |_| {}` discards them.
pub type DiagnosticSink<'a> = &'a mut dyn FnMut(Diagnostic);

pub type Result<T> = std::result::Result<T, Error>;
