//! The unified error type threaded through every layer of the interpreter.

use thiserror::Error;

/// The three error kinds the interpreter can signal, surfaced as a single
/// enum so callers match on a variant instead of juggling per-layer types.
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// Malformed input at the lexer/reader level, or an arity/shape
    /// violation in a special form (`define`, `set!`, `lambda`, ...).
    #[error("syntax error: {0}")]
    Syntax(String),
    /// An unbound identifier that is not a built-in, or the target of a
    /// `set!` that was never defined.
    #[error("name error: {0}")]
    Name(String),
    /// Type mismatches, procedure arity violations, empty application, and
    /// other domain errors surfaced by the evaluator or a built-in.
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl Error {
    pub fn syntax(message: impl Into<String>) -> Self {
        Error::Syntax(message.into())
    }

    pub fn name(message: impl Into<String>) -> Self {
        Error::Name(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Error::Runtime(message.into())
    }

    /// The one-line category tag the REPL prints for an error of this kind.
    pub fn category_line(&self) -> &'static str {
        match self {
            Error::Syntax(_) => "Syntax error occurred!",
            Error::Name(_) => "Name error occurred!",
            Error::Runtime(_) => "Runtime error occurred!",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
