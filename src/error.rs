//! Failure kinds reported by the reader and the evaluator.
//!
//! Every failure aborts the current top-level form and propagates to the
//! caller unchanged; the `Display` form is the line the REPL shows.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed text, or a malformed `define`/`if`/`lambda`/`set!` shape.
    #[error("Syntax error: {0}")]
    Syntax(String),
    /// Type mismatches, bad arity, bad indices, non-callable heads.
    #[error("Runtime error: {0}")]
    Runtime(String),
    /// A symbol with no binding in the current chain.
    #[error("Name error: {0}")]
    Name(String),
}

impl Error {
    pub fn syntax(msg: impl Into<String>) -> Self {
        Error::Syntax(msg.into())
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Error::Runtime(msg.into())
    }

    pub fn name(msg: impl Into<String>) -> Self {
        Error::Name(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_kind_prefix() {
        assert_eq!(
            Error::syntax("unexpected ')'").to_string(),
            "Syntax error: unexpected ')'"
        );
        assert_eq!(Error::runtime("boom").to_string(), "Runtime error: boom");
        assert_eq!(Error::name("x").to_string(), "Name error: x");
    }
}
