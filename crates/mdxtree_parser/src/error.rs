//! Fatal parse errors.
//!
//! Syntax problems are never fatal; they are recorded as
//! [`mdxtree_ast::SyntaxError`]s on the returned tree. A `ParseError`
//! means no tree could be built at all.

use std::collections::TryReserveError;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that abort a parse.
#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    /// The source is longer than offsets can address or than the
    /// configured limit.
    #[error("Input too large: {len} bytes exceeds the limit of {limit} bytes")]
    #[diagnostic(code(mdx::input_too_large))]
    InputTooLarge {
        /// Source length in bytes.
        len: usize,
        /// Maximum accepted length in bytes.
        limit: usize,
    },

    /// A buffer could not grow.
    #[error("Out of memory: {0}")]
    #[diagnostic(code(mdx::out_of_memory))]
    OutOfMemory(#[from] TryReserveError),

    /// Options JSON could not be read.
    #[error("Invalid parse options: {0}")]
    #[diagnostic(code(mdx::invalid_options))]
    InvalidOptions(#[from] serde_json::Error),

    /// An internal invariant was violated.
    #[error("Internal parser error: {0}")]
    #[diagnostic(code(mdx::internal))]
    Internal(String),
}

impl ParseError {
    /// Creates a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_too_large_message() {
        let error = ParseError::InputTooLarge { len: 10, limit: 4 };
        assert_eq!(
            error.to_string(),
            "Input too large: 10 bytes exceeds the limit of 4 bytes"
        );
    }

    #[test]
    fn test_internal_error() {
        let error = ParseError::internal("lexer stalled at offset 3");
        assert!(matches!(error, ParseError::Internal(_)));
        assert_eq!(
            error.to_string(),
            "Internal parser error: lexer stalled at offset 3"
        );
    }

    #[test]
    fn test_out_of_memory_from_try_reserve() {
        let mut buffer: Vec<u64> = Vec::new();
        let error: ParseError = buffer.try_reserve(usize::MAX).unwrap_err().into();
        assert!(matches!(error, ParseError::OutOfMemory(_)));
    }
}
