//! Error types for color parsing.

use thiserror::Error;

/// Errors produced when a textual color cannot be turned into a [`Color`](crate::Color).
///
/// Callers in the rewriting pipeline treat every variant the same way: the
/// color carries no usable information and its override is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// The input was empty or whitespace only.
    #[error("empty color value")]
    Empty,

    /// The input is a CSS value that is deliberately not parsed as a color
    /// (gradients, `var()` references, `url()` images).
    #[error("unsupported color value '{0}'")]
    Unsupported(String),

    /// The input did not match any supported color grammar.
    #[error("invalid color '{input}': {reason}")]
    Invalid {
        /// The trimmed input text.
        input: String,
        /// Message from the underlying parser.
        reason: String,
    },
}

/// Result type for color operations.
pub type Result<T> = std::result::Result<T, ColorError>;
