//! Error types for twix-security

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RedactError>;

#[derive(Error, Debug)]
pub enum RedactError {
    /// A field that must be present for the header to be considered safe did not match.
    #[error("Required field not found in header: {0}")]
    MissingRequiredField(String),

    /// The date token derived from the frame of reference is not a valid YYMMDD value.
    #[error("Malformed exam date token: {0}")]
    MalformedDateToken(String),

    /// A rewrite pass changed the size of the header text.
    #[error("Rewrite pass '{pass}' changed header text length: expected {expected} bytes, found {found}")]
    LengthChanged {
        pass: &'static str,
        expected: usize,
        found: usize,
    },

    /// A rewrite span does not lie within the header text.
    #[error("Rewrite pass '{pass}' span {start}..{end} is outside header text of {len} bytes")]
    SpanOutOfBounds {
        pass: &'static str,
        start: usize,
        end: usize,
        len: usize,
    },

    /// A field pattern failed to compile or lacks a required capture group.
    #[error("Invalid field pattern '{name}': {reason}")]
    InvalidPattern { name: String, reason: String },
}
