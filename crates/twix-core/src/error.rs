use thiserror::Error;
use twix_security::RedactError;

#[derive(Error, Debug)]
pub enum Error {
    /// A fixed-width read would run past the end of the input.
    #[error("Truncated input reading {context} at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedInput {
        context: &'static str,
        offset: u64,
        needed: u64,
        available: u64,
    },

    #[error("Malformed header block at offset {offset}: {reason}")]
    MalformedHeader { offset: u64, reason: String },

    /// Regions to rewrite overlap or fall outside the container.
    #[error("Invalid container layout: {0}")]
    InvalidLayout(String),

    #[error(transparent)]
    Redact(#[from] RedactError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
