//! Input discovery
//!
//! Resolves the `--input` argument into the list of container files to
//! process: a single file, every matching file in a directory, or a glob.

pub mod discovery;
pub mod error;

pub use discovery::{Discovery, Input};
pub use error::{Result, SourceError};
