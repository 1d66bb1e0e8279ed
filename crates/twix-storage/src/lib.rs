//! Storage layer for twix
//!
//! This crate provides:
//! - The record table: one CSV row per anonymized file (or measurement)
//! - Append-by-rewrite with column union, replaced atomically

pub mod error;
pub mod table;

pub use error::{Result, StorageError};
pub use table::{ANONYMIZED_ID, ORIG_FILENAME, Record, RecordTable, Table};
