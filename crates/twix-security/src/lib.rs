//! Field redaction for TWIX protocol header text
//!
//! This crate contains:
//! - The field catalog (named patterns grouped by redaction policy)
//! - A span matcher over raw header bytes
//! - The redactor: length-preserving rewrite passes, exam date derivation
//!   and the final date sweep

pub mod catalog;
pub mod error;
pub mod exam_date;
pub mod matcher;
pub mod policy;
pub mod record;
pub mod redactor;
pub mod rewrite;

pub use catalog::{Catalog, FieldPattern, FieldSpec, FRAME_OF_REFERENCE};
pub use error::{RedactError, Result};
pub use exam_date::ExamDate;
pub use matcher::{FieldMatch, FieldMatcher};
pub use policy::{BLANK_CHAR, MASK_CHAR, RedactionPolicy};
pub use record::{EXAM_DATE, MatchRecord, latin1_string};
pub use redactor::{Redaction, Redactor};
