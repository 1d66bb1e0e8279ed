//! Anonymization orchestration
//!
//! [`Anonymizer`] handles one container file end to end: allocate the output
//! identity, run the two-phase container anonymizer through a temp file, and
//! turn the match records into record-table rows. [`run_batch`] drives it
//! over many files with bounded concurrency.

pub mod anonymizer;
pub mod batch;
pub mod naming;

pub use anonymizer::{AnonymizeOptions, Anonymizer, FileOutcome, MEASUREMENT};
pub use batch::{BatchSummary, run_batch};
pub use naming::{OutputNamer, UuidNamer};
