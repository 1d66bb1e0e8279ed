//! TWIX container handling
//!
//! This crate contains:
//! - Variant detection (VD multi-measurement vs. VB single-measurement)
//! - Measurement table and header block decoding
//! - The two-phase anonymizer: plan (read + redact), then write (patch overlay)

pub mod container;
pub mod dispatch;
pub mod error;
pub mod header;
pub mod measurement;
pub mod patch;
pub mod region;

#[cfg(any(test, feature = "fixtures"))]
#[doc(hidden)]
pub mod fixtures;

pub use container::{Container, ContainerPlan, MeasurementReport, anonymize};
pub use dispatch::{ContainerVariant, classify};
pub use error::{Error, Result};
pub use header::HeaderBlock;
pub use measurement::{MeasurementEntry, MeasurementSummary};
