//! Span matcher for header field assignments
//!
//! A field pattern is a byte regex with named groups:
//! - `pre`: literal syntax before the value (tag, braces, opening quote)
//! - `vis`: optional visibility / precision sub-syntax nested in `pre`
//! - `val`: the value itself
//! - `suf`: literal syntax after the value
//!
//! Matching runs with Unicode disabled so that `.` matches any single byte and
//! spans are byte offsets into the header text.

use regex::bytes::{Captures, Regex};
use std::ops::Range;

use crate::{RedactError, Result};

/// Byte spans of one field assignment inside the header text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    pub prefix: Range<usize>,
    pub visibility: Option<Range<usize>>,
    pub value: Range<usize>,
    pub suffix: Range<usize>,
}

impl FieldMatch {
    /// Whole assignment, prefix through suffix.
    pub fn span(&self) -> Range<usize> {
        self.prefix.start..self.suffix.end
    }
}

/// Compiled matcher for one field.
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    regex: Regex,
}

impl FieldMatcher {
    pub fn new(name: &str, pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("(?-u){}", pattern)).map_err(|e| {
            RedactError::InvalidPattern {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })?;

        let groups: Vec<&str> = regex.capture_names().flatten().collect();
        for required in ["pre", "val", "suf"] {
            if !groups.contains(&required) {
                return Err(RedactError::InvalidPattern {
                    name: name.to_string(),
                    reason: format!("missing named group '{}'", required),
                });
            }
        }

        Ok(Self { regex })
    }

    /// First assignment of the field in `text`.
    pub fn find(&self, text: &[u8]) -> Option<FieldMatch> {
        self.regex.captures(text).and_then(|caps| to_match(&caps))
    }

    /// Every non-overlapping assignment of the field in `text`, in order.
    pub fn find_all(&self, text: &[u8]) -> Vec<FieldMatch> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| to_match(&caps))
            .collect()
    }
}

fn to_match(caps: &Captures<'_>) -> Option<FieldMatch> {
    Some(FieldMatch {
        prefix: caps.name("pre")?.range(),
        visibility: caps.name("vis").map(|m| m.range()),
        value: caps.name("val")?.range(),
        suffix: caps.name("suf")?.range(),
    })
}
