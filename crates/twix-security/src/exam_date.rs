//! Exam date derivation and date sweep
//!
//! The frame-of-reference UID embeds the acquisition timestamp in its 11th
//! dot-separated component, e.g. `1.3.12.2.1107.5.2.19.45074.1.20230615093012345.0.0.0`
//! carries `230615` at characters 2..8 of `20230615093012345`.

use regex::bytes::Regex;
use time::{Date, Month};

use crate::policy::MASK_CHAR;
use crate::rewrite::RewritePass;
use crate::{RedactError, Result};

const DATE_COMPONENT: usize = 10;
const DATE_CHARS: std::ops::Range<usize> = 2..8;

/// Exam date recovered from a frame-of-reference UID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamDate {
    /// Raw `YYMMDD` token as it appears in the header.
    pub token: String,
    pub date: Date,
}

impl ExamDate {
    /// Derive the exam date from the raw frame-of-reference value.
    pub fn from_frame_of_reference(value: &str) -> Result<Self> {
        let component = value
            .trim_matches('"')
            .split('.')
            .nth(DATE_COMPONENT)
            .ok_or_else(|| RedactError::MalformedDateToken(value.to_string()))?;

        let token = component
            .get(DATE_CHARS)
            .ok_or_else(|| RedactError::MalformedDateToken(component.to_string()))?;

        Self::parse_token(token)
    }

    /// Parse a `YYMMDD` token; two-digit years are taken as 20YY.
    pub fn parse_token(token: &str) -> Result<Self> {
        let malformed = || RedactError::MalformedDateToken(token.to_string());

        if token.len() != 6 || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let yy: i32 = token[0..2].parse().map_err(|_| malformed())?;
        let mm: u8 = token[2..4].parse().map_err(|_| malformed())?;
        let dd: u8 = token[4..6].parse().map_err(|_| malformed())?;

        let month = Month::try_from(mm).map_err(|_| malformed())?;
        let date = Date::from_calendar_date(2000 + yy, month, dd).map_err(|_| malformed())?;

        Ok(Self {
            token: token.to_string(),
            date,
        })
    }

    /// `YYYY-MM-DD`
    pub fn formatted(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            self.date.year(),
            u8::from(self.date.month()),
            self.date.day()
        )
    }
}

/// Mask every quoted identifier string that still carries the date token.
///
/// A quoted string on a single line containing `token` has each word character
/// replaced by the mask character; punctuation, spaces and quotes stay.
/// Returns the number of strings masked.
pub fn sweep(text: &mut Vec<u8>, token: &str) -> Result<usize> {
    let pattern = format!(r#"(?-u)"[^"\n]*{}[^"\n]*""#, regex::escape(token));
    let regex = Regex::new(&pattern).map_err(|e| RedactError::InvalidPattern {
        name: "date_sweep".to_string(),
        reason: e.to_string(),
    })?;

    let spans: Vec<_> = regex.find_iter(text.as_slice()).map(|m| m.range()).collect();

    let mut pass = RewritePass::new("date_sweep", text);
    for span in &spans {
        let masked: Vec<u8> = pass.bytes()[span.clone()]
            .iter()
            .map(|&b| if b.is_ascii_alphanumeric() || b == b'_' { MASK_CHAR } else { b })
            .collect();
        pass.overwrite(span.clone(), &masked)?;
    }
    pass.finish()?;

    Ok(spans.len())
}
