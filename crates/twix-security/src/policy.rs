use serde::{Deserialize, Serialize};

/// Character written over numeric identifiers.
pub const BLANK_CHAR: u8 = b'0';

/// Character written over free-text identity fields and swept date strings.
pub const MASK_CHAR: u8 = b'x';

/// How a matched field value is transformed.
///
/// Every policy is length-preserving: the header size of the container is
/// computed from the text, so a replacement must occupy exactly the bytes of
/// the original value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionPolicy {
    /// Whole value replaced by `'0'` characters.
    NumericBlank,
    /// Each ASCII digit replaced by `'0'`, everything else kept in place.
    DigitZero,
    /// Whole value replaced by `'x'` characters. The field must be present.
    Mask,
    /// Value is recorded but the text is left alone.
    ExtractOnly,
}

impl RedactionPolicy {
    /// Order in which policy groups are applied to a header.
    pub const PASS_ORDER: [RedactionPolicy; 4] = [
        RedactionPolicy::NumericBlank,
        RedactionPolicy::DigitZero,
        RedactionPolicy::Mask,
        RedactionPolicy::ExtractOnly,
    ];

    /// Replacement bytes for `value`, or `None` when the text stays unchanged.
    pub fn rewrite(self, value: &[u8]) -> Option<Vec<u8>> {
        match self {
            RedactionPolicy::NumericBlank => Some(vec![BLANK_CHAR; value.len()]),
            RedactionPolicy::DigitZero => Some(
                value
                    .iter()
                    .map(|&b| if b.is_ascii_digit() { BLANK_CHAR } else { b })
                    .collect(),
            ),
            RedactionPolicy::Mask => Some(vec![MASK_CHAR; value.len()]),
            RedactionPolicy::ExtractOnly => None,
        }
    }

    /// Whether `value` already looks like the output of this policy.
    ///
    /// Only the whole-value policies can tell; a zeroed number is
    /// indistinguishable from a genuine zero.
    pub fn is_redacted(self, value: &[u8]) -> bool {
        match self {
            RedactionPolicy::NumericBlank => {
                !value.is_empty() && value.iter().all(|&b| b == BLANK_CHAR)
            }
            RedactionPolicy::Mask => !value.is_empty() && value.iter().all(|&b| b == MASK_CHAR),
            RedactionPolicy::DigitZero | RedactionPolicy::ExtractOnly => false,
        }
    }

    /// Whether a header without this field must be rejected.
    pub fn is_required(self) -> bool {
        matches!(self, RedactionPolicy::Mask)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RedactionPolicy::NumericBlank => "numeric_blank",
            RedactionPolicy::DigitZero => "digit_zero",
            RedactionPolicy::Mask => "mask",
            RedactionPolicy::ExtractOnly => "extract_only",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_blank_keeps_length() {
        let out = RedactionPolicy::NumericBlank.rewrite(b"AB-1234").unwrap();
        assert_eq!(out, b"0000000");
    }

    #[test]
    fn test_digit_zero_keeps_non_digits() {
        let out = RedactionPolicy::DigitZero.rewrite(b"72.5").unwrap();
        assert_eq!(out, b"00.0");

        let out = RedactionPolicy::DigitZero.rewrite(b"19800115").unwrap();
        assert_eq!(out, b"00000000");
    }

    #[test]
    fn test_mask_keeps_length() {
        let out = RedactionPolicy::Mask.rewrite(b"Doe^Jane").unwrap();
        assert_eq!(out, b"xxxxxxxx");
    }

    #[test]
    fn test_extract_only_does_not_rewrite() {
        assert!(RedactionPolicy::ExtractOnly.rewrite(b"HEAD").is_none());
    }

    #[test]
    fn test_is_redacted() {
        assert!(RedactionPolicy::NumericBlank.is_redacted(b"0000"));
        assert!(!RedactionPolicy::NumericBlank.is_redacted(b"0001"));
        assert!(RedactionPolicy::Mask.is_redacted(b"xxx"));
        assert!(!RedactionPolicy::Mask.is_redacted(b""));
        assert!(!RedactionPolicy::DigitZero.is_redacted(b"000"));
    }
}
