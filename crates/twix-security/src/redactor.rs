//! Field redaction engine for TWIX header text

use tracing::debug;

use crate::catalog::{Catalog, FRAME_OF_REFERENCE};
use crate::exam_date::{self, ExamDate};
use crate::policy::RedactionPolicy;
use crate::record::{EXAM_DATE, MatchRecord, latin1_string};
use crate::rewrite::RewritePass;
use crate::{RedactError, Result};

/// Outcome of redacting one header text blob.
#[derive(Debug, Clone)]
pub struct Redaction {
    /// Redacted text, always the same length as the input.
    pub text: Vec<u8>,
    pub matches: MatchRecord,
    /// `None` when the frame of reference was already blanked by an earlier run.
    pub exam_date: Option<ExamDate>,
    /// Quoted strings masked by the date sweep.
    pub swept: usize,
}

impl Redaction {
    /// Whether the header had already been through the redactor.
    pub fn previously_redacted(&self) -> bool {
        self.exam_date.is_none()
    }
}

/// Applies the field catalog to header text.
pub struct Redactor {
    catalog: Catalog,
}

impl Redactor {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Redact `text`, returning the rewritten bytes and the original values.
    ///
    /// The exam date is derived before anything is rewritten. Policy groups run
    /// in [`RedactionPolicy::PASS_ORDER`], then the date sweep.
    pub fn redact(&self, text: &[u8]) -> Result<Redaction> {
        let mut buf = text.to_vec();
        let mut matches = MatchRecord::new();

        let exam_date = self.derive_exam_date(&buf)?;
        if let Some(date) = &exam_date {
            matches.insert(EXAM_DATE, date.formatted());
        }

        for policy in RedactionPolicy::PASS_ORDER {
            let rewrites = self.apply_policy(policy, &mut buf, &mut matches)?;
            debug!("{} pass rewrote {} values", policy.as_str(), rewrites);
        }

        let swept = match &exam_date {
            Some(date) => exam_date::sweep(&mut buf, &date.token)?,
            None => 0,
        };
        debug!("Date sweep masked {} strings", swept);

        if buf.len() != text.len() {
            return Err(RedactError::LengthChanged {
                pass: "redact",
                expected: text.len(),
                found: buf.len(),
            });
        }

        Ok(Redaction {
            text: buf,
            matches,
            exam_date,
            swept,
        })
    }

    fn derive_exam_date(&self, text: &[u8]) -> Result<Option<ExamDate>> {
        let missing = || RedactError::MissingRequiredField(FRAME_OF_REFERENCE.to_string());

        let field = self.catalog.get(FRAME_OF_REFERENCE).ok_or_else(missing)?;
        let found = field.matcher.find(text).ok_or_else(missing)?;
        let value = &text[found.value];

        if field.policy.is_redacted(value) {
            if let Some(live) = self.unmasked_value(text) {
                return Err(RedactError::MalformedDateToken(format!(
                    "frame of reference is blank but {} is not masked",
                    live
                )));
            }
            debug!("Frame of reference already blanked, header was redacted before");
            return Ok(None);
        }

        ExamDate::from_frame_of_reference(&latin1_string(value)).map(Some)
    }

    /// Name of the first masked field that still holds a live value.
    fn unmasked_value(&self, text: &[u8]) -> Option<&str> {
        self.catalog
            .by_policy(RedactionPolicy::Mask)
            .find(|field| {
                field
                    .matcher
                    .find_all(text)
                    .iter()
                    .any(|m| !field.policy.is_redacted(&text[m.value.clone()]))
            })
            .map(|field| field.name.as_str())
    }

    fn apply_policy(
        &self,
        policy: RedactionPolicy,
        buf: &mut Vec<u8>,
        matches: &mut MatchRecord,
    ) -> Result<usize> {
        let mut pass = RewritePass::new(policy.as_str(), buf);

        for field in self.catalog.by_policy(policy) {
            let found = field.matcher.find_all(pass.bytes());
            if found.is_empty() {
                if policy.is_required() {
                    return Err(RedactError::MissingRequiredField(field.name.clone()));
                }
                continue;
            }

            let mut recorded = false;
            for m in found {
                let value = pass.bytes()[m.value.clone()].to_vec();
                if policy.is_redacted(&value) {
                    continue;
                }
                if !recorded {
                    matches.insert(field.name.as_str(), latin1_string(&value));
                    recorded = true;
                }
                if let Some(replacement) = policy.rewrite(&value) {
                    pass.overwrite(m.value, &replacement)?;
                }
            }
        }

        pass.finish()
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(Catalog::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOR_UID: &str = "1.3.12.2.1107.5.2.19.45074.1.20230615093012345.0.0.0";

    fn header() -> String {
        let frame_of_reference = format!(
            "<ParamString.\"FrameOfReference\">  {{ \"{}\"  }}\n",
            FOR_UID
        );
        let lines: [&str; 12] = [
            "<ParamString.\"PatientID\">  { \"PID-4711\"  }\n",
            &frame_of_reference,
            "<ParamString.\"tPatientName\">  { \"Doe^Jane\"  }\n",
            "<ParamString.\"InstitutionName\">  { <Visible> \"true\" \"General Hospital\"  }\n",
            "<ParamString.\"InstitutionAddress\">  { \"1 Main St\"  }\n",
            "<ParamString.\"PatientBirthDay\">  { \"19800115\"  }\n",
            "<ParamLong.\"lPatientSex\">  { 2  }\n",
            "<ParamDouble.\"flUsedPatientWeight\">  { <Precision> 16  72.500000  }\n",
            "<ParamString.\"SequenceDescription\">  { \"t1_mprage\"  }\n",
            "<ParamDouble.\"TR\">  { <Precision> 16  2300.000000  }\n",
            "<ParamString.\"SeriesInstanceUID\">  { \"1.3.12.2.1107.5.2.2023061509301234567\"  }\n",
            "<ParamString.\"PatientID\">  { \"PID-4711\"  }\n",
        ];
        lines.concat()
    }

    fn redact(text: &str) -> Redaction {
        Redactor::default().redact(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_length_preserved() {
        let text = header();
        let out = redact(&text);
        assert_eq!(out.text.len(), text.len());
    }

    #[test]
    fn test_exam_date_recorded_first() {
        let out = redact(&header());
        assert_eq!(out.matches.exam_date(), Some("2023-06-15"));
        assert_eq!(out.matches.iter().next().unwrap().0, EXAM_DATE);
        assert!(!out.previously_redacted());
    }

    #[test]
    fn test_numeric_blank_all_occurrences() {
        let out = redact(&header());
        let text = latin1_string(&out.text);

        assert_eq!(out.matches.get("Patient_id"), Some("PID-4711"));
        assert_eq!(
            text.matches("<ParamString.\"PatientID\">  { \"00000000\"  }\n")
                .count(),
            2
        );
        assert!(!text.contains("PID-4711"));
        assert!(text.contains(&format!("{{ \"{}\"  }}", "0".repeat(FOR_UID.len()))));
    }

    #[test]
    fn test_digit_zero() {
        let out = redact(&header());
        let text = latin1_string(&out.text);

        assert_eq!(out.matches.get("Patient_birthday"), Some("19800115"));
        assert!(text.contains("<ParamString.\"PatientBirthDay\">  { \"00000000\"  }\n"));
        assert_eq!(out.matches.get("Patient_gender"), Some("2"));
        assert!(text.contains("<ParamLong.\"lPatientSex\">  { 0  }\n"));
        assert_eq!(out.matches.get("Patient_weight"), Some("72.500000"));
        assert!(text.contains("<Precision> 16  00.000000  }\n"));
    }

    #[test]
    fn test_mask_keeps_visibility_syntax() {
        let out = redact(&header());
        let text = latin1_string(&out.text);

        assert_eq!(out.matches.get("Patient_name"), Some("Doe^Jane"));
        assert_eq!(out.matches.get("InstitutionName"), Some("General Hospital"));
        assert!(text.contains("<ParamString.\"tPatientName\">  { \"xxxxxxxx\"  }\n"));
        assert!(text.contains(&format!(
            "<ParamString.\"InstitutionName\">  {{ <Visible> \"true\" \"{}\"  }}\n",
            "x".repeat(16)
        )));
    }

    #[test]
    fn test_extract_only_leaves_text() {
        let out = redact(&header());
        let text = latin1_string(&out.text);

        assert_eq!(out.matches.get("Sequence"), Some("t1_mprage"));
        assert_eq!(out.matches.get("TR"), Some("2300.000000"));
        assert!(text.contains("{ \"t1_mprage\"  }"));
        assert!(!out.matches.contains("TI"));
    }

    #[test]
    fn test_sweep_catches_uncatalogued_uid() {
        let out = redact(&header());
        let text = latin1_string(&out.text);

        assert_eq!(out.swept, 1);
        assert!(!text.contains("230615"));
        assert!(text.contains("\"x.x.xx.x.xxxx.x.x.xxxxxxxxxxxxxxxxxxx\""));
    }

    #[test]
    fn test_sweep_catches_free_text_with_date() {
        let text = format!(
            "{}<ParamString.\"tProtocolName\">  {{ \"MR 230615 Doe\"  }}\n<ParamString.\"X\">  {{ \"MR-230615\"  }}\n",
            header()
        );
        let out = redact(&text);
        let redacted = latin1_string(&out.text);

        assert_eq!(out.swept, 3);
        assert!(!redacted.contains("230615"));
        assert!(!redacted.contains("Doe"));
        assert!(redacted.contains("{ \"xx xxxxxx xxx\"  }"));
        assert!(redacted.contains("{ \"xx-xxxxxx\"  }"));
    }

    #[test]
    fn test_missing_mask_field_is_fatal() {
        let text = header().replace("InstitutionAddress", "SomethingElse");
        let err = Redactor::default().redact(text.as_bytes()).unwrap_err();
        assert!(matches!(err, RedactError::MissingRequiredField(ref f) if f == "InstitutionAddress"));
    }

    #[test]
    fn test_missing_frame_of_reference_is_fatal() {
        let text = header().replace("FrameOfReference", "FrameOfSomething");
        let err = Redactor::default().redact(text.as_bytes()).unwrap_err();
        assert!(matches!(err, RedactError::MissingRequiredField(ref f) if f == FRAME_OF_REFERENCE));
    }

    #[test]
    fn test_malformed_date_is_fatal() {
        let text = header().replace(FOR_UID, "1.3.12.2.1107.5.2.19.45074.1.20231399093012345.0.0.0");
        let err = Redactor::default().redact(text.as_bytes()).unwrap_err();
        assert!(matches!(err, RedactError::MalformedDateToken(_)));
    }

    #[test]
    fn test_blank_frame_of_reference_on_live_header() {
        let text = header().replace(FOR_UID, &"0".repeat(FOR_UID.len()));
        let err = Redactor::default().redact(text.as_bytes()).unwrap_err();
        assert!(matches!(err, RedactError::MalformedDateToken(ref m) if m.contains("Patient_name")));
    }

    #[test]
    fn test_optional_fields_absent() {
        let text = header().replace("PatientBirthDay", "Unrelated");
        let out = redact(&text);
        assert!(!out.matches.contains("Patient_birthday"));
        assert!(!out.matches.contains("Device_serial"));
    }

    #[test]
    fn test_second_pass_is_noop_for_blank_and_mask() {
        let first = redact(&header());
        let second = Redactor::default().redact(&first.text).unwrap();

        assert!(second.previously_redacted());
        assert_eq!(second.text, first.text);
        for name in ["Patient_id", "FrameOfReference", "Patient_name", "InstitutionName", "InstitutionAddress"] {
            assert!(!second.matches.contains(name), "{}", name);
        }
        assert!(second.matches.exam_date().is_none());
        assert_eq!(second.matches.get("Sequence"), Some("t1_mprage"));
    }
}
