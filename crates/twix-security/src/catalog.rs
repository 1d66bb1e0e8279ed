//! Catalog of sensitive and clinical header fields
//!
//! The catalog is built once and handed to the [`Redactor`](crate::Redactor);
//! it is never mutated afterwards. Order matters: fields are processed in
//! catalog order within each policy group, and record columns follow it.

use serde::{Deserialize, Serialize};

use crate::matcher::FieldMatcher;
use crate::policy::RedactionPolicy;
use crate::Result;

/// Name of the field the exam date is derived from.
pub const FRAME_OF_REFERENCE: &str = "FrameOfReference";

/// A named field with its matcher and redaction policy.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    pub name: String,
    pub matcher: FieldMatcher,
    pub policy: RedactionPolicy,
}

impl FieldPattern {
    pub fn new(name: impl Into<String>, pattern: &str, policy: RedactionPolicy) -> Result<Self> {
        let name = name.into();
        let matcher = FieldMatcher::new(&name, pattern)?;
        Ok(Self {
            name,
            matcher,
            policy,
        })
    }
}

/// User-supplied field definition, as read from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub pattern: String,
    pub policy: RedactionPolicy,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    fields: Vec<FieldPattern>,
}

// Quoted string value, no visibility sub-syntax.
fn string_field(tag: &str) -> String {
    format!(
        r#"(?P<pre><ParamString."{tag}">\s*\{{\s*")(?P<val>.+)(?P<suf>"\s*\}}\n)"#
    )
}

// Quoted string value with optional `<Visible> "true"`.
fn visible_string_field(tag: &str, value: &str) -> String {
    format!(
        r#"(?P<pre><ParamString."{tag}">\s*\{{(?P<vis>\s*<Visible>\s*"true"\s*)?\s*")(?P<val>{value})(?P<suf>"\s*\}}\n)"#
    )
}

// Unquoted integer with optional `<Visible> "true"`.
fn visible_long_field(tag: &str) -> String {
    format!(
        r#"(?P<pre><ParamLong."{tag}">\s*\{{(?P<vis>\s*<Visible>\s*"true"\s*)?\s*)(?P<val>\d+)(?P<suf>\s*\}}\n)"#
    )
}

// Decimal with optional `<Visible> "true"`, optional extra syntax and `<Precision>`.
fn visible_double_field(tag: &str, extra: &str) -> String {
    format!(
        r#"(?P<pre><ParamDouble."{tag}">\s*\{{(?P<vis>\s*<Visible>\s*"true"\s*)?\s*{extra}<Precision> \d+\s*)(?P<val>\d+\.\d*)(?P<suf>\s*\}}\n)"#
    )
}

fn long_field(tag: &str) -> String {
    format!(r#"(?P<pre><ParamLong."{tag}">\s*\{{\s*)(?P<val>\d+)(?P<suf>\s*\}}\n)"#)
}

fn double_field(tag: &str) -> String {
    format!(
        r#"(?P<pre><ParamDouble."{tag}">\s*\{{\s*<Precision> \d+\s*)(?P<val>\d+\.\d*)(?P<suf>\s*\}}\n)"#
    )
}

impl Catalog {
    /// Built-in field catalog for TWIX protocol headers.
    pub fn builtin() -> Self {
        use RedactionPolicy::*;

        let numeric_blank = [
            ("Patient_id", string_field("PatientID")),
            ("Device_serial", string_field("DeviceSerialNumber")),
            ("Exam_memory_uid", string_field("ExamMemoryUID")),
            ("PatientLOID", string_field("PatientLOID")),
            ("StudyLOID", string_field("StudyLOID")),
            ("SeriesLOID", string_field("SeriesLOID")),
            ("Study", string_field("Study")),
            (FRAME_OF_REFERENCE, string_field("FrameOfReference")),
            ("Patient", string_field("Patient")),
            ("MeasUID", string_field("MeasUID")),
        ];
        let digit_zero = [
            ("Patient_gender", visible_long_field("l?PatientSex")),
            ("Patient_age", visible_double_field("flPatientAge", "")),
            ("Patient_weight", visible_double_field("flUsedPatientWeight", "")),
            (
                "Patient_height",
                visible_double_field("flPatientHeight", r#"<Unit> "\[mm\]"\s*"#),
            ),
            (
                "Patient_birthday",
                visible_string_field("PatientBirthDay", r"\d{8}"),
            ),
            ("ulVersion", visible_long_field("ulVersion")),
        ];
        let mask = [
            ("Patient_name", visible_string_field("t?Patients?Name", ".+")),
            (
                "InstitutionAddress",
                visible_string_field("InstitutionAddress", ".+"),
            ),
            ("InstitutionName", visible_string_field("InstitutionName", ".+")),
        ];
        let extract_only = [
            ("tBodyPartExamined", string_field("tBodyPartExamined")),
            ("Sequence", string_field("SequenceDescription")),
            ("TurboFactor", long_field("TurboFactor")),
            (
                "ReadoutOversamplingFactor",
                double_field("ReadoutOversamplingFactor"),
            ),
            ("NSlc", long_field("NSlc")),
            ("PhaseEncodingLines", long_field("PhaseEncodingLines")),
            ("ReadFoV", double_field("ReadFoV")),
            ("PhaseFoV", double_field("PhaseFoV")),
            ("PhaseResolution", double_field("PhaseResolution")),
            ("TR", double_field("TR")),
            ("TI", double_field("TI")),
            ("flMagneticFieldStrength", double_field("flMagneticFieldStrength")),
            ("PatientPosition", string_field("PatientPosition")),
        ];

        let groups: [(RedactionPolicy, &[(&str, String)]); 4] = [
            (NumericBlank, &numeric_blank),
            (DigitZero, &digit_zero),
            (Mask, &mask),
            (ExtractOnly, &extract_only),
        ];

        let fields = groups
            .iter()
            .flat_map(|(policy, entries)| {
                entries.iter().map(move |(name, pattern)| {
                    FieldPattern::new(*name, pattern, *policy)
                        .expect("built-in field pattern must compile")
                })
            })
            .collect();

        Self { fields }
    }

    /// Built-in catalog extended with user-supplied fields.
    ///
    /// A user field with the same name as a built-in one replaces it in place.
    pub fn with_extra(extra: &[FieldSpec]) -> Result<Self> {
        let mut catalog = Self::builtin();
        for spec in extra {
            let field = FieldPattern::new(spec.name.clone(), &spec.pattern, spec.policy)?;
            match catalog.fields.iter_mut().find(|f| f.name == field.name) {
                Some(existing) => *existing = field,
                None => catalog.fields.push(field),
            }
        }
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&FieldPattern> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields governed by `policy`, in catalog order.
    pub fn by_policy(&self, policy: RedactionPolicy) -> impl Iterator<Item = &FieldPattern> {
        self.fields.iter().filter(move |f| f.policy == policy)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldPattern> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
