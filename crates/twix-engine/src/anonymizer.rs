use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use twix_core::{ContainerPlan, ContainerVariant};
use twix_security::{MatchRecord, Redactor};
use twix_storage::Record;

use crate::naming::{OutputNamer, UuidNamer};

/// Extra record column holding the measurement index in per-measurement mode.
pub const MEASUREMENT: &str = "Measurement";

#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymizeOptions {
    /// Only extract the match records; no container is written.
    pub metadata_only: bool,
    /// One record row per measurement instead of the last one only.
    pub per_measurement: bool,
}

/// Result of processing one input file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub anonymized_id: String,
    /// `None` in metadata-only mode.
    pub output: Option<PathBuf>,
    pub variant: ContainerVariant,
    pub records: Vec<Record>,
}

pub struct Anonymizer {
    redactor: Arc<Redactor>,
    namer: Arc<dyn OutputNamer>,
    options: AnonymizeOptions,
}

impl Anonymizer {
    pub fn new(redactor: Redactor, options: AnonymizeOptions) -> Self {
        Self {
            redactor: Arc::new(redactor),
            namer: Arc::new(UuidNamer),
            options,
        }
    }

    pub fn with_namer(mut self, namer: impl OutputNamer + 'static) -> Self {
        self.namer = Arc::new(namer);
        self
    }

    /// Anonymize `input` into `out_dir/<id>.dat`.
    ///
    /// The container is written to a temp file in `out_dir` and only moved
    /// into place once fully written, so a failure never leaves a partial file.
    pub fn process_file(&self, input: &Path, out_dir: &Path) -> Result<FileOutcome> {
        let file =
            File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
        let mut reader = BufReader::new(file);
        let anonymized_id = self.namer.next_id();

        let (plan, output) = if self.options.metadata_only {
            let plan = twix_core::anonymize::<_, File>(&mut reader, None, &self.redactor)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            (plan, None)
        } else {
            let tmp = NamedTempFile::new_in(out_dir)
                .with_context(|| format!("Failed to create temp file in {}", out_dir.display()))?;
            let plan = {
                let mut writer = BufWriter::new(tmp.as_file());
                let plan = twix_core::anonymize(&mut reader, Some(&mut writer), &self.redactor)
                    .with_context(|| format!("Failed to anonymize {}", input.display()))?;
                writer.flush()?;
                plan
            };

            let dest = out_dir.join(format!("{}.dat", anonymized_id));
            tmp.persist(&dest)
                .with_context(|| format!("Failed to write {}", dest.display()))?;
            (plan, Some(dest))
        };

        match &output {
            Some(dest) => info!("{} -> {}", input.display(), dest.display()),
            None => info!("{} -> {} (metadata only)", input.display(), anonymized_id),
        }

        let records = self.records(&plan, input, &anonymized_id);
        debug!("{} record row(s) for {}", records.len(), input.display());

        Ok(FileOutcome {
            input: input.to_path_buf(),
            anonymized_id,
            output,
            variant: plan.container.variant,
            records,
        })
    }

    fn records(&self, plan: &ContainerPlan, input: &Path, anonymized_id: &str) -> Vec<Record> {
        let record = |matches: MatchRecord| Record {
            anonymized_id: anonymized_id.to_string(),
            orig_filename: input.display().to_string(),
            matches,
        };

        if self.options.per_measurement {
            plan.measurements
                .iter()
                .map(|m| {
                    let mut matches = m.redaction.matches.clone();
                    matches.insert(MEASUREMENT, m.index.to_string());
                    record(matches)
                })
                .collect()
        } else {
            plan.matches().cloned().map(record).into_iter().collect()
        }
    }
}
