//! Batch runner
//!
//! Files are anonymized on the blocking pool, at most `jobs` at a time.
//! Record rows are appended by this task alone, in input order, as soon as
//! every earlier file has finished.

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use twix_storage::{Record, RecordTable};

use crate::anonymizer::{Anonymizer, FileOutcome};

#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Files anonymized successfully.
    pub processed: usize,
    /// Files that failed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
    /// Rows in the record table after the batch.
    pub rows: usize,
}

pub async fn run_batch(
    anonymizer: Arc<Anonymizer>,
    files: Vec<PathBuf>,
    out_dir: PathBuf,
    table: RecordTable,
    jobs: usize,
) -> Result<BatchSummary> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let out_dir = Arc::new(out_dir);
    let mut set = JoinSet::new();

    info!("Processing {} file(s) with {} job(s)", files.len(), jobs.max(1));

    for (index, path) in files.iter().cloned().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let anonymizer = Arc::clone(&anonymizer);
        let out_dir = Arc::clone(&out_dir);
        set.spawn(async move {
            let result: Result<FileOutcome> = async move {
                let _permit = semaphore.acquire_owned().await?;
                tokio::task::spawn_blocking(move || anonymizer.process_file(&path, &out_dir))
                    .await?
            }
            .await;
            (index, result)
        });
    }

    let mut summary = BatchSummary::default();
    let mut pending: BTreeMap<usize, Vec<Record>> = BTreeMap::new();
    let mut next = 0;

    while let Some(joined) = set.join_next().await {
        let (index, result) = joined?;
        match result {
            Ok(outcome) => {
                summary.processed += 1;
                pending.insert(index, outcome.records);
            }
            Err(err) => {
                error!("Failed to process {}: {:#}", files[index].display(), err);
                summary.failed.push((files[index].clone(), format!("{:#}", err)));
                pending.insert(index, Vec::new());
            }
        }

        let mut rows = Vec::new();
        while let Some(records) = pending.remove(&next) {
            rows.extend(records);
            next += 1;
        }
        if !rows.is_empty() {
            summary.rows = table.append(&rows)?;
        }
    }

    if summary.rows == 0 {
        summary.rows = table.read()?.rows.len();
    }
    info!(
        "{} file(s) anonymized, {} failed, record table {} ({} rows)",
        summary.processed,
        summary.failed.len(),
        table.path().display(),
        summary.rows
    );

    Ok(summary)
}
