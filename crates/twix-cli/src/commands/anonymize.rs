use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use twix_config::Config;
use twix_engine::{AnonymizeOptions, Anonymizer, run_batch};
use twix_sources::{Discovery, Input};
use twix_storage::RecordTable;

use crate::cli::AnonymizeArgs;

pub async fn handle(args: AnonymizeArgs, config: &Config) -> Result<()> {
    let input = Input::resolve(&args.input)?;

    if args.force && args.output.exists() {
        info!("Overwriting existing files in {}", args.output.display());
        std::fs::remove_dir_all(&args.output)
            .with_context(|| format!("Failed to remove {}", args.output.display()))?;
    }
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let discovery = Discovery {
        extension: config.extension.clone(),
        recursive: args.recursive,
    };
    let files = discovery.discover(&input)?;
    if files.is_empty() {
        anyhow::bail!("No .{} files found in {}", config.extension, args.input);
    }

    let table_path = args.table.clone().unwrap_or_else(|| {
        let name = config
            .records
            .table_name
            .clone()
            .unwrap_or_else(|| format!("{}.csv", input.name()));
        args.output.join(name)
    });

    let options = AnonymizeOptions {
        metadata_only: args.meta_only,
        per_measurement: config.records.per_measurement,
    };
    if options.metadata_only {
        info!("Only saving metadata, not writing anonymized files");
    }

    let anonymizer = Arc::new(Anonymizer::new(super::redactor(config)?, options));
    let jobs = args.jobs.unwrap_or(config.jobs);
    let summary = run_batch(
        anonymizer,
        files,
        PathBuf::from(&args.output),
        RecordTable::new(&table_path),
        jobs,
    )
    .await?;

    println!(
        "✓ Anonymized {} file(s) into {}",
        summary.processed,
        args.output.display()
    );
    println!("  Records: {} ({} rows)", table_path.display(), summary.rows);

    if !summary.failed.is_empty() {
        for (path, err) in &summary.failed {
            eprintln!("  ✗ {}: {}", path.display(), err);
        }
        anyhow::bail!("{} file(s) failed", summary.failed.len());
    }

    Ok(())
}
