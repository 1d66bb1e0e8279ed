use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use twix_config::Config;
use twix_core::{Container, ContainerVariant, MeasurementSummary};
use twix_security::MatchRecord;

#[derive(Serialize)]
struct Report<'a> {
    variant: ContainerVariant,
    size: u64,
    measurements: Vec<MeasurementInfo<'a>>,
}

#[derive(Serialize)]
struct MeasurementInfo<'a> {
    index: u32,
    header_offset: u64,
    header_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    entry: Option<MeasurementSummary>,
    previously_redacted: bool,
    matches: &'a MatchRecord,
}

pub fn handle(file: &Path, json: bool, config: &Config) -> Result<()> {
    let redactor = super::redactor(config)?;
    let mut reader =
        BufReader::new(File::open(file).with_context(|| format!("Failed to open {}", file.display()))?);

    let container = Container::open(&mut reader)?;
    let plan = container
        .plan(&mut reader, &redactor)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let report = Report {
        variant: container.variant,
        size: container.len,
        measurements: plan
            .measurements
            .iter()
            .map(|m| MeasurementInfo {
                index: m.index,
                header_offset: m.header_offset,
                header_size: m.header_size,
                entry: m.entry.as_ref().map(MeasurementSummary::from),
                previously_redacted: m.redaction.previously_redacted(),
                matches: &m.redaction.matches,
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", file.display());
    println!("  Variant: {}", report.variant);
    println!("  Size: {} bytes", report.size);
    println!("  Measurements: {}", report.measurements.len());

    for m in &report.measurements {
        println!();
        print!("  [{}] header at {} ({} bytes)", m.index, m.header_offset, m.header_size);
        match &m.entry {
            Some(entry) => println!(" meas_id={} protocol={}", entry.meas_id, entry.protocol),
            None => println!(),
        }
        if m.previously_redacted {
            println!("      (already anonymized)");
        }
        for (name, value) in m.matches.iter() {
            println!("      {:<28} {}", name, value);
        }
    }

    Ok(())
}
