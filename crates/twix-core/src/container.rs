//! Container readers and writers
//!
//! Anonymizing a container happens in two phases:
//! 1. [`Container::plan`] reads every header block, runs the redactor and
//!    collects the patches to apply. Nothing is written in this phase, so any
//!    error aborts before the output is touched.
//! 2. [`ContainerPlan::write`] streams the input to the output with the
//!    patches laid over it.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom, Write};
use tracing::{debug, info};

use twix_security::{MASK_CHAR, MatchRecord, Redaction, Redactor};

use crate::dispatch::{ContainerVariant, classify};
use crate::header::HeaderBlock;
use crate::measurement::{ENTRY_SIZE, MeasurementEntry, NAME_SIZE, PATIENT_NAME_OFFSET};
use crate::patch::{self, Patch};
use crate::region::{check_available, read_at, stream_len};
use crate::{Error, Result};

/// An opened container: variant and total length, fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    pub variant: ContainerVariant,
    pub len: u64,
}

/// One redacted measurement header.
#[derive(Debug, Clone)]
pub struct MeasurementReport {
    pub index: u32,
    /// Table entry; `None` for VB files.
    pub entry: Option<MeasurementEntry>,
    pub header_offset: u64,
    pub header_size: u32,
    pub redaction: Redaction,
}

/// Everything needed to write the anonymized container.
#[derive(Debug, Clone)]
pub struct ContainerPlan {
    pub container: Container,
    pub measurements: Vec<MeasurementReport>,
    patches: Vec<Patch>,
}

impl Container {
    /// Classify `input`; the stream is left at offset 0.
    pub fn open<R: Read + Seek>(input: &mut R) -> Result<Self> {
        let variant = classify(input)?;
        let len = stream_len(input)?;
        Ok(Self { variant, len })
    }

    /// Read and redact every header block.
    pub fn plan<R: Read + Seek>(&self, input: &mut R, redactor: &Redactor) -> Result<ContainerPlan> {
        let (measurements, mut patches) = match self.variant {
            ContainerVariant::Vd => self.plan_vd(input, redactor)?,
            ContainerVariant::Vb => self.plan_vb(input, redactor)?,
        };

        patch::validate(&mut patches, self.len)?;
        info!(
            "{} container: {} measurement(s), {} region(s) to rewrite",
            self.variant,
            measurements.len(),
            patches.len()
        );

        Ok(ContainerPlan {
            container: *self,
            measurements,
            patches,
        })
    }

    fn plan_vd<R: Read + Seek>(
        &self,
        input: &mut R,
        redactor: &Redactor,
    ) -> Result<(Vec<MeasurementReport>, Vec<Patch>)> {
        check_available("container signature", 0, 8, self.len)?;
        input.seek(SeekFrom::Start(0))?;
        let _twix_id = input.read_u32::<LittleEndian>()?;
        let count = input.read_u32::<LittleEndian>()?;
        if count == 0 {
            return Err(Error::MalformedHeader {
                offset: 4,
                reason: "measurement table is empty".to_string(),
            });
        }

        let mut measurements = Vec::with_capacity(count as usize);
        let mut patches = Vec::with_capacity(2 * count as usize);

        for index in 0..count {
            let entry_offset = MeasurementEntry::table_offset(index);
            let raw = read_at(input, "measurement table entry", entry_offset, ENTRY_SIZE, self.len)?;
            let raw: [u8; ENTRY_SIZE] = raw
                .try_into()
                .map_err(|_| Error::InvalidLayout("short measurement table entry".to_string()))?;
            let entry = MeasurementEntry::decode(&raw);
            debug!(
                "Measurement {}: id={} offset={} length={}",
                index, entry.meas_id, entry.offset, entry.length
            );

            let header = HeaderBlock::read_at(input, entry.offset, self.len)?;
            if entry.length < u64::from(header.header_size) {
                return Err(Error::MalformedHeader {
                    offset: entry.offset,
                    reason: format!(
                        "measurement length {} is smaller than header size {}",
                        entry.length, header.header_size
                    ),
                });
            }
            check_available("measurement data", entry.offset, entry.length, self.len)?;

            let redaction = redactor.redact(&header.text)?;

            patches.push(Patch::new(
                entry_offset + PATIENT_NAME_OFFSET as u64,
                vec![MASK_CHAR; NAME_SIZE],
            ));
            patches.push(Patch::new(header.text_offset(), redaction.text.clone()));

            measurements.push(MeasurementReport {
                index,
                entry: Some(entry),
                header_offset: header.offset,
                header_size: header.header_size,
                redaction,
            });
        }

        Ok((measurements, patches))
    }

    fn plan_vb<R: Read + Seek>(
        &self,
        input: &mut R,
        redactor: &Redactor,
    ) -> Result<(Vec<MeasurementReport>, Vec<Patch>)> {
        let header = HeaderBlock::read_at(input, 0, self.len)?;
        let redaction = redactor.redact(&header.text)?;

        let patches = vec![Patch::new(header.text_offset(), redaction.text.clone())];
        let measurements = vec![MeasurementReport {
            index: 0,
            entry: None,
            header_offset: header.offset,
            header_size: header.header_size,
            redaction,
        }];

        Ok((measurements, patches))
    }
}

impl ContainerPlan {
    /// Match record of the last measurement.
    ///
    /// VD files with several measurements report only the final one here;
    /// use [`ContainerPlan::measurements`] for all of them.
    pub fn matches(&self) -> Option<&MatchRecord> {
        self.measurements.last().map(|m| &m.redaction.matches)
    }

    /// Stream the anonymized container to `output`.
    pub fn write<R: Read + Seek, W: Write>(&self, input: &mut R, output: &mut W) -> Result<u64> {
        let written = patch::write_patched(input, output, &self.patches, self.container.len)?;
        debug!("Wrote {} bytes", written);
        Ok(written)
    }
}

/// Open, plan and (optionally) write in one call.
///
/// With `output == None` only the match records are produced.
pub fn anonymize<R: Read + Seek, W: Write>(
    input: &mut R,
    output: Option<&mut W>,
    redactor: &Redactor,
) -> Result<ContainerPlan> {
    let container = Container::open(input)?;
    let plan = container.plan(input, redactor)?;
    if let Some(output) = output {
        plan.write(input, output)?;
    }
    Ok(plan)
}
