//! VD measurement table entries
//!
//! The table starts right after the 8-byte file header. Each entry is 152
//! bytes, little-endian:
//!
//! ```text
//! [meas_id: u32][file_id: u32][offset: u64][length: u64]
//! [patient_name: 64 bytes][protocol_name: 64 bytes]
//! ```

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use twix_security::latin1_string;

/// Byte offset of the measurement table.
pub const TABLE_OFFSET: u64 = 8;

/// Size of one table entry.
pub const ENTRY_SIZE: usize = 152;

/// Width of the patient and protocol name fields.
pub const NAME_SIZE: usize = 64;

/// Offset of `patient_name` within an entry.
pub const PATIENT_NAME_OFFSET: usize = 24;

/// Offset of `protocol_name` within an entry.
pub const PROTOCOL_NAME_OFFSET: usize = PATIENT_NAME_OFFSET + NAME_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementEntry {
    pub meas_id: u32,
    pub file_id: u32,
    /// Absolute offset of the measurement's header block.
    pub offset: u64,
    /// Size of the whole measurement: header plus payload.
    pub length: u64,
    pub patient_name: [u8; NAME_SIZE],
    pub protocol_name: [u8; NAME_SIZE],
}

impl MeasurementEntry {
    /// Absolute offset of entry `index` in the container.
    pub fn table_offset(index: u32) -> u64 {
        TABLE_OFFSET + ENTRY_SIZE as u64 * u64::from(index)
    }

    pub fn decode(bytes: &[u8; ENTRY_SIZE]) -> Self {
        let mut patient_name = [0u8; NAME_SIZE];
        patient_name.copy_from_slice(&bytes[PATIENT_NAME_OFFSET..PROTOCOL_NAME_OFFSET]);
        let mut protocol_name = [0u8; NAME_SIZE];
        protocol_name.copy_from_slice(&bytes[PROTOCOL_NAME_OFFSET..ENTRY_SIZE]);

        Self {
            meas_id: LittleEndian::read_u32(&bytes[0..4]),
            file_id: LittleEndian::read_u32(&bytes[4..8]),
            offset: LittleEndian::read_u64(&bytes[8..16]),
            length: LittleEndian::read_u64(&bytes[16..24]),
            patient_name,
            protocol_name,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ENTRY_SIZE);
        out.extend_from_slice(&self.meas_id.to_le_bytes());
        out.extend_from_slice(&self.file_id.to_le_bytes());
        out.extend_from_slice(&self.offset.to_le_bytes());
        out.extend_from_slice(&self.length.to_le_bytes());
        out.extend_from_slice(&self.patient_name);
        out.extend_from_slice(&self.protocol_name);
        out
    }

    /// Protocol name up to the first NUL.
    pub fn protocol(&self) -> String {
        trimmed_name(&self.protocol_name)
    }
}

fn trimmed_name(field: &[u8; NAME_SIZE]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(NAME_SIZE);
    latin1_string(&field[..end])
}

/// Table entry summary safe to print: the patient name is left out.
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementSummary {
    pub meas_id: u32,
    pub file_id: u32,
    pub offset: u64,
    pub length: u64,
    pub protocol: String,
}

impl From<&MeasurementEntry> for MeasurementSummary {
    fn from(entry: &MeasurementEntry) -> Self {
        Self {
            meas_id: entry.meas_id,
            file_id: entry.file_id,
            offset: entry.offset,
            length: entry.length,
            protocol: entry.protocol(),
        }
    }
}
