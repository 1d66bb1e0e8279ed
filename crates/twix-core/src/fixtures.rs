//! Synthetic TWIX containers for tests

use crate::header::TRAILING_SIZE;
use crate::measurement::{ENTRY_SIZE, MeasurementEntry, NAME_SIZE};

/// Frame-of-reference UID dated 2023-06-15.
pub const FRAME_OF_REFERENCE_UID: &str = "1.3.12.2.1107.5.2.19.45074.1.20230615093012345.0.0.0";

/// Offset of the first measurement in generated VD files.
pub const VD_DATA_OFFSET: u64 = 10240;

/// Header text with one of every kind of catalogued field.
pub fn header_text(patient_id: &str, patient_name: &str) -> Vec<u8> {
    let lines = [
        "<XProtocol>\n{\n".to_string(),
        format!("<ParamString.\"PatientID\">  {{ \"{}\"  }}\n", patient_id),
        format!(
            "<ParamString.\"FrameOfReference\">  {{ \"{}\"  }}\n",
            FRAME_OF_REFERENCE_UID
        ),
        format!("<ParamString.\"tPatientName\">  {{ \"{}\"  }}\n", patient_name),
        "<ParamString.\"InstitutionName\">  { <Visible> \"true\" \"General Hospital\"  }\n"
            .to_string(),
        "<ParamString.\"InstitutionAddress\">  { \"1 Main St, Springfield\"  }\n".to_string(),
        "<ParamString.\"PatientBirthDay\">  { \"19800115\"  }\n".to_string(),
        "<ParamLong.\"lPatientSex\">  { 2  }\n".to_string(),
        "<ParamDouble.\"flPatientAge\">  { <Precision> 6  43.000000  }\n".to_string(),
        "<ParamString.\"DeviceSerialNumber\">  { \"45074\"  }\n".to_string(),
        "<ParamString.\"SequenceDescription\">  { \"t1_mprage_sag\"  }\n".to_string(),
        "<ParamLong.\"NSlc\">  { 176  }\n".to_string(),
        "<ParamDouble.\"flMagneticFieldStrength\">  { <Precision> 6  2.893620  }\n".to_string(),
        "<ParamString.\"SeriesInstanceUID\">  { \"1.3.12.2.1107.5.2.19.45074.2023061509301234567\"  }\n"
            .to_string(),
        "}\n".to_string(),
    ];
    lines.concat().into_bytes()
}

/// Header block: size field, text, 24 opaque bytes.
pub fn header_block(text: &[u8]) -> Vec<u8> {
    let header_size = (4 + text.len() + TRAILING_SIZE) as u32;
    let mut block = header_size.to_le_bytes().to_vec();
    block.extend_from_slice(text);
    block.extend((0..TRAILING_SIZE as u8).map(|b| 0xF0 ^ b));
    block
}

/// Measurement payload with every byte value represented.
pub fn payload(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
}

/// Single-measurement file: header at byte 0 followed by `data`.
pub fn vb_file(text: &[u8], data: &[u8]) -> Vec<u8> {
    let mut file = header_block(text);
    file.extend_from_slice(data);
    file
}

fn name_field(name: &str) -> [u8; NAME_SIZE] {
    let mut field = [0u8; NAME_SIZE];
    let len = name.len().min(NAME_SIZE);
    field[..len].copy_from_slice(&name.as_bytes()[..len]);
    field
}

/// Multi-measurement file from `(header text, payload)` pairs.
///
/// The file header area is padded to [`VD_DATA_OFFSET`] and measurements are
/// laid out back to back.
pub fn vd_file(measurements: &[(Vec<u8>, Vec<u8>)]) -> Vec<u8> {
    let count = measurements.len() as u32;
    let mut file = 0u32.to_le_bytes().to_vec();
    file.extend_from_slice(&count.to_le_bytes());

    let mut offset = VD_DATA_OFFSET;
    let mut blocks = Vec::new();
    for (i, (text, data)) in measurements.iter().enumerate() {
        let mut block = header_block(text);
        block.extend_from_slice(data);

        let entry = MeasurementEntry {
            meas_id: 100 + i as u32,
            file_id: 200 + i as u32,
            offset,
            length: block.len() as u64,
            patient_name: name_field("DOE^JANE"),
            protocol_name: name_field(&format!("protocol_{}", i)),
        };
        file.extend(entry.encode());

        offset += block.len() as u64;
        blocks.push(block);
    }

    debug_assert!(file.len() <= VD_DATA_OFFSET as usize - ENTRY_SIZE);
    file.resize(VD_DATA_OFFSET as usize, 0);
    for block in blocks {
        file.extend(block);
    }
    file
}
