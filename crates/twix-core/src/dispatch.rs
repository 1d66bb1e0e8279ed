//! Container variant detection
//!
//! The first 8 bytes are read as two little-endian `u32`. A multi-raid (VD)
//! file starts with a zero id followed by a measurement count of at most 64;
//! anything else is treated as a single-measurement (VB) file, whose first
//! word is the header size.

use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;
use std::fmt;
use std::io::{Read, Seek, SeekFrom};

use crate::region::{check_available, stream_len};
use crate::Result;

/// Largest measurement count a VD file header can declare.
pub const MAX_MEASUREMENTS: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerVariant {
    /// Multi-measurement layout with a measurement table (variant A).
    Vd,
    /// Single measurement whose header starts at byte 0 (variant B).
    Vb,
}

impl fmt::Display for ContainerVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerVariant::Vd => write!(f, "VD"),
            ContainerVariant::Vb => write!(f, "VB"),
        }
    }
}

/// Classify the container; the stream is left at offset 0.
pub fn classify<R: Read + Seek>(input: &mut R) -> Result<ContainerVariant> {
    let input_len = stream_len(input)?;
    check_available("container signature", 0, 8, input_len)?;

    input.seek(SeekFrom::Start(0))?;
    let first = input.read_u32::<LittleEndian>()?;
    let second = input.read_u32::<LittleEndian>()?;
    input.seek(SeekFrom::Start(0))?;

    let variant = if first == 0 && second <= MAX_MEASUREMENTS {
        ContainerVariant::Vd
    } else {
        ContainerVariant::Vb
    };
    Ok(variant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::Cursor;

    fn signature(a: u32, b: u32) -> Cursor<Vec<u8>> {
        let mut bytes = a.to_le_bytes().to_vec();
        bytes.extend_from_slice(&b.to_le_bytes());
        bytes.extend_from_slice(&[0xAA; 16]);
        Cursor::new(bytes)
    }

    #[test]
    fn test_vd_signature() {
        let mut input = signature(0, 2);
        assert_eq!(classify(&mut input).unwrap(), ContainerVariant::Vd);
        assert_eq!(input.position(), 0);
    }

    #[test]
    fn test_vd_upper_bound() {
        assert_eq!(classify(&mut signature(0, 64)).unwrap(), ContainerVariant::Vd);
        assert_eq!(classify(&mut signature(0, 65)).unwrap(), ContainerVariant::Vb);
    }

    #[test]
    fn test_vb_signature() {
        let mut input = signature(11_000, 4);
        assert_eq!(classify(&mut input).unwrap(), ContainerVariant::Vb);
        assert_eq!(input.position(), 0);
    }

    #[test]
    fn test_truncated_signature() {
        let mut input = Cursor::new(vec![0u8; 7]);
        let err = classify(&mut input).unwrap_err();
        assert!(matches!(err, Error::TruncatedInput { needed: 8, available: 7, .. }));
    }
}
