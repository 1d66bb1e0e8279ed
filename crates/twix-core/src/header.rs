//! Measurement header blocks
//!
//! ```text
//! [header_size: u32 LE][text: header_size - 28 bytes][opaque: 24 bytes]
//! ```
//!
//! `header_size` counts itself. The text is the protocol dump that carries the
//! patient fields; the trailing 24 bytes are binary and copied through as-is.

use byteorder::{ByteOrder, LittleEndian};
use std::io::{Read, Seek};

use crate::region::read_at;
use crate::{Error, Result};

/// Size of the `header_size` field.
pub const SIZE_FIELD: u64 = 4;

/// Opaque bytes at the end of every header block.
pub const TRAILING_SIZE: usize = 24;

#[derive(Debug, Clone)]
pub struct HeaderBlock {
    /// Absolute offset of the `header_size` field.
    pub offset: u64,
    pub header_size: u32,
    pub text: Vec<u8>,
    pub trailing: [u8; TRAILING_SIZE],
}

impl HeaderBlock {
    /// Read the header block starting at `offset`.
    pub fn read_at<R: Read + Seek>(input: &mut R, offset: u64, input_len: u64) -> Result<Self> {
        let size_bytes = read_at(input, "header size", offset, SIZE_FIELD as usize, input_len)?;
        let header_size = LittleEndian::read_u32(&size_bytes);

        let min_size = SIZE_FIELD as u32 + TRAILING_SIZE as u32;
        if header_size < min_size {
            return Err(Error::MalformedHeader {
                offset,
                reason: format!(
                    "header size {} is smaller than the minimum of {} bytes",
                    header_size, min_size
                ),
            });
        }

        let body_len = (header_size - SIZE_FIELD as u32) as usize;
        let mut body = read_at(input, "header body", offset + SIZE_FIELD, body_len, input_len)?;

        let split = body_len - TRAILING_SIZE;
        let mut trailing = [0u8; TRAILING_SIZE];
        trailing.copy_from_slice(&body[split..]);
        body.truncate(split);

        Ok(Self {
            offset,
            header_size,
            text: body,
            trailing,
        })
    }

    /// Absolute offset of the first text byte.
    pub fn text_offset(&self) -> u64 {
        self.offset + SIZE_FIELD
    }

    /// Absolute offset one past the end of the block.
    pub fn end(&self) -> u64 {
        self.offset + u64::from(self.header_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn block(text: &[u8]) -> Vec<u8> {
        let header_size = (4 + text.len() + TRAILING_SIZE) as u32;
        let mut bytes = header_size.to_le_bytes().to_vec();
        bytes.extend_from_slice(text);
        bytes.extend((0..TRAILING_SIZE as u8).map(|b| b | 0x80));
        bytes
    }

    #[test]
    fn test_split_text_and_trailing() {
        let mut bytes = vec![0xEE; 16];
        bytes.extend(block(b"<XProtocol> {}\n"));
        bytes.extend_from_slice(b"payload");
        let len = bytes.len() as u64;

        let header = HeaderBlock::read_at(&mut Cursor::new(bytes), 16, len).unwrap();

        assert_eq!(header.header_size as usize, 4 + 15 + TRAILING_SIZE);
        assert_eq!(header.text, b"<XProtocol> {}\n");
        assert_eq!(header.trailing[0], 0x80);
        assert_eq!(header.trailing[23], 0x97);
        assert_eq!(header.text_offset(), 20);
        assert_eq!(header.end(), 16 + u64::from(header.header_size));
    }

    #[test]
    fn test_header_too_small() {
        let bytes = 20u32.to_le_bytes().repeat(16);
        let err = HeaderBlock::read_at(&mut Cursor::new(bytes), 0, 64).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader { offset: 0, .. }));
    }

    #[test]
    fn test_header_body_truncated() {
        let mut bytes = block(b"some text");
        bytes.truncate(bytes.len() - 5);
        let len = bytes.len() as u64;

        let err = HeaderBlock::read_at(&mut Cursor::new(bytes), 0, len).unwrap_err();
        assert!(matches!(err, Error::TruncatedInput { context: "header body", .. }));
    }

    #[test]
    fn test_header_size_truncated() {
        let err = HeaderBlock::read_at(&mut Cursor::new(vec![1u8, 2]), 0, 2).unwrap_err();
        assert!(matches!(err, Error::TruncatedInput { context: "header size", .. }));
    }
}
