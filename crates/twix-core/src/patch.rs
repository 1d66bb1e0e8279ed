//! Patch overlay writer
//!
//! The output container is the input stream with a sorted set of
//! same-length patches laid over it. Every byte not covered by a patch is
//! copied verbatim, so the output is exactly as long as the input.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::{Error, Result};

/// Bytes that replace the input at `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub offset: u64,
    pub bytes: Vec<u8>,
}

impl Patch {
    pub fn new(offset: u64, bytes: Vec<u8>) -> Self {
        Self { offset, bytes }
    }

    pub fn end(&self) -> u64 {
        self.offset + self.bytes.len() as u64
    }
}

/// Sort patches and reject overlaps or patches past `input_len`.
pub fn validate(patches: &mut [Patch], input_len: u64) -> Result<()> {
    patches.sort_by_key(|p| p.offset);

    for pair in patches.windows(2) {
        if pair[0].end() > pair[1].offset {
            return Err(Error::InvalidLayout(format!(
                "rewrite regions overlap: {}..{} and {}..{}",
                pair[0].offset,
                pair[0].end(),
                pair[1].offset,
                pair[1].end()
            )));
        }
    }

    if let Some(last) = patches.last() {
        if last.end() > input_len {
            return Err(Error::InvalidLayout(format!(
                "rewrite region {}..{} extends past end of input ({} bytes)",
                last.offset,
                last.end(),
                input_len
            )));
        }
    }

    Ok(())
}

/// Copy `input` to `output`, substituting `patches`.
///
/// `patches` must have passed [`validate`]. Returns the number of bytes written.
pub fn write_patched<R: Read + Seek, W: Write>(
    input: &mut R,
    output: &mut W,
    patches: &[Patch],
    input_len: u64,
) -> Result<u64> {
    input.seek(SeekFrom::Start(0))?;
    let mut pos = 0u64;

    for patch in patches {
        copy_exact(input, output, patch.offset - pos)?;
        output.write_all(&patch.bytes)?;
        input.seek(SeekFrom::Current(patch.bytes.len() as i64))?;
        pos = patch.end();
    }
    copy_exact(input, output, input_len - pos)?;
    output.flush()?;

    Ok(input_len)
}

fn copy_exact<R: Read, W: Write>(input: &mut R, output: &mut W, len: u64) -> Result<()> {
    let copied = io::copy(&mut input.by_ref().take(len), output)?;
    if copied != len {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("input ended after {} of {} bytes", copied, len),
        )));
    }
    Ok(())
}
