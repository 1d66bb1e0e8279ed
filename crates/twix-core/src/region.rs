//! Bounds-checked positional reads

use std::io::{Read, Seek, SeekFrom};

use crate::{Error, Result};

/// Fail with `TruncatedInput` unless `needed` bytes exist at `offset`.
pub fn check_available(
    context: &'static str,
    offset: u64,
    needed: u64,
    input_len: u64,
) -> Result<()> {
    let available = input_len.saturating_sub(offset);
    if available < needed {
        return Err(Error::TruncatedInput {
            context,
            offset,
            needed,
            available,
        });
    }
    Ok(())
}

/// Read exactly `len` bytes at `offset`.
pub fn read_at<R: Read + Seek>(
    input: &mut R,
    context: &'static str,
    offset: u64,
    len: usize,
    input_len: u64,
) -> Result<Vec<u8>> {
    check_available(context, offset, len as u64, input_len)?;

    input.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; len];
    input.read_exact(&mut buf)?;
    Ok(buf)
}

/// Total length of a seekable stream; the position is restored.
pub fn stream_len<S: Seek>(input: &mut S) -> Result<u64> {
    let pos = input.stream_position()?;
    let len = input.seek(SeekFrom::End(0))?;
    input.seek(SeekFrom::Start(pos))?;
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_at() {
        let mut input = Cursor::new(b"0123456789".to_vec());
        let bytes = read_at(&mut input, "test", 3, 4, 10).unwrap();
        assert_eq!(bytes, b"3456");
    }

    #[test]
    fn test_read_past_end() {
        let mut input = Cursor::new(b"0123".to_vec());
        let err = read_at(&mut input, "test", 2, 4, 4).unwrap_err();
        match err {
            Error::TruncatedInput {
                context,
                offset,
                needed,
                available,
            } => {
                assert_eq!(context, "test");
                assert_eq!(offset, 2);
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_stream_len_restores_position() {
        let mut input = Cursor::new(vec![0u8; 32]);
        input.set_position(5);
        assert_eq!(stream_len(&mut input).unwrap(), 32);
        assert_eq!(input.position(), 5);
    }
}
