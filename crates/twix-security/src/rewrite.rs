//! Length-checked in-place rewriting of the header text buffer

use std::ops::Range;

use crate::{RedactError, Result};

/// One rewrite pass over a fixed-length buffer.
///
/// Spans are overwritten in place and must be replaced by exactly as many
/// bytes as they cover. [`RewritePass::finish`] re-checks the buffer length.
pub struct RewritePass<'a> {
    name: &'static str,
    buf: &'a mut Vec<u8>,
    len: usize,
    rewrites: usize,
}

impl<'a> RewritePass<'a> {
    pub fn new(name: &'static str, buf: &'a mut Vec<u8>) -> Self {
        let len = buf.len();
        Self {
            name,
            buf,
            len,
            rewrites: 0,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        self.buf.as_slice()
    }

    pub fn overwrite(&mut self, span: Range<usize>, replacement: &[u8]) -> Result<()> {
        if span.end > self.buf.len() || span.start > span.end {
            return Err(RedactError::SpanOutOfBounds {
                pass: self.name,
                start: span.start,
                end: span.end,
                len: self.buf.len(),
            });
        }
        if replacement.len() != span.len() {
            return Err(RedactError::LengthChanged {
                pass: self.name,
                expected: span.len(),
                found: replacement.len(),
            });
        }

        self.buf[span].copy_from_slice(replacement);
        self.rewrites += 1;
        Ok(())
    }

    /// Number of spans rewritten so far.
    pub fn rewrites(&self) -> usize {
        self.rewrites
    }

    pub fn finish(self) -> Result<usize> {
        if self.buf.len() != self.len {
            return Err(RedactError::LengthChanged {
                pass: self.name,
                expected: self.len,
                found: self.buf.len(),
            });
        }
        Ok(self.rewrites)
    }
}
