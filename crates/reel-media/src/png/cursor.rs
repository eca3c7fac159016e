//! Bounds-checked reads over an owned byte buffer.

use bytes::{Buf, Bytes};

use crate::error::{FormatError, FormatResult};

/// Forward-only cursor over a PNG stream.
///
/// Every read checks the remaining length first, so a declared chunk length
/// that overruns the buffer surfaces as [`FormatError::Truncated`] instead of
/// a panic.
#[derive(Debug, Clone)]
pub struct ByteCursor {
    buf: Bytes,
    consumed: usize,
}

impl ByteCursor {
    /// Wrap a buffer, positioned at its first byte.
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self {
            buf: buf.into(),
            consumed: 0,
        }
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.consumed
    }

    fn ensure(&self, n: usize) -> FormatResult<()> {
        if self.buf.remaining() < n {
            return Err(FormatError::Truncated {
                need: n,
                have: self.buf.remaining(),
            });
        }
        Ok(())
    }

    /// Take exactly `n` bytes. The returned slice shares the buffer.
    pub fn read_exact(&mut self, n: usize) -> FormatResult<Bytes> {
        self.ensure(n)?;
        self.consumed += n;
        Ok(self.buf.split_to(n))
    }

    /// Read a fixed-size array (chunk tags, signatures).
    pub fn read_array<const N: usize>(&mut self) -> FormatResult<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        self.consumed += N;
        Ok(out)
    }

    /// Read a big-endian u32.
    pub fn read_u32(&mut self) -> FormatResult<u32> {
        self.ensure(4)?;
        self.consumed += 4;
        Ok(self.buf.get_u32())
    }

    /// Advance past `n` bytes without materializing them.
    pub fn skip(&mut self, n: usize) -> FormatResult<()> {
        self.ensure(n)?;
        self.consumed += n;
        self.buf.advance(n);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_and_tracks_position() {
        let mut cursor = ByteCursor::new(vec![0, 0, 1, 0, b'a', b'b', b'c']);
        assert_eq!(cursor.read_u32().unwrap(), 256);
        assert_eq!(cursor.position(), 4);
        assert_eq!(&cursor.read_exact(2).unwrap()[..], b"ab");
        assert_eq!(cursor.remaining(), 1);
    }

    #[test]
    fn overrun_is_truncated() {
        let mut cursor = ByteCursor::new(vec![1, 2, 3]);
        match cursor.read_exact(4) {
            Err(FormatError::Truncated { need, have }) => {
                assert_eq!(need, 4);
                assert_eq!(have, 3);
            }
            other => panic!("expected Truncated, got {other:?}"),
        }
        // A failed read does not move the cursor.
        assert_eq!(cursor.position(), 0);
        assert!(cursor.skip(3).is_ok());
        assert!(cursor.read_u32().is_err());
    }

    #[test]
    fn read_array_copies_tag() {
        let mut cursor = ByteCursor::new(&b"IEND"[..]);
        assert_eq!(&cursor.read_array::<4>().unwrap(), b"IEND");
        assert_eq!(cursor.remaining(), 0);
    }
}
