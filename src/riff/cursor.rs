//! Bounds-checked little-endian reads over an in-memory byte slice

use crate::error::{Error, Result};

/// A read cursor over an immutable byte slice.
///
/// Every read is bounds-checked and fails with [`Error::Truncated`] when the
/// requested range extends past the end of the buffer. The cursor borrows the
/// slice; it never owns or copies the data.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, pos: 0 }
    }

    /// Current position in bytes from the start of the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left between the current position and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn check(&self, need: usize) -> Result<()> {
        if need > self.remaining() {
            return Err(Error::Truncated {
                need,
                have: self.remaining(),
            });
        }
        Ok(())
    }

    /// Advance by `n` bytes; fails if that passes the end of the buffer
    pub fn advance(&mut self, n: usize) -> Result<()> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }

    /// Advance by `n` bytes, clamping at the end of the buffer.
    ///
    /// Used when a declared chunk size is trusted for navigation but may
    /// overrun the file.
    pub fn skip(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n).min(self.data.len());
    }

    /// Read the next byte without advancing
    pub fn peek_u8(&self) -> Result<u8> {
        self.check(1)?;
        Ok(self.data[self.pos])
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8> {
        let b = self.peek_u8()?;
        self.pos += 1;
        Ok(b)
    }

    /// Read a little-endian u16
    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array::<2>()?))
    }

    /// Read a little-endian u32
    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Read a little-endian u64
    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array::<8>()?))
    }

    /// Read a fixed-size byte array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    /// Read `n` bytes as a borrowed span
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.check(n)?;
        let span = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_advance_in_order() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut cur = ByteCursor::new(&data);
        assert_eq!(cur.peek_u8().unwrap(), 0x01);
        assert_eq!(cur.read_u8().unwrap(), 0x01);
        assert_eq!(cur.read_u16_le().unwrap(), 0x0302);
        assert_eq!(cur.read_u32_le().unwrap(), 0x07060504);
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn test_truncated_read_reports_need_and_have() {
        let data = [0xAA, 0xBB];
        let mut cur = ByteCursor::new(&data);
        match cur.read_u32_le() {
            Err(Error::Truncated { need, have }) => {
                assert_eq!(need, 4);
                assert_eq!(have, 2);
            }
            other => panic!("expected Truncated, got {:?}", other),
        }
        // A failed read leaves the position untouched.
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn test_read_u64_le() {
        let data = 0x0102030405060708u64.to_le_bytes();
        let mut cur = ByteCursor::new(&data);
        assert_eq!(cur.read_u64_le().unwrap(), 0x0102030405060708);
    }

    #[test]
    fn test_read_bytes_borrows_span() {
        let data = b"fmt \x10\x00\x00\x00";
        let mut cur = ByteCursor::new(data);
        assert_eq!(cur.read_bytes(4).unwrap(), b"fmt ");
        assert_eq!(cur.read_u32_le().unwrap(), 16);
    }

    #[test]
    fn test_skip_clamps_at_end() {
        let data = [0u8; 4];
        let mut cur = ByteCursor::new(&data);
        cur.skip(100);
        assert_eq!(cur.position(), 4);
        assert!(cur.advance(1).is_err());
    }
}
