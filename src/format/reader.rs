//! Low-level, bounds-checked binary reading utilities for node parsing.

use crate::{Error, Result};

/// A cursor over a bounded window of a pack buffer.
///
/// Offsets reported in errors are absolute positions in the underlying
/// buffer, so a corrupt node deep inside a container is reported where it
/// actually lives.
#[derive(Debug, Clone)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> SliceReader<'a> {
    /// Creates a reader over `data[start..end]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptArchive`] if the window lies outside `data`.
    pub fn new(data: &'a [u8], start: usize, end: usize) -> Result<Self> {
        if start > end || end > data.len() {
            return Err(Error::corrupt(
                start,
                format!(
                    "range {}..{} exceeds buffer of {} bytes",
                    start,
                    end,
                    data.len()
                ),
            ));
        }
        Ok(Self {
            data,
            pos: start,
            end,
        })
    }

    /// Returns the absolute position of the next byte to read.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bytes left in the window.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    /// Returns true if the window is exhausted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos == self.end
    }

    /// Reads `count` bytes, describing the field as `what` on failure.
    pub fn read_bytes(&mut self, count: usize, what: &str) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::corrupt(
                self.pos,
                format!(
                    "truncated {}: need {} bytes, {} available",
                    what,
                    count,
                    self.remaining()
                ),
            ));
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.read_bytes(1, what)?[0])
    }

    /// Reads an unsigned 16-bit little-endian integer.
    pub fn read_u16_le(&mut self, what: &str) -> Result<u16> {
        let bytes = self.read_bytes(2, what)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Reads an unsigned 32-bit little-endian integer.
    pub fn read_u32_le(&mut self, what: &str) -> Result<u32> {
        let bytes = self.read_bytes(4, what)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a UTF-8 string of `len` bytes.
    pub fn read_str(&mut self, len: usize, what: &str) -> Result<&'a str> {
        let start = self.pos;
        let bytes = self.read_bytes(len, what)?;
        std::str::from_utf8(bytes)
            .map_err(|e| Error::corrupt(start, format!("{} is not valid UTF-8: {}", what, e)))
    }

    /// Skips `count` bytes.
    pub fn skip(&mut self, count: usize, what: &str) -> Result<()> {
        self.read_bytes(count, what).map(|_| ())
    }
}

/// Reads the little-endian u32 stored at `offset`.
pub fn read_u32_le_at(data: &[u8], offset: usize) -> Result<u32> {
    SliceReader::new(data, offset, data.len())?.read_u32_le("size field")
}

/// Overwrites the little-endian u32 stored at `offset`.
pub fn write_u32_le_at(data: &mut [u8], offset: usize, value: u32) -> Result<()> {
    let field = data
        .get_mut(offset..offset + 4)
        .ok_or_else(|| Error::corrupt(offset, "size field lies outside the buffer"))?;
    field.copy_from_slice(&value.to_le_bytes());
    Ok(())
}
