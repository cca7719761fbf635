//! Bounds-checked read cursor shared by every decoder.

use crate::error::{DecodeError, Result};

/// Read cursor over one resource's bytes. All reads are little-endian.
///
/// The cursor remembers which resource it reads and which structure is
/// currently being decoded so that errors point at the exact spot.
#[derive(Clone)]
pub struct ByteCursor<'a> {
    resource: &'a str,
    structure: &'static str,
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(resource: &'a str, data: &'a [u8]) -> Self {
        Self {
            resource,
            structure: "data",
            data,
            pos: 0,
        }
    }

    /// Label the structure the following reads belong to.
    pub fn section(&mut self, structure: &'static str) {
        self.structure = structure;
    }

    pub fn resource(&self) -> &'a str {
        self.resource
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Seek to an absolute position. Seeking to the very end is allowed.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(DecodeError::out_of_range(
                self.resource,
                self.structure,
                pos,
                self.data.len(),
            ));
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Read exactly `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.pos + n > self.data.len() {
            return Err(DecodeError::TruncatedInput {
                resource: self.resource.to_string(),
                structure: self.structure,
                offset: self.pos,
                need: n,
                have: self.remaining(),
            });
        }
        Ok(())
    }
}
