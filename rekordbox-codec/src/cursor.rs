//! Bounds-checked byte reader/writer with explicit endianness
//!
//! ANLZ files are big-endian, settings files little-endian. Neither side
//! gets a default: every reader and writer is constructed with its byte
//! order, and fixed-layout records can be read through `binrw` with the
//! same order.

use std::io::Cursor;

use binrw::{BinRead, BinWrite, Endian};

use crate::error::{Error, Result};

/// Sequential reader over a borrowed byte buffer
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self { data, pos: 0, endian }
    }

    pub fn big_endian(data: &'a [u8]) -> Self {
        Self::new(data, Endian::Big)
    }

    pub fn little_endian(data: &'a [u8]) -> Self {
        Self::new(data, Endian::Little)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True once every byte has been read
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move to an absolute offset. Seeking to the end is allowed.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(Error::TruncatedInput {
                offset: pos,
                needed: 0,
                available: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(Error::TruncatedInput {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Everything from the current position to the end
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos.min(self.data.len())..];
        self.pos = self.data.len();
        rest
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let raw = self.read_array::<2>()?;
        Ok(match self.endian {
            Endian::Big => u16::from_be_bytes(raw),
            Endian::Little => u16::from_le_bytes(raw),
        })
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let raw = self.read_array::<4>()?;
        Ok(match self.endian {
            Endian::Big => u32::from_be_bytes(raw),
            Endian::Little => u32::from_le_bytes(raw),
        })
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    /// Read a fixed-layout `binrw` record at the current position.
    pub fn read_struct<T>(&mut self) -> Result<T>
    where
        T: for<'b> BinRead<Args<'b> = ()>,
    {
        let mut cursor = Cursor::new(&self.data[self.pos..]);
        let value = T::read_options(&mut cursor, self.endian, ())?;
        self.pos += cursor.position() as usize;
        Ok(value)
    }
}

/// Growable output buffer, mirror of [`ByteReader`]
#[derive(Debug, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
    endian: Endian,
}

impl ByteWriter {
    pub fn new(endian: Endian) -> Self {
        Self {
            buf: Vec::new(),
            endian,
        }
    }

    pub fn big_endian() -> Self {
        Self::new(Endian::Big)
    }

    pub fn little_endian() -> Self {
        Self::new(Endian::Little)
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        match self.endian {
            Endian::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
            Endian::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
        }
    }

    pub fn write_u32(&mut self, value: u32) {
        match self.endian {
            Endian::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
            Endian::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
        }
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_u32(value as u32);
    }

    /// Overwrite a `u32` already written at `offset` (length back-patching).
    pub fn patch_u32(&mut self, offset: usize, value: u32) -> Result<()> {
        let raw = match self.endian {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        };
        let available = self.buf.len();
        let slot = self
            .buf
            .get_mut(offset..offset + 4)
            .ok_or(Error::TruncatedInput {
                offset,
                needed: 4,
                available,
            })?;
        slot.copy_from_slice(&raw);
        Ok(())
    }

    /// Write a fixed-layout `binrw` record.
    pub fn write_struct<T>(&mut self, value: &T) -> Result<()>
    where
        T: for<'b> BinWrite<Args<'b> = ()>,
    {
        let mut cursor = Cursor::new(Vec::new());
        value.write_options(&mut cursor, self.endian, ())?;
        self.buf.extend_from_slice(&cursor.into_inner());
        Ok(())
    }
}
