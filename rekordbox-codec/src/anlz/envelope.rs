//! Generic tag envelope shared by the PMAI file header and every tag
//!
//! ```text
//! 0..4   fourcc
//! 4..8   len_header   (bytes from tag start to first entry)
//! 8..12  len_tag      (bytes owned by the tag, header included)
//! 12..   kind-specific header fields, then entries
//! ```
//!
//! `len_tag` alone is enough to step over a tag, so unknown kinds never
//! stop navigation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{Error, Result};

/// Length of the fixed `fourcc, len_header, len_tag` prefix
pub const PREFIX_LEN: usize = 12;

/// Four-character tag code
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub const fn new(code: &[u8; 4]) -> Self {
        Self(*code)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC({})", self)
    }
}

impl From<&[u8; 4]> for FourCC {
    fn from(code: &[u8; 4]) -> Self {
        Self(*code)
    }
}

/// Decoded envelope prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagHeader {
    pub fourcc: FourCC,
    pub header_length: u32,
    pub tag_length: u32,
}

impl TagHeader {
    /// Bytes between the end of the header and the end of the tag
    pub fn entries_length(&self) -> usize {
        (self.tag_length - self.header_length) as usize
    }
}

/// Read the envelope prefix at `offset`.
///
/// Fails with `TruncatedInput` if fewer than [`PREFIX_LEN`] bytes remain and
/// with `MalformedTag` if the declared lengths cannot describe a tag
/// (`len_tag < len_header` or `len_header < 12`), since such a tag cannot
/// be skipped safely.
pub fn decode_header(buf: &[u8], offset: usize) -> Result<TagHeader> {
    let mut reader = ByteReader::big_endian(buf);
    reader.seek(offset)?;
    let fourcc = FourCC(reader.read_array::<4>()?);
    let header_length = reader.read_u32()?;
    let tag_length = reader.read_u32()?;

    if (header_length as usize) < PREFIX_LEN {
        return Err(Error::malformed(
            fourcc,
            format!("len_header {} shorter than the {} byte prefix", header_length, PREFIX_LEN),
        ));
    }
    if tag_length < header_length {
        return Err(Error::malformed(
            fourcc,
            format!("len_tag {} shorter than len_header {}", tag_length, header_length),
        ));
    }

    Ok(TagHeader {
        fourcc,
        header_length,
        tag_length,
    })
}

/// Offset of the tag following one that starts at `offset`
pub fn next_tag_offset(offset: usize, tag_length: u32) -> usize {
    offset + tag_length as usize
}

/// Serialize a tag: the envelope prefix followed by whatever `body` writes.
///
/// `body` writes the kind-specific header fields and the entries; `len_tag`
/// is taken from what it actually produced.
pub fn encode_tag<F>(fourcc: FourCC, header_length: u32, body: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut ByteWriter) -> Result<()>,
{
    let mut writer = ByteWriter::big_endian();
    writer.write_bytes(fourcc.as_bytes());
    writer.write_u32(header_length);
    writer.write_u32(0); // len_tag, patched below
    body(&mut writer)?;

    let tag_length = writer.position();
    if tag_length < header_length as usize {
        return Err(Error::malformed(
            fourcc,
            format!("encoded {} bytes, less than len_header {}", tag_length, header_length),
        ));
    }
    let tag_length = u32::try_from(tag_length)
        .map_err(|_| Error::malformed(fourcc, "tag exceeds 4 GiB"))?;
    writer.patch_u32(8, tag_length)?;
    Ok(writer.into_inner())
}
