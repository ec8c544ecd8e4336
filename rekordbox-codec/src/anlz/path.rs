//! PPTH: path of the audio file the analysis belongs to
//!
//! Stored as UTF-16BE with a trailing NUL code unit; `len_path` counts
//! bytes including the terminator. A `len_path` of 0 means no path at all
//! and is kept distinct from an empty string.

use serde::{Deserialize, Serialize};

use super::envelope::TagHeader;
use super::tags::{check_header_length, tag_reader};
use crate::cursor::ByteWriter;
use crate::error::{Error, Result};

pub const PPTH_HEADER_LEN: u32 = 16;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PathTag {
    pub path: Option<String>,
}

impl PathTag {
    /// Build a path tag, normalising Windows separators to `/`
    pub fn new(path: &str) -> Self {
        Self {
            path: Some(path.replace('\\', "/")),
        }
    }

    pub(crate) fn decode(tag: &[u8], header: &TagHeader) -> Result<Self> {
        check_header_length(header, PPTH_HEADER_LEN)?;
        let mut r = tag_reader(tag);
        let len_path = r.read_u32()? as usize;
        if len_path != header.entries_length() {
            return Err(Error::malformed(
                header.fourcc,
                format!("len_path {} but {} bytes follow the header", len_path, header.entries_length()),
            ));
        }
        if len_path == 0 {
            return Ok(Self::default());
        }
        if len_path % 2 != 0 || len_path < 2 {
            return Err(Error::malformed(
                header.fourcc,
                format!("len_path {} is not a NUL-terminated UTF-16 string", len_path),
            ));
        }

        let raw = r.read_bytes(len_path - 2)?;
        if r.read_u16()? != 0 {
            return Err(Error::malformed(header.fourcc, "path is not NUL-terminated"));
        }
        let units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        let path = String::from_utf16(&units)
            .map_err(|e| Error::malformed(header.fourcc, format!("invalid UTF-16 path: {}", e)))?;
        Ok(Self { path: Some(path) })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        let Some(path) = &self.path else {
            w.write_u32(0);
            return Ok(());
        };
        let units: Vec<u16> = path.encode_utf16().collect();
        let len_path = (units.len() + 1) * 2;
        w.write_u32(len_path as u32);
        for unit in units {
            w.write_u16(unit);
        }
        w.write_u16(0);
        Ok(())
    }
}
