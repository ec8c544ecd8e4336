//! PVBR: seek index for variable-bitrate MPEG files
//!
//! 400 evenly spaced byte offsets into the audio file. For any other
//! format the index is all zeros and must stay that way.

use serde::{Deserialize, Serialize};

use super::envelope::TagHeader;
use super::tags::{check_header_length, tag_reader};
use crate::cursor::ByteWriter;
use crate::error::{Error, Result};

pub const PVBR_HEADER_LEN: u32 = 16;
pub const VBR_INDEX_ENTRIES: usize = 400;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VbrIndex {
    pub u1: u32,
    pub index: Vec<u32>,
    pub u2: u32,
}

impl Default for VbrIndex {
    fn default() -> Self {
        Self {
            u1: 0,
            index: vec![0; VBR_INDEX_ENTRIES],
            u2: 0,
        }
    }
}

impl VbrIndex {
    pub(crate) fn decode(tag: &[u8], header: &TagHeader) -> Result<Self> {
        check_header_length(header, PVBR_HEADER_LEN)?;
        let expected = (VBR_INDEX_ENTRIES + 1) * 4;
        if header.entries_length() != expected {
            return Err(Error::malformed(
                header.fourcc,
                format!("expected {} bytes of index, found {}", expected, header.entries_length()),
            ));
        }

        let mut r = tag_reader(tag);
        let u1 = r.read_u32()?;
        let index = (0..VBR_INDEX_ENTRIES)
            .map(|_| r.read_u32())
            .collect::<Result<Vec<_>>>()?;
        let u2 = r.read_u32()?;
        Ok(Self { u1, index, u2 })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        if self.index.len() != VBR_INDEX_ENTRIES {
            return Err(Error::malformed(
                "PVBR",
                format!("index must have {} entries, has {}", VBR_INDEX_ENTRIES, self.index.len()),
            ));
        }
        w.write_u32(self.u1);
        for &offset in &self.index {
            w.write_u32(offset);
        }
        w.write_u32(self.u2);
        Ok(())
    }
}
