//! Cue list tags
//!
//! PCOB holds fixed 56-byte PCPT entries, PCO2 (nxs2) holds variable-length
//! PCP2 entries with color and comment. A track usually carries two lists
//! of each kind, one for memory cues and one for hot cues, told apart by
//! `list_type`.

use binrw::binrw;
use serde::{Deserialize, Serialize};

use super::envelope::{FourCC, TagHeader, PREFIX_LEN};
use super::tags::{check_entry_bytes, check_header_length, tag_reader};
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{Error, Result};

pub const PCOB_HEADER_LEN: u32 = 24;
pub const PCO2_HEADER_LEN: u32 = 20;

const PCPT: FourCC = FourCC::new(b"PCPT");
const PCP2: FourCC = FourCC::new(b"PCP2");
const PCPT_HEADER_LEN: u32 = 28;
const PCPT_ENTRY_LEN: usize = 56;
const PCP2_HEADER_LEN: u32 = 16;
/// PCP2 bytes up to and including `len_comment`
const PCP2_FIXED_LEN: usize = 44;

pub const MEMORY_CUES: u32 = 0;
pub const HOT_CUES: u32 = 1;

/// `loop_time` of a cue that is not a loop
pub const NO_LOOP: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CueKind {
    Position,
    Loop,
}

fn cue_kind(cue_type: u8, loop_time_ms: i32) -> CueKind {
    if cue_type == 2 && loop_time_ms != NO_LOOP {
        CueKind::Loop
    } else {
        CueKind::Position
    }
}

/// `cue_type` and `loop_time` of a loop ending at `out_time_ms`
fn loop_fields(out_time_ms: u32) -> (u8, i32) {
    (2, out_time_ms as i32)
}

/// PCPT entry, without its 12-byte `fourcc, len_header, len_entry` prefix
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuePoint {
    /// 0 for a memory cue, otherwise 1-based hot cue slot
    pub hot_cue: u32,
    /// 0 disabled, 4 enabled
    pub status: u32,
    pub u1: u32,
    /// 0xFFFF for the first cue
    pub order_first: u16,
    /// 0xFFFF for the last cue
    pub order_last: u16,
    /// 1 single, 2 loop
    pub cue_type: u8,
    pub u2: u8,
    pub u3: u16,
    pub time_ms: u32,
    /// -1 when not a loop
    pub loop_time_ms: i32,
    pub reserved: [u8; 16],
}

impl CuePoint {
    pub fn position(hot_cue: u32, time_ms: u32) -> Self {
        Self {
            hot_cue,
            status: 4,
            u1: 0x10000,
            order_first: 0xFFFF,
            order_last: 0xFFFF,
            cue_type: 1,
            u2: 0,
            u3: 1000,
            time_ms,
            loop_time_ms: NO_LOOP,
            reserved: [0; 16],
        }
    }

    pub fn looped(hot_cue: u32, time_ms: u32, out_time_ms: u32) -> Self {
        let (cue_type, loop_time_ms) = loop_fields(out_time_ms);
        Self {
            cue_type,
            loop_time_ms,
            ..Self::position(hot_cue, time_ms)
        }
    }

    pub fn is_memory(&self) -> bool {
        self.hot_cue == 0
    }

    pub fn kind(&self) -> CueKind {
        cue_kind(self.cue_type, self.loop_time_ms)
    }

    /// Loop end, only for loops
    pub fn out_time_ms(&self) -> Option<u32> {
        match self.kind() {
            CueKind::Loop => Some(self.loop_time_ms as u32),
            CueKind::Position => None,
        }
    }
}

/// Cue list (PCOB)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueList {
    /// [`MEMORY_CUES`] or [`HOT_CUES`]
    pub list_type: u32,
    pub u1: u16,
    pub memory_count: i32,
    pub entries: Vec<CuePoint>,
}

impl CueList {
    pub fn new(list_type: u32, entries: Vec<CuePoint>) -> Self {
        Self {
            list_type,
            u1: 0,
            memory_count: -1,
            entries,
        }
    }

    pub fn is_hot_cues(&self) -> bool {
        self.list_type == HOT_CUES
    }

    pub(crate) fn decode(tag: &[u8], header: &TagHeader) -> Result<Self> {
        check_header_length(header, PCOB_HEADER_LEN)?;
        let mut r = tag_reader(tag);
        let list_type = r.read_u32()?;
        let u1 = r.read_u16()?;
        let len_cues = r.read_u16()? as usize;
        let memory_count = r.read_i32()?;
        check_entry_bytes(header, len_cues, PCPT_ENTRY_LEN)?;

        let mut entries = Vec::with_capacity(len_cues);
        for _ in 0..len_cues {
            let fourcc = FourCC(r.read_array::<4>()?);
            let len_header = r.read_u32()?;
            let len_entry = r.read_u32()?;
            if fourcc != PCPT
                || len_header != PCPT_HEADER_LEN
                || len_entry as usize != PCPT_ENTRY_LEN
            {
                return Err(Error::malformed(
                    header.fourcc,
                    format!(
                        "unexpected cue entry {} (len_header {}, len_entry {})",
                        fourcc, len_header, len_entry
                    ),
                ));
            }
            entries.push(r.read_struct::<CuePoint>()?);
        }

        Ok(Self {
            list_type,
            u1,
            memory_count,
            entries,
        })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        let len_cues = u16::try_from(self.entries.len())
            .map_err(|_| Error::malformed("PCOB", "more than 65535 cues"))?;
        w.write_u32(self.list_type);
        w.write_u16(self.u1);
        w.write_u16(len_cues);
        w.write_i32(self.memory_count);
        for cue in &self.entries {
            w.write_bytes(PCPT.as_bytes());
            w.write_u32(PCPT_HEADER_LEN);
            w.write_u32(PCPT_ENTRY_LEN as u32);
            w.write_struct(cue)?;
        }
        Ok(())
    }
}

/// Color block that follows the comment of a PCP2 entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CueColor {
    pub code: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

/// PCP2 entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedCuePoint {
    pub header_length: u32,
    pub hot_cue: u32,
    pub cue_type: u8,
    pub u1: [u8; 3],
    pub time_ms: u32,
    pub loop_time_ms: i32,
    pub color_id: u8,
    pub u2: [u8; 7],
    pub loop_numerator: u16,
    pub loop_denominator: u16,
    /// `None` when `len_comment` is 0; `Some("")` is a lone NUL
    pub comment: Option<String>,
    /// Whether the stored comment ends with a NUL code unit
    pub comment_nul: bool,
    pub color: Option<CueColor>,
    /// Bytes after the color block up to `len_entry`, or after the
    /// comment when there is no room for a color block
    pub trailing: Vec<u8>,
}

impl ExtendedCuePoint {
    pub fn position(hot_cue: u32, time_ms: u32) -> Self {
        Self {
            header_length: PCP2_HEADER_LEN,
            hot_cue,
            cue_type: 1,
            u1: [0, 0x03, 0xE8],
            time_ms,
            loop_time_ms: NO_LOOP,
            color_id: 0,
            u2: [0; 7],
            loop_numerator: 0,
            loop_denominator: 0,
            comment: None,
            comment_nul: true,
            color: Some(CueColor::default()),
            trailing: Vec::new(),
        }
    }

    pub fn looped(hot_cue: u32, time_ms: u32, out_time_ms: u32) -> Self {
        let (cue_type, loop_time_ms) = loop_fields(out_time_ms);
        Self {
            cue_type,
            loop_time_ms,
            ..Self::position(hot_cue, time_ms)
        }
    }

    pub fn is_memory(&self) -> bool {
        self.hot_cue == 0
    }

    pub fn kind(&self) -> CueKind {
        cue_kind(self.cue_type, self.loop_time_ms)
    }

    pub fn out_time_ms(&self) -> Option<u32> {
        match self.kind() {
            CueKind::Loop => Some(self.loop_time_ms as u32),
            CueKind::Position => None,
        }
    }

    pub fn comment(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }

    fn decode(fourcc: FourCC, entry: &[u8]) -> Result<Self> {
        let mut r = ByteReader::big_endian(entry);
        r.skip(4)?;
        let header_length = r.read_u32()?;
        r.seek(PREFIX_LEN)?;
        let hot_cue = r.read_u32()?;
        let cue_type = r.read_u8()?;
        let u1 = r.read_array::<3>()?;
        let time_ms = r.read_u32()?;
        let loop_time_ms = r.read_i32()?;
        let color_id = r.read_u8()?;
        let u2 = r.read_array::<7>()?;
        let loop_numerator = r.read_u16()?;
        let loop_denominator = r.read_u16()?;
        let len_comment = r.read_u32()? as usize;

        if len_comment > r.remaining() || len_comment % 2 != 0 {
            return Err(Error::malformed(
                fourcc,
                format!("len_comment {} does not fit a {} byte entry", len_comment, entry.len()),
            ));
        }
        let (comment, comment_nul) = match len_comment {
            0 => (None, true),
            n => {
                let (text, nul) = decode_utf16_nul(fourcc, r.read_bytes(n)?)?;
                (Some(text), nul)
            }
        };
        let color = if r.remaining() >= 4 {
            Some(CueColor {
                code: r.read_u8()?,
                red: r.read_u8()?,
                green: r.read_u8()?,
                blue: r.read_u8()?,
            })
        } else {
            None
        };
        let trailing = r.read_rest().to_vec();

        Ok(Self {
            header_length,
            hot_cue,
            cue_type,
            u1,
            time_ms,
            loop_time_ms,
            color_id,
            u2,
            loop_numerator,
            loop_denominator,
            comment,
            comment_nul,
            color,
            trailing,
        })
    }

    fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        let mut e = ByteWriter::big_endian();
        e.write_bytes(PCP2.as_bytes());
        e.write_u32(self.header_length);
        e.write_u32(0); // len_entry, patched below
        e.write_u32(self.hot_cue);
        e.write_u8(self.cue_type);
        e.write_bytes(&self.u1);
        e.write_u32(self.time_ms);
        e.write_i32(self.loop_time_ms);
        e.write_u8(self.color_id);
        e.write_bytes(&self.u2);
        e.write_u16(self.loop_numerator);
        e.write_u16(self.loop_denominator);
        match &self.comment {
            None => e.write_u32(0),
            Some(text) => {
                let mut units: Vec<u16> = text.encode_utf16().collect();
                if self.comment_nul {
                    units.push(0);
                }
                e.write_u32((units.len() * 2) as u32);
                for unit in units {
                    e.write_u16(unit);
                }
            }
        }
        if let Some(color) = self.color {
            e.write_bytes(&[color.code, color.red, color.green, color.blue]);
        }
        e.write_bytes(&self.trailing);

        let len_entry = e.position() as u32;
        e.patch_u32(8, len_entry)?;
        w.write_bytes(e.as_slice());
        Ok(())
    }
}

/// Decode a UTF-16BE comment, reporting whether it carried a terminator
fn decode_utf16_nul(fourcc: FourCC, raw: &[u8]) -> Result<(String, bool)> {
    let mut units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    let nul = units.last() == Some(&0);
    if nul {
        units.pop();
    }
    let text = String::from_utf16(&units)
        .map_err(|e| Error::malformed(fourcc, format!("invalid UTF-16 comment: {}", e)))?;
    Ok((text, nul))
}

/// Extended cue list (PCO2)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedCueList {
    pub list_type: u32,
    pub u1: u16,
    pub entries: Vec<ExtendedCuePoint>,
}

impl ExtendedCueList {
    pub fn new(list_type: u32, entries: Vec<ExtendedCuePoint>) -> Self {
        Self {
            list_type,
            u1: 0,
            entries,
        }
    }

    pub fn is_hot_cues(&self) -> bool {
        self.list_type == HOT_CUES
    }

    pub(crate) fn decode(tag: &[u8], header: &TagHeader) -> Result<Self> {
        check_header_length(header, PCO2_HEADER_LEN)?;
        let mut r = tag_reader(tag);
        let list_type = r.read_u32()?;
        let len_cues = r.read_u16()? as usize;
        let u1 = r.read_u16()?;

        let mut entries = Vec::with_capacity(len_cues);
        for i in 0..len_cues {
            let start = r.position();
            let fourcc = FourCC(r.read_array::<4>()?);
            let _len_header = r.read_u32()?;
            let len_entry = r.read_u32()? as usize;
            if fourcc != PCP2 || len_entry < PCP2_FIXED_LEN || len_entry > tag.len() - start {
                return Err(Error::malformed(
                    header.fourcc,
                    format!("cue entry {} is {} with len_entry {}", i, fourcc, len_entry),
                ));
            }
            r.seek(start)?;
            let entry = r.read_bytes(len_entry)?;
            entries.push(ExtendedCuePoint::decode(fourcc, entry)?);
        }

        if r.remaining() != 0 {
            return Err(Error::malformed(
                header.fourcc,
                format!("{} bytes after {} cue entries", r.remaining(), len_cues),
            ));
        }

        Ok(Self {
            list_type,
            u1,
            entries,
        })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        let len_cues = u16::try_from(self.entries.len())
            .map_err(|_| Error::malformed("PCO2", "more than 65535 cues"))?;
        w.write_u32(self.list_type);
        w.write_u16(len_cues);
        w.write_u16(self.u1);
        for cue in &self.entries {
            cue.encode(w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anlz::envelope::{decode_header, encode_tag};

    fn pcob(list: &CueList) -> Vec<u8> {
        encode_tag(FourCC::new(b"PCOB"), PCOB_HEADER_LEN, |w| list.encode(w)).unwrap()
    }

    fn pco2(list: &ExtendedCueList) -> Vec<u8> {
        encode_tag(FourCC::new(b"PCO2"), PCO2_HEADER_LEN, |w| list.encode(w)).unwrap()
    }

    #[test]
    fn test_pcob_roundtrip() {
        let list = CueList::new(
            HOT_CUES,
            vec![CuePoint::position(1, 1500), CuePoint::looped(2, 3000, 4000)],
        );
        let bytes = pcob(&list);
        assert_eq!(bytes.len(), 24 + 2 * 56);
        assert_eq!(&bytes[24..28], b"PCPT");

        let header = decode_header(&bytes, 0).unwrap();
        let decoded = CueList::decode(&bytes, &header).unwrap();
        assert_eq!(decoded, list);
        assert!(decoded.is_hot_cues());
        assert_eq!(decoded.entries[0].kind(), CueKind::Position);
        assert_eq!(decoded.entries[1].kind(), CueKind::Loop);
        assert_eq!(decoded.entries[1].out_time_ms(), Some(4000));
    }

    #[test]
    fn test_no_loop_sentinel_is_position() {
        // Loop type with the -1 sentinel is still a position cue
        let mut cue = CuePoint::position(0, 100);
        cue.cue_type = 2;
        let bytes = pcob(&CueList::new(MEMORY_CUES, vec![cue]));
        // loop_time at entry offset 36
        assert_eq!(&bytes[24 + 36..24 + 40], &[0xFF; 4]);

        let header = decode_header(&bytes, 0).unwrap();
        let decoded = CueList::decode(&bytes, &header).unwrap();
        assert_eq!(decoded.entries[0].loop_time_ms, -1);
        assert_eq!(decoded.entries[0].kind(), CueKind::Position);
        assert_eq!(decoded.entries[0].out_time_ms(), None);
        assert!(decoded.entries[0].is_memory());
    }

    #[test]
    fn test_pcob_bad_entry_magic() {
        let mut bytes = pcob(&CueList::new(MEMORY_CUES, vec![CuePoint::position(0, 1)]));
        bytes[24..28].copy_from_slice(b"PCP2");
        let header = decode_header(&bytes, 0).unwrap();
        assert!(matches!(
            CueList::decode(&bytes, &header),
            Err(Error::MalformedTag { .. })
        ));
    }

    #[test]
    fn test_pco2_roundtrip_with_comment_and_color() {
        let mut cue = ExtendedCuePoint::looped(3, 12_000, 14_000);
        cue.color_id = 5;
        cue.comment = Some("Drop".to_string());
        cue.color = Some(CueColor {
            code: 0x2A,
            red: 0xFF,
            green: 0x80,
            blue: 0x00,
        });
        cue.trailing = vec![0; 8];
        let list = ExtendedCueList::new(HOT_CUES, vec![cue, ExtendedCuePoint::position(1, 0)]);

        let bytes = pco2(&list);
        // First entry: 44 fixed + 10 comment + 4 color + 8 trailing
        let len_entry = u32::from_be_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]);
        assert_eq!(len_entry, 66);

        let header = decode_header(&bytes, 0).unwrap();
        let decoded = ExtendedCueList::decode(&bytes, &header).unwrap();
        assert_eq!(decoded, list);
        assert_eq!(decoded.entries[0].comment(), "Drop");
        assert_eq!(decoded.entries[0].out_time_ms(), Some(14_000));
        assert_eq!(decoded.entries[1].comment(), "");
        assert_eq!(decoded.entries[1].kind(), CueKind::Position);
    }

    #[test]
    fn test_pco2_entry_without_color_block() {
        let mut cue = ExtendedCuePoint::position(0, 500);
        cue.color = None;
        let bytes = pco2(&ExtendedCueList::new(MEMORY_CUES, vec![cue.clone()]));
        assert_eq!(bytes.len(), 20 + 44);
        let header = decode_header(&bytes, 0).unwrap();
        let decoded = ExtendedCueList::decode(&bytes, &header).unwrap();
        assert_eq!(decoded.entries, vec![cue]);
    }

    #[test]
    fn test_pco2_comment_without_terminator() {
        let mut cue = ExtendedCuePoint::position(2, 800);
        cue.comment = Some("AB".to_string());
        cue.comment_nul = false;
        let bytes = pco2(&ExtendedCueList::new(HOT_CUES, vec![cue.clone()]));

        // len_comment sits just before the comment at entry offset 40
        let len_comment = u32::from_be_bytes([bytes[60], bytes[61], bytes[62], bytes[63]]);
        assert_eq!(len_comment, 4);
        assert_eq!(&bytes[64..68], &[0, b'A', 0, b'B']);
        assert_eq!(bytes.len(), 20 + 44 + 4 + 4);

        let header = decode_header(&bytes, 0).unwrap();
        let decoded = ExtendedCueList::decode(&bytes, &header).unwrap();
        assert_eq!(decoded.entries, vec![cue]);
        assert!(!decoded.entries[0].comment_nul);
        assert_eq!(decoded.entries[0].comment(), "AB");
        assert_eq!(pco2(&decoded), bytes);
    }

    #[test]
    fn test_pco2_entry_overruns_tag() {
        let mut bytes = pco2(&ExtendedCueList::new(
            MEMORY_CUES,
            vec![ExtendedCuePoint::position(0, 500)],
        ));
        bytes[28..32].copy_from_slice(&200u32.to_be_bytes());
        let header = decode_header(&bytes, 0).unwrap();
        assert!(matches!(
            ExtendedCueList::decode(&bytes, &header),
            Err(Error::MalformedTag { .. })
        ));
    }
}
