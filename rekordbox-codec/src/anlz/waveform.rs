//! Waveform tags
//!
//! - PWAV / PWV2: monochrome preview, 400 / 100 one-byte columns
//! - PWV3: monochrome detail, 150 one-byte entries per second
//! - PWV4: color preview, 6 bytes per column
//! - PWV5: color detail, one packed `u16` per entry
//! - PWV6 / PWV7: three-band preview / detail, 3 bytes per entry
//! - PWVC: three `u16` values of unknown meaning
//!
//! Reference: https://djl-analysis.deepsymmetry.org/rekordbox-export-analysis/anlz.html

use serde::{Deserialize, Serialize};

use super::envelope::TagHeader;
use super::tags::{check_entry_bytes, check_header_length, tag_reader};
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{Error, Result};

pub const PWAV_HEADER_LEN: u32 = 20;
pub const PWV3_HEADER_LEN: u32 = 24;
pub const PWV4_HEADER_LEN: u32 = 24;
pub const PWV5_HEADER_LEN: u32 = 24;
pub const PWV6_HEADER_LEN: u32 = 20;
pub const PWV7_HEADER_LEN: u32 = 24;
pub const PWVC_HEADER_LEN: u32 = 14;

pub const PREVIEW_COLUMNS: usize = 400;
pub const TINY_PREVIEW_COLUMNS: usize = 100;

/// Check `len_entry_bytes` and return `len_entries`
fn read_entry_layout(r: &mut ByteReader<'_>, header: &TagHeader, width: u32) -> Result<usize> {
    let len_entry_bytes = r.read_u32()?;
    if len_entry_bytes != width {
        return Err(Error::malformed(
            header.fourcc,
            format!("len_entry_bytes {}, expected {}", len_entry_bytes, width),
        ));
    }
    Ok(r.read_u32()? as usize)
}

/// Monochrome column
///
/// Bits 4-0: height (0-31), bits 7-5: whiteness (0-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WaveformColumn {
    pub height: u8,
    pub whiteness: u8,
}

impl WaveformColumn {
    pub fn to_byte(&self) -> u8 {
        (self.height & 0x1F) | ((self.whiteness & 0x07) << 5)
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            height: byte & 0x1F,
            whiteness: byte >> 5,
        }
    }
}

fn read_columns(r: &mut ByteReader<'_>, count: usize) -> Result<Vec<WaveformColumn>> {
    Ok(r
        .read_bytes(count)?
        .iter()
        .map(|&b| WaveformColumn::from_byte(b))
        .collect())
}

fn write_columns(w: &mut ByteWriter, columns: &[WaveformColumn]) {
    for column in columns {
        w.write_u8(column.to_byte());
    }
}

/// Monochrome preview (PWAV, PWV2)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveformPreview {
    /// Observed as 0x10000
    pub u1: u32,
    pub columns: Vec<WaveformColumn>,
}

impl WaveformPreview {
    pub fn new(columns: Vec<WaveformColumn>) -> Self {
        Self { u1: 0x10000, columns }
    }

    pub fn heights(&self) -> Vec<u8> {
        self.columns.iter().map(|c| c.height).collect()
    }

    pub fn whiteness(&self) -> Vec<u8> {
        self.columns.iter().map(|c| c.whiteness).collect()
    }

    pub(crate) fn decode(tag: &[u8], header: &TagHeader) -> Result<Self> {
        check_header_length(header, PWAV_HEADER_LEN)?;
        let mut r = tag_reader(tag);
        let len_preview = r.read_u32()? as usize;
        let u1 = r.read_u32()?;
        check_entry_bytes(header, len_preview, 1)?;
        let columns = read_columns(&mut r, len_preview)?;
        Ok(Self { u1, columns })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_u32(self.columns.len() as u32);
        w.write_u32(self.u1);
        write_columns(w, &self.columns);
        Ok(())
    }
}

/// Monochrome detail (PWV3), 150 entries per second
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveformDetail {
    /// Observed as 0x00960000
    pub u1: u32,
    pub columns: Vec<WaveformColumn>,
}

impl WaveformDetail {
    pub fn new(columns: Vec<WaveformColumn>) -> Self {
        Self {
            u1: 0x0096_0000,
            columns,
        }
    }

    pub fn heights(&self) -> Vec<u8> {
        self.columns.iter().map(|c| c.height).collect()
    }

    pub fn whiteness(&self) -> Vec<u8> {
        self.columns.iter().map(|c| c.whiteness).collect()
    }

    pub(crate) fn decode(tag: &[u8], header: &TagHeader) -> Result<Self> {
        check_header_length(header, PWV3_HEADER_LEN)?;
        let mut r = tag_reader(tag);
        let len_entries = read_entry_layout(&mut r, header, 1)?;
        let u1 = r.read_u32()?;
        check_entry_bytes(header, len_entries, 1)?;
        let columns = read_columns(&mut r, len_entries)?;
        Ok(Self { u1, columns })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_u32(1);
        w.write_u32(self.columns.len() as u32);
        w.write_u32(self.u1);
        write_columns(w, &self.columns);
        Ok(())
    }
}

/// Color preview column (PWV4)
///
/// The six bytes are kept as stored; the accessors mask off bit 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WaveformColorPreviewColumn {
    pub bytes: [u8; 6],
}

impl WaveformColorPreviewColumn {
    pub fn luminance(&self) -> u8 {
        self.bytes[1] & 0x7F
    }

    /// Inverse intensity of the blue waveform
    pub fn blue_intensity(&self) -> u8 {
        self.bytes[2] & 0x7F
    }

    pub fn red(&self) -> u8 {
        self.bytes[3] & 0x7F
    }

    pub fn green(&self) -> u8 {
        self.bytes[4] & 0x7F
    }

    /// Blue channel, also the height of the front waveform
    pub fn blue(&self) -> u8 {
        self.bytes[5] & 0x7F
    }

    pub fn front_height(&self) -> u8 {
        self.blue()
    }

    pub fn back_height(&self) -> u8 {
        self.blue_intensity().max(self.red()).max(self.green())
    }
}

/// Color preview (PWV4)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveformColorPreview {
    pub u1: u32,
    pub columns: Vec<WaveformColorPreviewColumn>,
}

impl WaveformColorPreview {
    pub fn new(columns: Vec<WaveformColorPreviewColumn>) -> Self {
        Self { u1: 0, columns }
    }

    pub(crate) fn decode(tag: &[u8], header: &TagHeader) -> Result<Self> {
        check_header_length(header, PWV4_HEADER_LEN)?;
        let mut r = tag_reader(tag);
        let len_entries = read_entry_layout(&mut r, header, 6)?;
        let u1 = r.read_u32()?;
        check_entry_bytes(header, len_entries, 6)?;
        let columns = (0..len_entries)
            .map(|_| r.read_array::<6>().map(|bytes| WaveformColorPreviewColumn { bytes }))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { u1, columns })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_u32(6);
        w.write_u32(self.columns.len() as u32);
        w.write_u32(self.u1);
        for column in &self.columns {
            w.write_bytes(&column.bytes);
        }
        Ok(())
    }
}

/// Color detail entry (PWV5)
///
/// Bits 15-13: red, 12-10: green, 9-7: blue, 6-2: height, 1-0: reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WaveformColorEntry {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub height: u8,
    pub reserved: u8,
}

impl WaveformColorEntry {
    pub fn to_raw(&self) -> u16 {
        ((self.red as u16 & 0x07) << 13)
            | ((self.green as u16 & 0x07) << 10)
            | ((self.blue as u16 & 0x07) << 7)
            | ((self.height as u16 & 0x1F) << 2)
            | (self.reserved as u16 & 0x03)
    }

    pub fn from_raw(value: u16) -> Self {
        Self {
            red: ((value >> 13) & 0x07) as u8,
            green: ((value >> 10) & 0x07) as u8,
            blue: ((value >> 7) & 0x07) as u8,
            height: ((value >> 2) & 0x1F) as u8,
            reserved: (value & 0x03) as u8,
        }
    }
}

/// Color detail (PWV5), 150 entries per second
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveformColorDetail {
    pub u1: u32,
    pub entries: Vec<WaveformColorEntry>,
}

impl WaveformColorDetail {
    pub fn new(entries: Vec<WaveformColorEntry>) -> Self {
        Self {
            u1: 0x0096_0305,
            entries,
        }
    }

    pub fn heights(&self) -> Vec<u8> {
        self.entries.iter().map(|e| e.height).collect()
    }

    pub fn colors(&self) -> Vec<[u8; 3]> {
        self.entries.iter().map(|e| [e.red, e.green, e.blue]).collect()
    }

    pub(crate) fn decode(tag: &[u8], header: &TagHeader) -> Result<Self> {
        check_header_length(header, PWV5_HEADER_LEN)?;
        let mut r = tag_reader(tag);
        let len_entries = read_entry_layout(&mut r, header, 2)?;
        let u1 = r.read_u32()?;
        check_entry_bytes(header, len_entries, 2)?;
        let entries = (0..len_entries)
            .map(|_| r.read_u16().map(WaveformColorEntry::from_raw))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { u1, entries })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_u32(2);
        w.write_u32(self.entries.len() as u32);
        w.write_u32(self.u1);
        for entry in &self.entries {
            w.write_u16(entry.to_raw());
        }
        Ok(())
    }
}

fn read_band_entries(r: &mut ByteReader<'_>, count: usize) -> Result<Vec<[u8; 3]>> {
    (0..count).map(|_| r.read_array::<3>()).collect()
}

/// Three-band preview (PWV6). Each entry holds one height per band.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThreeBandPreview {
    pub entries: Vec<[u8; 3]>,
}

impl ThreeBandPreview {
    pub(crate) fn decode(tag: &[u8], header: &TagHeader) -> Result<Self> {
        check_header_length(header, PWV6_HEADER_LEN)?;
        let mut r = tag_reader(tag);
        let len_entries = read_entry_layout(&mut r, header, 3)?;
        check_entry_bytes(header, len_entries, 3)?;
        Ok(Self {
            entries: read_band_entries(&mut r, len_entries)?,
        })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_u32(3);
        w.write_u32(self.entries.len() as u32);
        for entry in &self.entries {
            w.write_bytes(entry);
        }
        Ok(())
    }
}

/// Three-band detail (PWV7)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreeBandDetail {
    /// Observed as 0x00960000
    pub u1: u32,
    pub entries: Vec<[u8; 3]>,
}

impl Default for ThreeBandDetail {
    fn default() -> Self {
        Self {
            u1: 0x0096_0000,
            entries: Vec::new(),
        }
    }
}

impl ThreeBandDetail {
    pub(crate) fn decode(tag: &[u8], header: &TagHeader) -> Result<Self> {
        check_header_length(header, PWV7_HEADER_LEN)?;
        let mut r = tag_reader(tag);
        let len_entries = read_entry_layout(&mut r, header, 3)?;
        let u1 = r.read_u32()?;
        check_entry_bytes(header, len_entries, 3)?;
        Ok(Self {
            u1,
            entries: read_band_entries(&mut r, len_entries)?,
        })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_u32(3);
        w.write_u32(self.entries.len() as u32);
        w.write_u32(self.u1);
        for entry in &self.entries {
            w.write_bytes(entry);
        }
        Ok(())
    }
}

/// PWVC, meaning unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WaveformPwvc {
    pub u1: u16,
    pub data: [u16; 3],
}

impl WaveformPwvc {
    pub(crate) fn decode(tag: &[u8], header: &TagHeader) -> Result<Self> {
        check_header_length(header, PWVC_HEADER_LEN)?;
        check_entry_bytes(header, 3, 2)?;
        let mut r = tag_reader(tag);
        let u1 = r.read_u16()?;
        let data = [r.read_u16()?, r.read_u16()?, r.read_u16()?];
        Ok(Self { u1, data })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_u16(self.u1);
        for value in self.data {
            w.write_u16(value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anlz::envelope::{decode_header, encode_tag, FourCC};

    fn tag_bytes<F>(code: &[u8; 4], header_len: u32, body: F) -> Vec<u8>
    where
        F: FnOnce(&mut ByteWriter) -> Result<()>,
    {
        encode_tag(FourCC::new(code), header_len, body).unwrap()
    }

    #[test]
    fn test_column_bit_layout() {
        let column = WaveformColumn::from_byte(0b101_10011);
        assert_eq!(column.height, 0b10011);
        assert_eq!(column.whiteness, 0b101);
        assert_eq!(column.to_byte(), 0b101_10011);

        for byte in 0..=255u8 {
            assert_eq!(WaveformColumn::from_byte(byte).to_byte(), byte);
        }
    }

    #[test]
    fn test_pwav_roundtrip() {
        let columns = (0..PREVIEW_COLUMNS)
            .map(|i| WaveformColumn {
                height: (i % 32) as u8,
                whiteness: (i % 8) as u8,
            })
            .collect();
        let preview = WaveformPreview::new(columns);
        let bytes = tag_bytes(b"PWAV", PWAV_HEADER_LEN, |w| preview.encode(w));
        assert_eq!(bytes.len(), 20 + 400);
        assert_eq!(&bytes[12..16], &400u32.to_be_bytes());
        assert_eq!(&bytes[16..20], &0x10000u32.to_be_bytes());

        let header = decode_header(&bytes, 0).unwrap();
        let decoded = WaveformPreview::decode(&bytes, &header).unwrap();
        assert_eq!(decoded, preview);
        assert_eq!(decoded.heights()[33], 1);
        assert_eq!(decoded.whiteness()[7], 7);
    }

    #[test]
    fn test_pwav_length_mismatch() {
        let preview = WaveformPreview::new(vec![WaveformColumn::default(); TINY_PREVIEW_COLUMNS]);
        let mut bytes = tag_bytes(b"PWV2", PWAV_HEADER_LEN, |w| preview.encode(w));
        bytes[12..16].copy_from_slice(&101u32.to_be_bytes());
        let header = decode_header(&bytes, 0).unwrap();
        assert!(matches!(
            WaveformPreview::decode(&bytes, &header),
            Err(Error::MalformedTag { .. })
        ));
    }

    #[test]
    fn test_pwv3_roundtrip() {
        let detail = WaveformDetail::new(vec![WaveformColumn::from_byte(0xE5); 300]);
        let bytes = tag_bytes(b"PWV3", PWV3_HEADER_LEN, |w| detail.encode(w));
        assert_eq!(&bytes[20..24], &0x0096_0000u32.to_be_bytes());
        let header = decode_header(&bytes, 0).unwrap();
        let decoded = WaveformDetail::decode(&bytes, &header).unwrap();
        assert_eq!(decoded, detail);
        assert_eq!(decoded.heights()[0], 5);
        assert_eq!(decoded.whiteness()[0], 7);
    }

    #[test]
    fn test_pwv3_wrong_entry_width() {
        let detail = WaveformDetail::new(vec![WaveformColumn::default(); 4]);
        let mut bytes = tag_bytes(b"PWV3", PWV3_HEADER_LEN, |w| detail.encode(w));
        bytes[12..16].copy_from_slice(&2u32.to_be_bytes());
        let header = decode_header(&bytes, 0).unwrap();
        assert!(WaveformDetail::decode(&bytes, &header).is_err());
    }

    #[test]
    fn test_pwv4_keeps_high_bits() {
        let column = WaveformColorPreviewColumn {
            bytes: [0x80, 0xFF, 0x10, 0x20, 0x30, 0xC0],
        };
        assert_eq!(column.luminance(), 0x7F);
        assert_eq!(column.red(), 0x20);
        assert_eq!(column.green(), 0x30);
        assert_eq!(column.blue(), 0x40);
        assert_eq!(column.back_height(), 0x30);

        let preview = WaveformColorPreview::new(vec![column; 1200]);
        let bytes = tag_bytes(b"PWV4", PWV4_HEADER_LEN, |w| preview.encode(w));
        assert_eq!(bytes.len(), 24 + 7200);
        let header = decode_header(&bytes, 0).unwrap();
        assert_eq!(WaveformColorPreview::decode(&bytes, &header).unwrap(), preview);
    }

    #[test]
    fn test_pwv5_bit_layout() {
        let entry = WaveformColorEntry {
            red: 5,
            green: 3,
            blue: 7,
            height: 20,
            reserved: 0,
        };
        // 101 011 111 10100 00
        assert_eq!(entry.to_raw(), 0b1010_1111_1101_0000);
        assert_eq!(WaveformColorEntry::from_raw(entry.to_raw()), entry);

        // Reserved bits survive
        let raw = 0b1010_1111_1101_0011;
        assert_eq!(WaveformColorEntry::from_raw(raw).to_raw(), raw);
    }

    #[test]
    fn test_pwv5_roundtrip() {
        let entries = (0..=u16::MAX)
            .step_by(97)
            .map(WaveformColorEntry::from_raw)
            .collect();
        let detail = WaveformColorDetail::new(entries);
        let bytes = tag_bytes(b"PWV5", PWV5_HEADER_LEN, |w| detail.encode(w));
        let header = decode_header(&bytes, 0).unwrap();
        let decoded = WaveformColorDetail::decode(&bytes, &header).unwrap();
        assert_eq!(decoded, detail);
        assert_eq!(decoded.colors().len(), decoded.heights().len());
    }

    #[test]
    fn test_three_band_layouts() {
        let preview = ThreeBandPreview {
            entries: vec![[1, 2, 3], [4, 5, 6]],
        };
        let bytes = tag_bytes(b"PWV6", PWV6_HEADER_LEN, |w| preview.encode(w));
        assert_eq!(bytes.len(), 20 + 6);
        let header = decode_header(&bytes, 0).unwrap();
        assert_eq!(ThreeBandPreview::decode(&bytes, &header).unwrap(), preview);

        let detail = ThreeBandDetail {
            entries: vec![[9, 8, 7]; 5],
            ..ThreeBandDetail::default()
        };
        let bytes = tag_bytes(b"PWV7", PWV7_HEADER_LEN, |w| detail.encode(w));
        assert_eq!(bytes.len(), 24 + 15);
        let header = decode_header(&bytes, 0).unwrap();
        assert_eq!(ThreeBandDetail::decode(&bytes, &header).unwrap(), detail);
    }

    #[test]
    fn test_pwvc() {
        let pwvc = WaveformPwvc {
            u1: 0,
            data: [0x0064, 0x0190, 0x0258],
        };
        let bytes = tag_bytes(b"PWVC", PWVC_HEADER_LEN, |w| pwvc.encode(w));
        assert_eq!(bytes.len(), 20);
        let header = decode_header(&bytes, 0).unwrap();
        assert_eq!(WaveformPwvc::decode(&bytes, &header).unwrap(), pwvc);
    }
}
