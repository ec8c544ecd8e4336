//! Device settings files (`MYSETTING.DAT`, `MYSETTING2.DAT`,
//! `DJMMYSETTING.DAT`, `DEVSETTING.DAT`)
//!
//! All four share one little-endian layout:
//!
//! ```text
//! len_strings u32 (0x60)
//! brand       [u8; 32]  ASCII, NUL padded
//! software    [u8; 32]
//! version     [u8; 32]
//! len_data    u32
//! payload     [u8; len_data]
//! checksum    u16       CRC16/XMODEM
//! unknown     u16       (0)
//! ```
//!
//! The checksum covers the payload, except in `DJMMYSETTING.DAT` where it
//! covers every byte before the footer.

pub mod payload;
pub mod values;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::checksum::crc16_xmodem_range;
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{Error, Result};
use payload::{DevSetting, DjmMySetting, MySetting, MySetting2};

const LEN_STRINGS: u32 = 0x60;
const STRING_LEN: usize = 32;
/// Offset of the payload: `len_strings`, three strings, `len_data`
const PAYLOAD_OFFSET: usize = 4 + 3 * STRING_LEN + 4;
const FOOTER_LEN: usize = 4;

/// Which of the four settings files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingsKind {
    MySetting,
    MySetting2,
    DjmMySetting,
    DevSetting,
}

impl SettingsKind {
    pub fn all() -> [SettingsKind; 4] {
        [
            SettingsKind::MySetting,
            SettingsKind::MySetting2,
            SettingsKind::DjmMySetting,
            SettingsKind::DevSetting,
        ]
    }

    pub fn file_name(self) -> &'static str {
        match self {
            SettingsKind::MySetting => "MYSETTING.DAT",
            SettingsKind::MySetting2 => "MYSETTING2.DAT",
            SettingsKind::DjmMySetting => "DJMMYSETTING.DAT",
            SettingsKind::DevSetting => "DEVSETTING.DAT",
        }
    }

    /// Case-insensitive match on the bare file name
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|kind| kind.file_name().eq_ignore_ascii_case(name))
    }

    pub fn payload_len(self) -> usize {
        match self {
            SettingsKind::MySetting | SettingsKind::MySetting2 => 40,
            SettingsKind::DjmMySetting => 52,
            SettingsKind::DevSetting => 32,
        }
    }

    pub fn file_len(self) -> usize {
        PAYLOAD_OFFSET + self.payload_len() + FOOTER_LEN
    }

    fn default_strings(self) -> (&'static str, &'static str, &'static str) {
        match self {
            SettingsKind::MySetting | SettingsKind::MySetting2 => ("PIONEER", "rekordbox", "0.001"),
            SettingsKind::DjmMySetting => ("PioneerDJ", "rekordbox", "1.000"),
            SettingsKind::DevSetting => ("PIONEER DJ", "rekordbox", "6.8.4"),
        }
    }

    fn checksum_start(self) -> usize {
        match self {
            SettingsKind::DjmMySetting => 0,
            _ => PAYLOAD_OFFSET,
        }
    }
}

impl fmt::Display for SettingsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Stored checksum that does not match the file contents
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error("Checksum mismatch: stored {stored:#06x}, computed {computed:#06x}")]
pub struct ChecksumMismatch {
    pub stored: u16,
    pub computed: u16,
}

/// Decoded payload of one of the four files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    MySetting(MySetting),
    MySetting2(MySetting2),
    DjmMySetting(DjmMySetting),
    DevSetting(DevSetting),
}

impl Payload {
    pub fn default_for(kind: SettingsKind) -> Self {
        match kind {
            SettingsKind::MySetting => Payload::MySetting(MySetting::default()),
            SettingsKind::MySetting2 => Payload::MySetting2(MySetting2::default()),
            SettingsKind::DjmMySetting => Payload::DjmMySetting(DjmMySetting::default()),
            SettingsKind::DevSetting => Payload::DevSetting(DevSetting::default()),
        }
    }

    pub fn kind(&self) -> SettingsKind {
        match self {
            Payload::MySetting(_) => SettingsKind::MySetting,
            Payload::MySetting2(_) => SettingsKind::MySetting2,
            Payload::DjmMySetting(_) => SettingsKind::DjmMySetting,
            Payload::DevSetting(_) => SettingsKind::DevSetting,
        }
    }

    /// Names accepted by [`Payload::get`] and [`Payload::set`]
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Payload::MySetting(_) => MySetting::KEYS,
            Payload::MySetting2(_) => MySetting2::KEYS,
            Payload::DjmMySetting(_) => DjmMySetting::KEYS,
            Payload::DevSetting(_) => &[],
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match self {
            Payload::MySetting(p) => p.get(key),
            Payload::MySetting2(p) => p.get(key),
            Payload::DjmMySetting(p) => p.get(key),
            Payload::DevSetting(_) => None,
        }
    }

    pub fn set(&mut self, key: &str, label: &str) -> Result<()> {
        match self {
            Payload::MySetting(p) => p.set(key, label),
            Payload::MySetting2(p) => p.set(key, label),
            Payload::DjmMySetting(p) => p.set(key, label),
            Payload::DevSetting(_) => Err(Error::InvalidSetting {
                key: key.to_string(),
                value: label.to_string(),
            }),
        }
    }

    fn decode(kind: SettingsKind, r: &mut ByteReader) -> Result<Self> {
        Ok(match kind {
            SettingsKind::MySetting => Payload::MySetting(r.read_struct()?),
            SettingsKind::MySetting2 => Payload::MySetting2(r.read_struct()?),
            SettingsKind::DjmMySetting => Payload::DjmMySetting(r.read_struct()?),
            SettingsKind::DevSetting => Payload::DevSetting(r.read_struct()?),
        })
    }

    fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        match self {
            Payload::MySetting(p) => w.write_struct(p),
            Payload::MySetting2(p) => w.write_struct(p),
            Payload::DjmMySetting(p) => w.write_struct(p),
            Payload::DevSetting(p) => w.write_struct(p),
        }
    }
}

/// A decoded settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsFile {
    pub brand: String,
    pub software: String,
    pub version: String,
    pub payload: Payload,
    /// Trailing word after the checksum
    pub unknown: u16,
    #[serde(skip)]
    checksum_mismatch: Option<ChecksumMismatch>,
    /// Brand, software and version fields as read, when bytes after the
    /// NUL were not zero
    #[serde(skip)]
    raw_strings: [Option<[u8; STRING_LEN]>; 3],
}

impl SettingsFile {
    /// A file of `kind` with factory defaults
    pub fn new(kind: SettingsKind) -> Self {
        let (brand, software, version) = kind.default_strings();
        Self {
            brand: brand.to_string(),
            software: software.to_string(),
            version: version.to_string(),
            payload: Payload::default_for(kind),
            unknown: 0,
            checksum_mismatch: None,
            raw_strings: Default::default(),
        }
    }

    pub fn kind(&self) -> SettingsKind {
        self.payload.kind()
    }

    /// Decode a settings file. A stale checksum is not an error; it is
    /// reported by [`SettingsFile::checksum_mismatch`].
    pub fn decode(kind: SettingsKind, data: &[u8]) -> Result<Self> {
        let mut r = ByteReader::little_endian(data);
        let len_strings = r.read_u32()?;
        if len_strings != LEN_STRINGS {
            return Err(Error::MalformedSettings(format!(
                "len_strings {:#x}, expected {:#x}",
                len_strings, LEN_STRINGS
            )));
        }
        let (brand, raw_brand) = read_string(&mut r)?;
        let (software, raw_software) = read_string(&mut r)?;
        let (version, raw_version) = read_string(&mut r)?;

        let len_data = r.read_u32()? as usize;
        if len_data != kind.payload_len() {
            return Err(Error::MalformedSettings(format!(
                "{} payload is {} bytes, expected {}",
                kind,
                len_data,
                kind.payload_len()
            )));
        }
        let payload = Payload::decode(kind, &mut r)?;
        let stored = r.read_u16()?;
        let unknown = r.read_u16()?;
        if r.remaining() != 0 {
            return Err(Error::MalformedSettings(format!(
                "{} trailing bytes after footer",
                r.remaining()
            )));
        }

        let computed = compute_checksum(kind, data)?;
        let checksum_mismatch = (stored != computed).then(|| {
            warn!("{}: stored checksum {:#06x}, computed {:#06x}", kind, stored, computed);
            ChecksumMismatch { stored, computed }
        });

        Ok(Self {
            brand,
            software,
            version,
            payload,
            unknown,
            checksum_mismatch,
            raw_strings: [raw_brand, raw_software, raw_version],
        })
    }

    /// Like [`SettingsFile::decode`], failing on a checksum mismatch
    pub fn decode_strict(kind: SettingsKind, data: &[u8]) -> Result<Self> {
        let file = Self::decode(kind, data)?;
        match file.checksum_mismatch {
            Some(mismatch) => Err(mismatch.into()),
            None => Ok(file),
        }
    }

    /// Serialize with a freshly computed checksum
    pub fn encode(&self) -> Result<Vec<u8>> {
        let kind = self.kind();
        let mut w = ByteWriter::little_endian();
        w.write_u32(LEN_STRINGS);
        let [raw_brand, raw_software, raw_version] = &self.raw_strings;
        write_string(&mut w, "brand", &self.brand, raw_brand.as_ref())?;
        write_string(&mut w, "software", &self.software, raw_software.as_ref())?;
        write_string(&mut w, "version", &self.version, raw_version.as_ref())?;
        w.write_u32(kind.payload_len() as u32);
        self.payload.encode(&mut w)?;
        w.write_u16(0);
        w.write_u16(self.unknown);

        let mut data = w.into_inner();
        let checksum = compute_checksum(kind, &data)?;
        let at = data.len() - FOOTER_LEN;
        data[at..at + 2].copy_from_slice(&checksum.to_le_bytes());
        Ok(data)
    }

    /// Checksum this file is written with
    pub fn checksum(&self) -> Result<u16> {
        let data = self.encode()?;
        let at = data.len() - FOOTER_LEN;
        Ok(u16::from_le_bytes([data[at], data[at + 1]]))
    }

    /// Mismatch found when the file was decoded, if any
    pub fn checksum_mismatch(&self) -> Option<&ChecksumMismatch> {
        self.checksum_mismatch.as_ref()
    }

    /// Label of a named setting, e.g. `"quantize"` -> `"on"`
    pub fn get(&self, key: &str) -> Option<String> {
        self.payload.get(key)
    }

    pub fn set(&mut self, key: &str, label: &str) -> Result<()> {
        self.payload.set(key, label)
    }

    /// Read a settings file; the variant comes from the file name
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let kind = kind_for_path(path)?;
        debug!("Reading {} from {}", kind, path.display());
        let data = std::fs::read(path)?;
        Self::decode(kind, &data)
    }

    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let kind = kind_for_path(path)?;
        if kind != self.kind() {
            return Err(Error::UnsupportedFile(format!(
                "cannot write {} contents to {}",
                self.kind(),
                path.display()
            )));
        }
        let data = self.encode()?;
        std::fs::write(path, &data)?;
        debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }
}

/// CRC16/XMODEM over the checksummed range of a complete file
pub fn compute_checksum(kind: SettingsKind, data: &[u8]) -> Result<u16> {
    let end = data.len().checked_sub(FOOTER_LEN).ok_or(Error::TruncatedInput {
        offset: 0,
        needed: FOOTER_LEN,
        available: data.len(),
    })?;
    crc16_xmodem_range(data, kind.checksum_start()..end)
}

fn kind_for_path(path: &Path) -> Result<SettingsKind> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(SettingsKind::from_file_name)
        .ok_or_else(|| Error::UnsupportedFile(path.display().to_string()))
}

fn string_text(raw: &[u8]) -> &[u8] {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    &raw[..end]
}

/// Read a header string; the raw field comes back too when its padding is dirty
fn read_string(r: &mut ByteReader) -> Result<(String, Option<[u8; STRING_LEN]>)> {
    let raw = r.read_array::<STRING_LEN>()?;
    let text = string_text(&raw);
    if !text.is_ascii() {
        return Err(Error::MalformedSettings(format!(
            "non-ASCII header string {:?}",
            String::from_utf8_lossy(text)
        )));
    }
    let value = String::from_utf8_lossy(text).into_owned();
    let dirty = raw[text.len()..].iter().any(|&b| b != 0);
    Ok((value, dirty.then_some(raw)))
}

fn write_string(
    w: &mut ByteWriter,
    field: &str,
    value: &str,
    original: Option<&[u8; STRING_LEN]>,
) -> Result<()> {
    if !value.is_ascii() || value.len() > STRING_LEN {
        return Err(Error::InvalidSetting {
            key: field.to_string(),
            value: value.to_string(),
        });
    }
    // Keep the original padding while the text is unchanged
    if let Some(raw) = original.filter(|raw| string_text(&raw[..]) == value.as_bytes()) {
        w.write_bytes(raw);
        return Ok(());
    }
    let mut raw = [0u8; STRING_LEN];
    raw[..value.len()].copy_from_slice(value.as_bytes());
    w.write_bytes(&raw);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::values::{OnOff, Setting};
    use super::*;
    use tempfile::TempDir;

    /// DEVSETTING.DAT as exported by rekordbox 6.8.4
    fn devsetting_fixture() -> Vec<u8> {
        let mut data = vec![0u8; 140];
        data[0..4].copy_from_slice(&96u32.to_le_bytes());
        data[4..14].copy_from_slice(b"PIONEER DJ");
        data[0x24..0x2D].copy_from_slice(b"rekordbox");
        data[0x44..0x49].copy_from_slice(b"6.8.4");
        data[0x64..0x68].copy_from_slice(&0x20u32.to_le_bytes());
        data[0x68..0x6C].copy_from_slice(&0x12345678u32.to_le_bytes());
        data[0x6C..0x70].copy_from_slice(&1u32.to_le_bytes());
        data[0x70..0x76].fill(0x01);
        data[0x88..0x8C].copy_from_slice(&0xD016u32.to_le_bytes());
        data
    }

    #[test]
    fn test_quantize_byte() {
        let mut data = SettingsFile::new(SettingsKind::MySetting).encode().unwrap();
        data[114] = 0x81;
        let file = SettingsFile::decode(SettingsKind::MySetting, &data).unwrap();
        assert_eq!(file.get("quantize").as_deref(), Some("on"));

        let mut file = file;
        file.set("quantize", "off").unwrap();
        assert_eq!(file.encode().unwrap()[114], 0x80);
        file.set("quantize", "on").unwrap();
        assert_eq!(file.encode().unwrap()[114], 0x81);
    }

    #[test]
    fn test_devsetting_fixture() {
        let data = devsetting_fixture();
        let file = SettingsFile::decode_strict(SettingsKind::DevSetting, &data).unwrap();
        assert_eq!(file.brand, "PIONEER DJ");
        assert_eq!(file.software, "rekordbox");
        assert_eq!(file.version, "6.8.4");
        assert_eq!(file.checksum().unwrap(), 0xD016);
        assert_eq!(file.encode().unwrap(), data);
        assert_eq!(SettingsFile::new(SettingsKind::DevSetting), file);
    }

    #[test]
    fn test_new_files_are_self_consistent() {
        for kind in SettingsKind::all() {
            let file = SettingsFile::new(kind);
            let data = file.encode().unwrap();
            assert_eq!(data.len(), kind.file_len());
            assert_eq!(u32::from_le_bytes(data[100..104].try_into().unwrap()) as usize, kind.payload_len());

            let stored = u16::from_le_bytes([data[data.len() - 4], data[data.len() - 3]]);
            assert_eq!(compute_checksum(kind, &data).unwrap(), stored);
            assert_eq!(file.checksum().unwrap(), stored);

            let decoded = SettingsFile::decode_strict(kind, &data).unwrap();
            assert_eq!(decoded, file);
            assert_eq!(decoded.encode().unwrap(), data);
        }
    }

    #[test]
    fn test_stale_checksum_is_reported() {
        let mut data = SettingsFile::new(SettingsKind::MySetting2).encode().unwrap();
        let at = data.len() - 4;
        data[at] ^= 0xFF;

        let file = SettingsFile::decode(SettingsKind::MySetting2, &data).unwrap();
        let mismatch = *file.checksum_mismatch().unwrap();
        assert_ne!(mismatch.stored, mismatch.computed);
        assert_eq!(file.checksum().unwrap(), mismatch.computed);
        assert!(matches!(
            SettingsFile::decode_strict(SettingsKind::MySetting2, &data),
            Err(Error::ChecksumMismatch(m)) if m == mismatch
        ));
    }

    #[test]
    fn test_checksum_ranges() {
        // Header bytes only count towards the DJM checksum
        for kind in [SettingsKind::MySetting, SettingsKind::DjmMySetting] {
            let mut file = SettingsFile::new(kind);
            let before = file.checksum().unwrap();
            file.version.replace_range(0..1, "2");
            let after = file.checksum().unwrap();
            assert_eq!(before == after, kind != SettingsKind::DjmMySetting);
        }

        let data = SettingsFile::new(SettingsKind::DjmMySetting).encode().unwrap();
        let end = data.len() - 4;
        assert_eq!(
            compute_checksum(SettingsKind::DjmMySetting, &data).unwrap(),
            crate::checksum::crc16_xmodem(&data[..end])
        );
    }

    #[test]
    fn test_unknown_value_roundtrip() {
        let mut data = SettingsFile::new(SettingsKind::MySetting).encode().unwrap();
        data[114] = 0x9F;
        let file = SettingsFile::decode(SettingsKind::MySetting, &data).unwrap();
        match &file.payload {
            Payload::MySetting(p) => assert_eq!(p.quantize, Setting::RawUnknown(0x9F)),
            other => panic!("unexpected payload {:?}", other),
        }
        assert_eq!(file.get("quantize").as_deref(), Some("0x9f"));

        let encoded = file.encode().unwrap();
        assert_eq!(encoded[114], 0x9F);
        assert_eq!(&encoded[..encoded.len() - 4], &data[..data.len() - 4]);
    }

    #[test]
    fn test_layout_errors() {
        let data = SettingsFile::new(SettingsKind::MySetting).encode().unwrap();

        // MYSETTING and MYSETTING2 share a size; DJM does not
        assert!(SettingsFile::decode(SettingsKind::MySetting2, &data).is_ok());
        assert!(matches!(
            SettingsFile::decode(SettingsKind::DjmMySetting, &data),
            Err(Error::MalformedSettings(_))
        ));
        assert!(matches!(
            SettingsFile::decode(SettingsKind::MySetting, &data[..data.len() - 2]),
            Err(Error::TruncatedInput { .. })
        ));

        let mut longer = data.clone();
        longer.push(0);
        assert!(matches!(
            SettingsFile::decode(SettingsKind::MySetting, &longer),
            Err(Error::MalformedSettings(_))
        ));

        let mut bad = data;
        bad[0] = 0x61;
        assert!(matches!(
            SettingsFile::decode(SettingsKind::MySetting, &bad),
            Err(Error::MalformedSettings(_))
        ));
    }

    #[test]
    fn test_header_strings() {
        let mut file = SettingsFile::new(SettingsKind::MySetting);
        file.brand = "X".repeat(33);
        assert!(matches!(file.encode(), Err(Error::InvalidSetting { .. })));
        file.brand = "X".repeat(32);
        let data = file.encode().unwrap();
        let decoded = SettingsFile::decode_strict(SettingsKind::MySetting, &data).unwrap();
        assert_eq!(decoded.brand.len(), 32);
        assert_eq!(decoded.software, "rekordbox");
    }

    #[test]
    fn test_string_padding_survives() {
        let mut data = SettingsFile::new(SettingsKind::MySetting).encode().unwrap();
        // Junk after the NUL that ends "PIONEER"
        data[4 + 20] = 0x55;
        let decoded = SettingsFile::decode_strict(SettingsKind::MySetting, &data).unwrap();
        assert_eq!(decoded.brand, "PIONEER");
        assert_eq!(decoded.encode().unwrap(), data);

        let mut renamed = decoded.clone();
        renamed.brand = "PIONEER DJ".to_string();
        let out = renamed.encode().unwrap();
        assert_eq!(&out[4..14], b"PIONEER DJ");
        assert!(out[14..36].iter().all(|&b| b == 0));

        // DJMMYSETTING checksums the strings as well
        let mut djm = SettingsFile::new(SettingsKind::DjmMySetting).encode().unwrap();
        djm[0x44 + 10] = 0x7F;
        let checksum = compute_checksum(SettingsKind::DjmMySetting, &djm).unwrap();
        let at = djm.len() - FOOTER_LEN;
        djm[at..at + 2].copy_from_slice(&checksum.to_le_bytes());
        let decoded = SettingsFile::decode_strict(SettingsKind::DjmMySetting, &djm).unwrap();
        assert_eq!(decoded.version, "1.000");
        assert_eq!(decoded.encode().unwrap(), djm);
    }

    #[test]
    fn test_named_access() {
        let mut file = SettingsFile::new(SettingsKind::MySetting2);
        assert_eq!(file.payload.keys().len(), 7);
        assert_eq!(file.get("beat_jump_beat_value").as_deref(), Some("sixteen"));
        file.set("beat_jump_beat_value", "thirtytwo").unwrap();
        assert_eq!(file.get("beat_jump_beat_value").as_deref(), Some("thirtytwo"));
        assert_eq!(file.get("quantize"), None);
        assert!(matches!(file.set("quantize", "on"), Err(Error::InvalidSetting { .. })));

        let mut dev = SettingsFile::new(SettingsKind::DevSetting);
        assert!(dev.payload.keys().is_empty());
        assert!(dev.set("entries", "on").is_err());

        let mut my = SettingsFile::new(SettingsKind::MySetting);
        my.set("sync", "on").unwrap();
        match &my.payload {
            Payload::MySetting(p) => assert_eq!(p.sync, Setting::Known(OnOff::On)),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_file_names() {
        assert_eq!(SettingsKind::from_file_name("mysetting2.dat"), Some(SettingsKind::MySetting2));
        assert_eq!(SettingsKind::from_file_name("DJMMYSETTING.DAT"), Some(SettingsKind::DjmMySetting));
        assert_eq!(SettingsKind::from_file_name("ANLZ0000.DAT"), None);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("DJMMYSETTING.DAT");

        let mut file = SettingsFile::new(SettingsKind::DjmMySetting);
        file.set("midi_channel", "twelve").unwrap();
        file.write_file(&path).unwrap();

        let read = SettingsFile::read_file(&path).unwrap();
        assert!(read.checksum_mismatch().is_none());
        assert_eq!(read.get("midi_channel").as_deref(), Some("twelve"));
        assert_eq!(read, file);

        let wrong = dir.path().join("MYSETTING.DAT");
        assert!(matches!(file.write_file(&wrong), Err(Error::UnsupportedFile(_))));
        let unknown = dir.path().join("settings.bin");
        assert!(matches!(
            SettingsFile::read_file(&unknown),
            Err(Error::UnsupportedFile(_))
        ));
    }

    #[test]
    fn test_serialize() {
        let file = SettingsFile::new(SettingsKind::MySetting);
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["brand"], "PIONEER");
        assert_eq!(json["payload"]["MySetting"]["quantize"]["Known"], "On");
    }
}
