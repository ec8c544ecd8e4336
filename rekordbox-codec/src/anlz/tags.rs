//! Tag kinds and the body sum type
//!
//! Every recognized fourcc maps to one [`TagKind`] and one [`TagBody`]
//! variant. Anything else, and any recognized tag that was kept opaque,
//! is carried as a [`RawTag`] holding the exact bytes it was read from.

use serde::{Deserialize, Serialize};

use super::beatgrid::{BeatGrid, ExtendedBeatGrid};
use super::cue::{CueList, ExtendedCueList};
use super::envelope::{encode_tag, FourCC, TagHeader, PREFIX_LEN};
use super::path::PathTag;
use super::structure::SongStructure;
use super::vbr::VbrIndex;
use super::waveform::{
    ThreeBandDetail, ThreeBandPreview, WaveformColorDetail, WaveformColorPreview, WaveformDetail,
    WaveformPreview, WaveformPwvc,
};
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagKind {
    /// PPTH
    Path,
    /// PQTZ
    BeatGrid,
    /// PQT2
    ExtendedBeatGrid,
    /// PCOB
    CueList,
    /// PCO2
    ExtendedCueList,
    /// PVBR
    Vbr,
    /// PWAV, 400 columns
    WaveformPreview,
    /// PWV2, 100 columns
    WaveformTinyPreview,
    /// PWV3
    WaveformDetail,
    /// PWV4
    WaveformColorPreview,
    /// PWV5
    WaveformColorDetail,
    /// PWV6
    ThreeBandPreview,
    /// PWV7
    ThreeBandDetail,
    /// PWVC
    WaveformPwvc,
    /// PSSI
    SongStructure,
}

/// fourcc and fixed header length of every recognized kind
const KIND_TABLE: [(TagKind, &[u8; 4], u32); 15] = [
    (TagKind::Path, b"PPTH", 16),
    (TagKind::BeatGrid, b"PQTZ", 24),
    (TagKind::ExtendedBeatGrid, b"PQT2", 56),
    (TagKind::CueList, b"PCOB", 24),
    (TagKind::ExtendedCueList, b"PCO2", 20),
    (TagKind::Vbr, b"PVBR", 16),
    (TagKind::WaveformPreview, b"PWAV", 20),
    (TagKind::WaveformTinyPreview, b"PWV2", 20),
    (TagKind::WaveformDetail, b"PWV3", 24),
    (TagKind::WaveformColorPreview, b"PWV4", 24),
    (TagKind::WaveformColorDetail, b"PWV5", 24),
    (TagKind::ThreeBandPreview, b"PWV6", 20),
    (TagKind::ThreeBandDetail, b"PWV7", 24),
    (TagKind::WaveformPwvc, b"PWVC", 14),
    (TagKind::SongStructure, b"PSSI", 32),
];

impl TagKind {
    pub fn all() -> impl Iterator<Item = TagKind> {
        KIND_TABLE.iter().map(|(kind, _, _)| *kind)
    }

    pub fn from_fourcc(fourcc: FourCC) -> Option<Self> {
        KIND_TABLE
            .iter()
            .find(|(_, code, _)| **code == fourcc.0)
            .map(|(kind, _, _)| *kind)
    }

    // Rows are in declaration order
    fn entry(self) -> &'static (TagKind, &'static [u8; 4], u32) {
        &KIND_TABLE[self as usize]
    }

    pub fn fourcc(self) -> FourCC {
        FourCC::new(self.entry().1)
    }

    /// Fixed `len_header` written for this kind
    pub fn header_length(self) -> u32 {
        self.entry().2
    }
}

/// Unparsed tag, exact bytes from the tag start to `offset + len_tag`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTag {
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TagBody {
    Path(PathTag),
    BeatGrid(BeatGrid),
    ExtendedBeatGrid(ExtendedBeatGrid),
    CueList(CueList),
    ExtendedCueList(ExtendedCueList),
    Vbr(VbrIndex),
    WaveformPreview(WaveformPreview),
    WaveformTinyPreview(WaveformPreview),
    WaveformDetail(WaveformDetail),
    WaveformColorPreview(WaveformColorPreview),
    WaveformColorDetail(WaveformColorDetail),
    ThreeBandPreview(ThreeBandPreview),
    ThreeBandDetail(ThreeBandDetail),
    WaveformPwvc(WaveformPwvc),
    SongStructure(SongStructure),
    Unknown(RawTag),
}

impl TagBody {
    /// Kind of a decoded body, `None` for raw passthrough
    pub fn kind(&self) -> Option<TagKind> {
        Some(match self {
            TagBody::Path(_) => TagKind::Path,
            TagBody::BeatGrid(_) => TagKind::BeatGrid,
            TagBody::ExtendedBeatGrid(_) => TagKind::ExtendedBeatGrid,
            TagBody::CueList(_) => TagKind::CueList,
            TagBody::ExtendedCueList(_) => TagKind::ExtendedCueList,
            TagBody::Vbr(_) => TagKind::Vbr,
            TagBody::WaveformPreview(_) => TagKind::WaveformPreview,
            TagBody::WaveformTinyPreview(_) => TagKind::WaveformTinyPreview,
            TagBody::WaveformDetail(_) => TagKind::WaveformDetail,
            TagBody::WaveformColorPreview(_) => TagKind::WaveformColorPreview,
            TagBody::WaveformColorDetail(_) => TagKind::WaveformColorDetail,
            TagBody::ThreeBandPreview(_) => TagKind::ThreeBandPreview,
            TagBody::ThreeBandDetail(_) => TagKind::ThreeBandDetail,
            TagBody::WaveformPwvc(_) => TagKind::WaveformPwvc,
            TagBody::SongStructure(_) => TagKind::SongStructure,
            TagBody::Unknown(_) => return None,
        })
    }

    /// Decode the body of a tag of `kind`. `tag` holds exactly `len_tag` bytes.
    pub(crate) fn decode(kind: TagKind, tag: &[u8], header: &TagHeader) -> Result<Self> {
        Ok(match kind {
            TagKind::Path => TagBody::Path(PathTag::decode(tag, header)?),
            TagKind::BeatGrid => TagBody::BeatGrid(BeatGrid::decode(tag, header)?),
            TagKind::ExtendedBeatGrid => {
                TagBody::ExtendedBeatGrid(ExtendedBeatGrid::decode(tag, header)?)
            }
            TagKind::CueList => TagBody::CueList(CueList::decode(tag, header)?),
            TagKind::ExtendedCueList => {
                TagBody::ExtendedCueList(ExtendedCueList::decode(tag, header)?)
            }
            TagKind::Vbr => TagBody::Vbr(VbrIndex::decode(tag, header)?),
            TagKind::WaveformPreview => {
                TagBody::WaveformPreview(WaveformPreview::decode(tag, header)?)
            }
            TagKind::WaveformTinyPreview => {
                TagBody::WaveformTinyPreview(WaveformPreview::decode(tag, header)?)
            }
            TagKind::WaveformDetail => TagBody::WaveformDetail(WaveformDetail::decode(tag, header)?),
            TagKind::WaveformColorPreview => {
                TagBody::WaveformColorPreview(WaveformColorPreview::decode(tag, header)?)
            }
            TagKind::WaveformColorDetail => {
                TagBody::WaveformColorDetail(WaveformColorDetail::decode(tag, header)?)
            }
            TagKind::ThreeBandPreview => {
                TagBody::ThreeBandPreview(ThreeBandPreview::decode(tag, header)?)
            }
            TagKind::ThreeBandDetail => {
                TagBody::ThreeBandDetail(ThreeBandDetail::decode(tag, header)?)
            }
            TagKind::WaveformPwvc => TagBody::WaveformPwvc(WaveformPwvc::decode(tag, header)?),
            TagKind::SongStructure => TagBody::SongStructure(SongStructure::decode(tag, header)?),
        })
    }

    /// Write the kind-specific header fields and entries (everything after
    /// the 12-byte prefix). Not valid for [`TagBody::Unknown`].
    fn encode_fields(&self, w: &mut ByteWriter) -> Result<()> {
        match self {
            TagBody::Path(t) => t.encode(w),
            TagBody::BeatGrid(t) => t.encode(w),
            TagBody::ExtendedBeatGrid(t) => t.encode(w),
            TagBody::CueList(t) => t.encode(w),
            TagBody::ExtendedCueList(t) => t.encode(w),
            TagBody::Vbr(t) => t.encode(w),
            TagBody::WaveformPreview(t) | TagBody::WaveformTinyPreview(t) => t.encode(w),
            TagBody::WaveformDetail(t) => t.encode(w),
            TagBody::WaveformColorPreview(t) => t.encode(w),
            TagBody::WaveformColorDetail(t) => t.encode(w),
            TagBody::ThreeBandPreview(t) => t.encode(w),
            TagBody::ThreeBandDetail(t) => t.encode(w),
            TagBody::WaveformPwvc(t) => t.encode(w),
            TagBody::SongStructure(t) => t.encode(w),
            TagBody::Unknown(_) => Err(Error::malformed("raw", "raw tags carry their own bytes")),
        }
    }
}

/// One tagged section of an analysis file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub fourcc: FourCC,
    pub header_length: u32,
    /// Length as read or as last encoded
    pub tag_length: u32,
    pub body: TagBody,
}

impl Tag {
    /// Wrap a decoded body with the envelope of its kind
    pub fn new(body: TagBody) -> Result<Self> {
        if let TagBody::Unknown(raw) = body {
            return Self::raw(raw.bytes);
        }
        let kind = body
            .kind()
            .ok_or_else(|| Error::malformed("raw", "tag body has no kind"))?;
        let mut tag = Self {
            fourcc: kind.fourcc(),
            header_length: kind.header_length(),
            tag_length: 0,
            body,
        };
        tag.tag_length = tag.to_bytes()?.len() as u32;
        Ok(tag)
    }

    /// Wrap raw tag bytes, reading the envelope prefix from them
    pub fn raw(bytes: Vec<u8>) -> Result<Self> {
        let header = super::envelope::decode_header(&bytes, 0)?;
        if header.tag_length as usize != bytes.len() {
            return Err(Error::malformed(
                header.fourcc,
                format!("len_tag {} but {} bytes given", header.tag_length, bytes.len()),
            ));
        }
        Ok(Self::opaque(&header, bytes))
    }

    pub(crate) fn opaque(header: &TagHeader, bytes: Vec<u8>) -> Self {
        Self {
            fourcc: header.fourcc,
            header_length: header.header_length,
            tag_length: header.tag_length,
            body: TagBody::Unknown(RawTag { bytes }),
        }
    }

    /// Decode one tag from its exact bytes. Unrecognized fourccs become raw.
    pub(crate) fn decode(tag: &[u8], header: &TagHeader) -> Result<Self> {
        let body = match TagKind::from_fourcc(header.fourcc) {
            Some(kind) => TagBody::decode(kind, tag, header)?,
            None => TagBody::Unknown(RawTag { bytes: tag.to_vec() }),
        };
        Ok(Self {
            fourcc: header.fourcc,
            header_length: header.header_length,
            tag_length: header.tag_length,
            body,
        })
    }

    /// Kind named by the fourcc, whether or not the body was decoded
    pub fn kind(&self) -> Option<TagKind> {
        TagKind::from_fourcc(self.fourcc)
    }

    pub fn is_raw(&self) -> bool {
        matches!(self.body, TagBody::Unknown(_))
    }

    /// Serialize the tag, recomputing `len_tag` from the encoded body
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match &self.body {
            TagBody::Unknown(raw) => Ok(raw.bytes.clone()),
            TagBody::SongStructure(structure) => {
                let mut bytes =
                    encode_tag(self.fourcc, self.header_length, |w| structure.encode(w))?;
                structure.mask_encoded(&mut bytes);
                Ok(bytes)
            }
            body => encode_tag(self.fourcc, self.header_length, |w| body.encode_fields(w)),
        }
    }
}

/// Reader positioned after the 12-byte envelope prefix
pub(crate) fn tag_reader(tag: &[u8]) -> ByteReader<'_> {
    let mut reader = ByteReader::big_endian(tag);
    // An out-of-range seek leaves the reader at 0; the first read then fails
    let _ = reader.seek(PREFIX_LEN);
    reader
}

/// Reject a recognized tag whose `len_header` differs from its kind's layout
pub(crate) fn check_header_length(header: &TagHeader, expected: u32) -> Result<()> {
    if header.header_length != expected {
        return Err(Error::malformed(
            header.fourcc,
            format!("len_header {}, expected {}", header.header_length, expected),
        ));
    }
    Ok(())
}

/// `count` fixed-width entries must fill the tag exactly
pub(crate) fn check_entry_bytes(header: &TagHeader, count: usize, width: usize) -> Result<()> {
    let needed = count.checked_mul(width);
    if needed != Some(header.entries_length()) {
        return Err(Error::malformed(
            header.fourcc,
            format!(
                "{} entries of {} bytes declared, {} bytes present",
                count,
                width,
                header.entries_length()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anlz::beatgrid::BeatEntry;
    use crate::anlz::envelope::decode_header;

    #[test]
    fn test_kind_table_lookup() {
        assert_eq!(TagKind::all().count(), 15);
        for (i, kind) in TagKind::all().enumerate() {
            assert_eq!(kind as usize, i);
        }
        for kind in TagKind::all() {
            assert_eq!(TagKind::from_fourcc(kind.fourcc()), Some(kind));
        }
        assert_eq!(TagKind::from_fourcc(FourCC::new(b"PSSI")), Some(TagKind::SongStructure));
        assert_eq!(TagKind::WaveformPwvc.header_length(), 14);
        assert_eq!(TagKind::from_fourcc(FourCC::new(b"PXYZ")), None);
    }

    #[test]
    fn test_unknown_tag_passthrough() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"PXYZ");
        bytes.extend_from_slice(&16u32.to_be_bytes());
        bytes.extend_from_slice(&21u32.to_be_bytes());
        bytes.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);

        let header = decode_header(&bytes, 0).unwrap();
        let tag = Tag::decode(&bytes, &header).unwrap();
        assert!(tag.is_raw());
        assert_eq!(tag.kind(), None);
        assert_eq!(tag.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_new_computes_envelope() {
        let grid = BeatGrid::new(vec![BeatEntry {
            beat_number: 1,
            tempo_100: 12000,
            time_ms: 0,
        }]);
        let tag = Tag::new(TagBody::BeatGrid(grid)).unwrap();
        assert_eq!(tag.fourcc, FourCC::new(b"PQTZ"));
        assert_eq!(tag.header_length, 24);
        assert_eq!(tag.tag_length, 32);

        let bytes = tag.to_bytes().unwrap();
        let header = decode_header(&bytes, 0).unwrap();
        assert_eq!(Tag::decode(&bytes, &header).unwrap(), tag);
    }

    #[test]
    fn test_raw_requires_exact_length() {
        let tag = Tag::new(TagBody::Path(PathTag::new("/x.mp3"))).unwrap();
        let mut bytes = tag.to_bytes().unwrap();
        assert!(Tag::raw(bytes.clone()).unwrap().is_raw());
        bytes.push(0);
        assert!(Tag::raw(bytes).is_err());
    }

    #[test]
    fn test_wrong_header_length_is_malformed() {
        let tag = Tag::new(TagBody::BeatGrid(BeatGrid::default())).unwrap();
        let mut bytes = tag.to_bytes().unwrap();
        bytes[4..8].copy_from_slice(&20u32.to_be_bytes());
        let header = decode_header(&bytes, 0).unwrap();
        assert!(matches!(
            Tag::decode(&bytes, &header),
            Err(Error::MalformedTag { .. })
        ));
    }
}
