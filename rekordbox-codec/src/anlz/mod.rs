//! ANLZ analysis files (.DAT, .EXT, .2EX)
//!
//! ANLZ files are **big-endian**: a PMAI file header followed by tagged
//! sections. The three extensions differ only in which tags they usually
//! hold, so any tag kind is accepted in any file.
//!
//! Tags that are not understood, or that fail to decode, are kept as raw
//! bytes and written back unchanged.
//!
//! Reference: https://djl-analysis.deepsymmetry.org/rekordbox-export-analysis/anlz.html

pub mod beatgrid;
pub mod cue;
pub mod envelope;
pub mod path;
pub mod phrase;
pub mod structure;
pub mod tags;
pub mod vbr;
pub mod waveform;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ParseOptions;
use crate::cursor::ByteWriter;
use crate::error::{Error, Result};
use beatgrid::BeatGrid;
use cue::{CueList, ExtendedCueList};
use envelope::{decode_header, next_tag_offset, FourCC, PREFIX_LEN};
use path::PathTag;
use structure::SongStructure;
use tags::{Tag, TagBody, TagKind};

pub const PMAI: FourCC = FourCC::new(b"PMAI");
pub const PMAI_HEADER_LEN: u32 = 28;

/// Reserved PMAI words written into new files
const PMAI_DEFAULT_EXTRA: [u8; 16] = [
    0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

const EXTENSIONS: [&str; 3] = ["DAT", "EXT", "2EX"];

/// PMAI file header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHeader {
    pub header_length: u32,
    /// `len_file` as read. Recomputed on write.
    pub file_length: u32,
    /// Header bytes after the 12-byte prefix
    pub extra: Vec<u8>,
}

impl Default for FileHeader {
    fn default() -> Self {
        Self {
            header_length: PMAI_HEADER_LEN,
            file_length: PMAI_HEADER_LEN,
            extra: PMAI_DEFAULT_EXTRA.to_vec(),
        }
    }
}

/// A recognized tag that could not be decoded and was kept raw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagIssue {
    /// Position in [`AnalysisFile::tags`]
    pub index: usize,
    pub fourcc: FourCC,
    /// Byte offset of the tag in the file
    pub offset: usize,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisFile {
    pub header: FileHeader,
    pub tags: Vec<Tag>,
    /// Bytes past `len_file`, written back after the tags
    pub trailer: Vec<u8>,
    issues: Vec<TagIssue>,
}

fn check_extension(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_uppercase())
        .unwrap_or_default();
    if !EXTENSIONS.contains(&ext.as_str()) {
        return Err(Error::UnsupportedFile(format!(
            "{}: not an analysis file (.DAT, .EXT, .2EX)",
            path.display()
        )));
    }
    Ok(())
}

impl AnalysisFile {
    /// Empty file with a default PMAI header
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_with(data, &ParseOptions::default())
    }

    /// Parse with explicit options.
    ///
    /// A tag whose body fails to decode is kept as raw bytes and recorded in
    /// [`AnalysisFile::issues`] unless `options.strict` is set. A tag envelope
    /// that is itself malformed or runs past `len_file` aborts the whole parse,
    /// since the offset of every following tag depends on it.
    pub fn parse_with(data: &[u8], options: &ParseOptions) -> Result<Self> {
        match data.get(0..4) {
            None => {
                return Err(Error::TruncatedInput {
                    offset: 0,
                    needed: PREFIX_LEN,
                    available: data.len(),
                })
            }
            Some(magic) if magic != PMAI.as_bytes() => {
                return Err(Error::BadMagic {
                    expected: PMAI.to_string(),
                    found: FourCC([magic[0], magic[1], magic[2], magic[3]]).to_string(),
                })
            }
            Some(_) => {}
        }

        let file_header = decode_header(data, 0)?;
        let header_length = file_header.header_length as usize;
        let file_length = file_header.tag_length as usize;
        if file_length > data.len() {
            return Err(Error::TruncatedInput {
                offset: 0,
                needed: file_length,
                available: data.len(),
            });
        }
        let body = &data[..file_length];

        let mut file = Self {
            header: FileHeader {
                header_length: file_header.header_length,
                file_length: file_header.tag_length,
                extra: body[PREFIX_LEN..header_length].to_vec(),
            },
            tags: Vec::new(),
            trailer: data[file_length..].to_vec(),
            issues: Vec::new(),
        };

        let mut offset = header_length;
        while offset < file_length {
            let header = decode_header(body, offset)?;
            let end = next_tag_offset(offset, header.tag_length);
            if end > file_length {
                return Err(Error::TruncatedInput {
                    offset,
                    needed: header.tag_length as usize,
                    available: file_length - offset,
                });
            }
            let bytes = &body[offset..end];
            let kind = TagKind::from_fourcc(header.fourcc);

            let tag = match kind {
                Some(kind) if options.is_opaque(kind) => {
                    debug!("Keeping {} tag at {} opaque", header.fourcc, offset);
                    Tag::opaque(&header, bytes.to_vec())
                }
                _ => match Tag::decode(bytes, &header) {
                    Ok(tag) => tag,
                    Err(e) if options.strict => return Err(e),
                    Err(e) => {
                        warn!("Failed to decode {} tag at {}: {}", header.fourcc, offset, e);
                        file.issues.push(TagIssue {
                            index: file.tags.len(),
                            fourcc: header.fourcc,
                            offset,
                            error: e.to_string(),
                        });
                        Tag::opaque(&header, bytes.to_vec())
                    }
                },
            };

            if kind.is_none() {
                warn!("Tag {} not supported, kept as raw bytes", header.fourcc);
            }
            if let TagBody::SongStructure(s) = &tag.body {
                if s.obfuscated {
                    debug!("Unmasked {} tag ({} phrases)", header.fourcc, s.phrases.len());
                }
            }
            debug!(
                "Parsed tag {} (len_header={}, len_tag={})",
                header.fourcc, header.header_length, header.tag_length
            );

            file.tags.push(tag);
            offset = end;
        }

        if !file.trailer.is_empty() {
            debug!("{} bytes past len_file kept as trailer", file.trailer.len());
        }
        Ok(file)
    }

    pub fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        check_extension(path)?;
        debug!("Reading analysis file {}", path.display());
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        check_extension(path)?;
        let data = self.to_bytes()?;
        std::fs::write(path, &data)?;
        debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    /// Serialize the file, recomputing `len_tag` and `len_file`
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let header_length = PREFIX_LEN + self.header.extra.len();
        let mut tags = Vec::new();
        for tag in &self.tags {
            tags.extend(tag.to_bytes()?);
        }
        let file_length = u32::try_from(header_length + tags.len())
            .map_err(|_| Error::malformed(PMAI, "file exceeds 4 GiB"))?;

        let mut w = ByteWriter::big_endian();
        w.write_bytes(PMAI.as_bytes());
        w.write_u32(header_length as u32);
        w.write_u32(file_length);
        w.write_bytes(&self.header.extra);
        w.write_bytes(&tags);
        w.write_bytes(&self.trailer);
        Ok(w.into_inner())
    }

    /// Tags that were kept raw because they failed to decode
    pub fn issues(&self) -> &[TagIssue] {
        &self.issues
    }

    /// fourcc of every tag, in file order
    pub fn tag_kinds(&self) -> Vec<FourCC> {
        self.tags.iter().map(|t| t.fourcc).collect()
    }

    /// First tag of `kind`
    pub fn get(&self, kind: TagKind) -> Option<&Tag> {
        let fourcc = kind.fourcc();
        self.tags.iter().find(|t| t.fourcc == fourcc)
    }

    pub fn get_mut(&mut self, kind: TagKind) -> Option<&mut Tag> {
        let fourcc = kind.fourcc();
        self.tags.iter_mut().find(|t| t.fourcc == fourcc)
    }

    /// All tags of `kind`, in file order
    pub fn get_all(&self, kind: TagKind) -> Vec<&Tag> {
        let fourcc = kind.fourcc();
        self.tags.iter().filter(|t| t.fourcc == fourcc).collect()
    }

    /// Append a tag built from `body`
    pub fn push(&mut self, body: TagBody) -> Result<()> {
        self.tags.push(Tag::new(body)?);
        Ok(())
    }

    pub fn path(&self) -> Option<&str> {
        match &self.get(TagKind::Path)?.body {
            TagBody::Path(p) => p.path.as_deref(),
            _ => None,
        }
    }

    /// Replace the PPTH path, adding the tag if the file has none
    pub fn set_path(&mut self, path: &str) -> Result<()> {
        let body = TagBody::Path(PathTag::new(path));
        match self.get_mut(TagKind::Path) {
            Some(tag) => *tag = Tag::new(body)?,
            None => self.push(body)?,
        }
        Ok(())
    }

    pub fn beat_grid(&self) -> Option<&BeatGrid> {
        match &self.get(TagKind::BeatGrid)?.body {
            TagBody::BeatGrid(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn song_structure(&self) -> Option<&SongStructure> {
        match &self.get(TagKind::SongStructure)?.body {
            TagBody::SongStructure(s) => Some(s),
            _ => None,
        }
    }

    /// Decoded PCOB lists (memory cues and hot cues)
    pub fn cue_lists(&self) -> Vec<&CueList> {
        self.tags
            .iter()
            .filter_map(|t| match &t.body {
                TagBody::CueList(list) => Some(list),
                _ => None,
            })
            .collect()
    }

    /// Decoded PCO2 lists
    pub fn extended_cue_lists(&self) -> Vec<&ExtendedCueList> {
        self.tags
            .iter()
            .filter_map(|t| match &t.body {
                TagBody::ExtendedCueList(list) => Some(list),
                _ => None,
            })
            .collect()
    }
}
