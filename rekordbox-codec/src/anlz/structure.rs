//! PSSI: song structure (phrase analysis)
//!
//! Tags exported to removable media are XOR-masked from byte 18 on. A mood
//! or bank outside the known ranges marks such a tag; it is unmasked before
//! decoding and masked again when written back.

use binrw::binrw;
use serde::{Deserialize, Serialize};

use super::envelope::TagHeader;
use super::phrase::{
    apply_mask, is_garbled, resolve_phrase, Bank, HighPhrase, Mood, Phrase, UnrecognizedPhrase,
};
use super::tags::{check_entry_bytes, check_header_length, tag_reader};
use crate::cursor::ByteWriter;
use crate::error::{Error, Result};

pub const PSSI_HEADER_LEN: u32 = 32;
const PHRASE_ENTRY_LEN: usize = 24;

/// One phrase, 24 bytes
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhraseEntry {
    /// 1-based position in the list
    pub index: u16,
    /// Start beat
    pub beat: u16,
    pub kind: u16,
    pub u1: u8,
    pub k1: u8,
    pub u2: u8,
    pub k2: u8,
    pub u3: u8,
    /// Selects how many extra beats an "Up 3" phrase has
    pub b: u8,
    pub beat_2: u16,
    pub beat_3: u16,
    pub beat_4: u16,
    pub u4: u8,
    pub k3: u8,
    pub u5: u8,
    /// Non-zero when the phrase has a fill-in
    pub fill: u8,
    pub beat_fill: u16,
}

impl PhraseEntry {
    pub fn new(index: u16, beat: u16, kind: u16) -> Self {
        Self {
            index,
            beat,
            kind,
            ..Self::default()
        }
    }

    pub fn k1(&self) -> bool {
        self.k1 != 0
    }

    pub fn k2(&self) -> bool {
        self.k2 != 0
    }

    pub fn k3(&self) -> bool {
        self.k3 != 0
    }

    pub fn phrase(&self, mood: Mood) -> std::result::Result<Phrase, UnrecognizedPhrase> {
        resolve_phrase(mood, self.kind, self.k1, self.k2, self.k3)
    }

    /// Extra beats of an "Up 3" phrase: one when `b == 0`, three when `b == 1`
    pub fn extra_beats(&self, mood: Mood) -> Vec<u16> {
        match self.phrase(mood) {
            Ok(Phrase::High(HighPhrase::Up3)) => match self.b {
                0 => vec![self.beat_2],
                1 => vec![self.beat_2, self.beat_3, self.beat_4],
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    pub fn fill_beat(&self) -> Option<u16> {
        (self.fill != 0).then_some(self.beat_fill)
    }
}

/// Song structure (PSSI)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongStructure {
    pub mood: Mood,
    pub u1: [u8; 6],
    /// Beat at which the last phrase ends
    pub end_beat: u16,
    pub u2: [u8; 2],
    pub bank: Bank,
    pub u3: u8,
    pub phrases: Vec<PhraseEntry>,
    /// Read from a masked tag; written back masked
    pub obfuscated: bool,
}

impl SongStructure {
    pub fn new(mood: Mood, bank: Bank, end_beat: u16, phrases: Vec<PhraseEntry>) -> Self {
        Self {
            mood,
            u1: [0; 6],
            end_beat,
            u2: [0; 2],
            bank,
            u3: 0,
            phrases,
            obfuscated: false,
        }
    }

    /// Label of every phrase, in order
    pub fn labels(&self) -> Vec<std::result::Result<Phrase, UnrecognizedPhrase>> {
        self.phrases.iter().map(|p| p.phrase(self.mood)).collect()
    }

    /// `(start, end)` beats of every phrase. A phrase ends where the next
    /// one starts; the last one ends at `end_beat`.
    pub fn phrase_ranges(&self) -> Vec<(u16, u16)> {
        self.phrases
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let end = self
                    .phrases
                    .get(i + 1)
                    .map_or(self.end_beat, |next| next.beat);
                (p.beat, end)
            })
            .collect()
    }

    pub(crate) fn decode(tag: &[u8], header: &TagHeader) -> Result<Self> {
        check_header_length(header, PSSI_HEADER_LEN)?;
        let mut r = tag_reader(tag);
        let len_entry_bytes = r.read_u32()?;
        let len_entries = r.read_u16()?;
        let mood = r.read_u16()?;
        r.seek(30)?;
        let bank = r.read_u8()?;

        if len_entry_bytes as usize != PHRASE_ENTRY_LEN {
            return Err(Error::malformed(
                header.fourcc,
                format!("len_entry_bytes {}, expected {}", len_entry_bytes, PHRASE_ENTRY_LEN),
            ));
        }
        check_entry_bytes(header, len_entries as usize, PHRASE_ENTRY_LEN)?;

        if is_garbled(mood, bank) {
            let mut plain = tag.to_vec();
            apply_mask(&mut plain, len_entries);
            let mut structure = Self::decode_plain(&plain, header)?;
            structure.obfuscated = true;
            Ok(structure)
        } else {
            Self::decode_plain(tag, header)
        }
    }

    fn decode_plain(tag: &[u8], header: &TagHeader) -> Result<Self> {
        let mut r = tag_reader(tag);
        r.skip(4)?;
        let len_entries = r.read_u16()? as usize;
        let raw_mood = r.read_u16()?;
        let u1 = r.read_array::<6>()?;
        let end_beat = r.read_u16()?;
        let u2 = r.read_array::<2>()?;
        let raw_bank = r.read_u8()?;
        let u3 = r.read_u8()?;

        let (mood, bank) = match (Mood::from_raw(raw_mood), Bank::from_raw(raw_bank)) {
            (Some(mood), Some(bank)) => (mood, bank),
            _ => {
                return Err(Error::malformed(
                    header.fourcc,
                    format!("mood {} / bank {} out of range after unmasking", raw_mood, raw_bank),
                ))
            }
        };

        let phrases = (0..len_entries)
            .map(|_| r.read_struct::<PhraseEntry>())
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            mood,
            u1,
            end_beat,
            u2,
            bank,
            u3,
            phrases,
            obfuscated: false,
        })
    }

    /// Write the unmasked fields; see [`SongStructure::mask_encoded`]
    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        let len_entries = u16::try_from(self.phrases.len())
            .map_err(|_| Error::malformed("PSSI", "more than 65535 phrases"))?;
        w.write_u32(PHRASE_ENTRY_LEN as u32);
        w.write_u16(len_entries);
        w.write_u16(self.mood.to_raw());
        w.write_bytes(&self.u1);
        w.write_u16(self.end_beat);
        w.write_bytes(&self.u2);
        w.write_u8(self.bank.to_raw());
        w.write_u8(self.u3);
        for phrase in &self.phrases {
            w.write_struct(phrase)?;
        }
        Ok(())
    }

    /// Re-apply the mask to a finished tag if it was read masked
    pub(crate) fn mask_encoded(&self, tag: &mut [u8]) {
        if self.obfuscated {
            apply_mask(tag, self.phrases.len() as u16);
        }
    }
}
