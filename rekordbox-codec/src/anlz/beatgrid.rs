//! Beat grid tags
//!
//! - PQTZ: one 8-byte entry per beat (`beat`, `tempo × 100`, `time` in ms)
//! - PQT2: extended (nxs2) grid, two anchor beats plus 2-byte entries
//!
//! Entries are kept in file order. The decoder does not sort them.

use binrw::binrw;
use serde::{Deserialize, Serialize};

use super::envelope::TagHeader;
use super::tags::{check_entry_bytes, check_header_length, tag_reader};
use crate::cursor::ByteWriter;
use crate::error::{Error, Result};

pub const PQTZ_HEADER_LEN: u32 = 24;
pub const PQT2_HEADER_LEN: u32 = 56;

const BEAT_ENTRY_LEN: usize = 8;
const PQT2_ENTRY_LEN: usize = 2;

/// Single beat in the grid
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BeatEntry {
    /// Position within bar (1-4 for 4/4 time)
    pub beat_number: u16,
    /// Tempo at this beat, BPM × 100
    pub tempo_100: u16,
    /// Time from track start in milliseconds
    pub time_ms: u32,
}

impl BeatEntry {
    pub fn bpm(&self) -> f64 {
        self.tempo_100 as f64 / 100.0
    }

    pub fn time_secs(&self) -> f64 {
        self.time_ms as f64 / 1000.0
    }
}

/// Beat grid (PQTZ)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatGrid {
    pub u1: u32,
    /// Observed as 0x00080000
    pub u2: u32,
    pub entries: Vec<BeatEntry>,
}

impl Default for BeatGrid {
    fn default() -> Self {
        Self {
            u1: 0,
            u2: 0x0008_0000,
            entries: Vec::new(),
        }
    }
}

impl BeatGrid {
    pub fn new(entries: Vec<BeatEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Generate a constant-tempo beat grid
    pub fn constant_tempo(bpm: f64, first_beat_ms: f64, duration_ms: f64) -> Self {
        let mut entries = Vec::new();
        if bpm <= 0.0 {
            return Self::new(entries);
        }
        let beat_duration_ms = 60_000.0 / bpm;
        let tempo_100 = (bpm * 100.0).round() as u16;

        let mut index = 0u32;
        let mut time = first_beat_ms;
        while time < duration_ms {
            entries.push(BeatEntry {
                beat_number: (index % 4) as u16 + 1,
                tempo_100,
                time_ms: time.round() as u32,
            });
            index += 1;
            // Accumulate from the first beat to avoid drift
            time = first_beat_ms + index as f64 * beat_duration_ms;
        }

        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn beat_numbers(&self) -> Vec<u16> {
        self.entries.iter().map(|e| e.beat_number).collect()
    }

    pub fn bpms(&self) -> Vec<f64> {
        self.entries.iter().map(BeatEntry::bpm).collect()
    }

    pub fn times_secs(&self) -> Vec<f64> {
        self.entries.iter().map(BeatEntry::time_secs).collect()
    }

    /// Mean tempo over all beats, 0 for an empty grid
    pub fn average_bpm(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.bpms().iter().sum::<f64>() / self.entries.len() as f64
    }

    /// Distinct tempos in ascending order
    pub fn unique_bpms(&self) -> Vec<f64> {
        let mut tempos: Vec<u16> = self.entries.iter().map(|e| e.tempo_100).collect();
        tempos.sort_unstable();
        tempos.dedup();
        tempos.into_iter().map(|t| t as f64 / 100.0).collect()
    }

    fn check_len(&self, new_len: usize) -> Result<()> {
        if new_len != self.entries.len() {
            return Err(Error::malformed(
                "PQTZ",
                format!("expected {} values, got {}", self.entries.len(), new_len),
            ));
        }
        Ok(())
    }

    /// Replace beat numbers of the existing beats. The beat count cannot change.
    pub fn set_beat_numbers(&mut self, beats: &[u16]) -> Result<()> {
        self.check_len(beats.len())?;
        for (entry, &beat) in self.entries.iter_mut().zip(beats) {
            entry.beat_number = beat;
        }
        Ok(())
    }

    pub fn set_bpms(&mut self, bpms: &[f64]) -> Result<()> {
        self.check_len(bpms.len())?;
        for (entry, &bpm) in self.entries.iter_mut().zip(bpms) {
            entry.tempo_100 = (bpm * 100.0).round() as u16;
        }
        Ok(())
    }

    pub fn set_times_secs(&mut self, times: &[f64]) -> Result<()> {
        self.check_len(times.len())?;
        for (entry, &t) in self.entries.iter_mut().zip(times) {
            entry.time_ms = (t * 1000.0).round() as u32;
        }
        Ok(())
    }

    pub(crate) fn decode(tag: &[u8], header: &TagHeader) -> Result<Self> {
        check_header_length(header, PQTZ_HEADER_LEN)?;
        let mut r = tag_reader(tag);
        let u1 = r.read_u32()?;
        let u2 = r.read_u32()?;
        let len_beats = r.read_u32()? as usize;
        check_entry_bytes(header, len_beats, BEAT_ENTRY_LEN)?;

        let entries = (0..len_beats)
            .map(|_| r.read_struct::<BeatEntry>())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { u1, u2, entries })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_u32(self.u1);
        w.write_u32(self.u2);
        w.write_u32(self.entries.len() as u32);
        for entry in &self.entries {
            w.write_struct(entry)?;
        }
        Ok(())
    }
}

/// Entry of the extended beat grid
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtendedBeatEntry {
    pub beat: u8,
    pub unknown: u8,
}

/// Extended beat grid (PQT2)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedBeatGrid {
    pub u1: u32,
    /// Observed as 0x01000002
    pub u2: u32,
    pub u3: u32,
    /// First and last beat of the grid, in PQTZ entry layout
    pub anchors: [BeatEntry; 2],
    pub u4: u32,
    pub u5: u32,
    pub u6: u32,
    pub entries: Vec<ExtendedBeatEntry>,
}

impl Default for ExtendedBeatGrid {
    fn default() -> Self {
        Self {
            u1: 0,
            u2: 0x0100_0002,
            u3: 0,
            anchors: [BeatEntry::default(); 2],
            u4: 0,
            u5: 0,
            u6: 0,
            entries: Vec::new(),
        }
    }
}

impl ExtendedBeatGrid {
    pub fn anchor_bpms(&self) -> [f64; 2] {
        [self.anchors[0].bpm(), self.anchors[1].bpm()]
    }

    pub(crate) fn decode(tag: &[u8], header: &TagHeader) -> Result<Self> {
        check_header_length(header, PQT2_HEADER_LEN)?;
        let mut r = tag_reader(tag);
        let u1 = r.read_u32()?;
        let u2 = r.read_u32()?;
        let u3 = r.read_u32()?;
        let anchors = [r.read_struct::<BeatEntry>()?, r.read_struct::<BeatEntry>()?];
        let len_entries = r.read_u32()? as usize;
        let u4 = r.read_u32()?;
        let u5 = r.read_u32()?;
        let u6 = r.read_u32()?;
        check_entry_bytes(header, len_entries, PQT2_ENTRY_LEN)?;

        let entries = (0..len_entries)
            .map(|_| r.read_struct::<ExtendedBeatEntry>())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            u1,
            u2,
            u3,
            anchors,
            u4,
            u5,
            u6,
            entries,
        })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_u32(self.u1);
        w.write_u32(self.u2);
        w.write_u32(self.u3);
        for anchor in &self.anchors {
            w.write_struct(anchor)?;
        }
        w.write_u32(self.entries.len() as u32);
        w.write_u32(self.u4);
        w.write_u32(self.u5);
        w.write_u32(self.u6);
        for entry in &self.entries {
            w.write_struct(entry)?;
        }
        Ok(())
    }
}
