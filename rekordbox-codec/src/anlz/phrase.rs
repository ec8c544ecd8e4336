//! Song-structure phrase decoding
//!
//! Mood and bank enumerations, the phrase label table and the XOR mask that
//! rekordbox applies to PSSI tags it exports to removable media.
//!
//! Reference: https://djl-analysis.deepsymmetry.org/rekordbox-export-analysis/anlz.html#song-structure-tag

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// First masked byte: everything after `len_entries`
pub const MASK_START: usize = 18;

/// Base XOR pattern. Each byte is offset by `len_entries` before use.
pub const MASK_PATTERN: [u8; 19] = [
    0xCB, 0xE1, 0xEE, 0xFA, 0xE5, 0xEE, 0xAD, 0xEE, 0xE9, 0xD2, 0xE9, 0xEB, 0xE1, 0xE9, 0xF3,
    0xE8, 0xE9, 0xF4, 0xE1,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    High,
    Mid,
    Low,
}

impl Mood {
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            1 => Some(Mood::High),
            2 => Some(Mood::Mid),
            3 => Some(Mood::Low),
            _ => None,
        }
    }

    pub fn to_raw(self) -> u16 {
        match self {
            Mood::High => 1,
            Mood::Mid => 2,
            Mood::Low => 3,
        }
    }
}

/// Lighting style bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bank {
    Default,
    Cool,
    Natural,
    Hot,
    Subtle,
    Warm,
    Vivid,
    Club1,
    Club2,
}

const BANKS: [Bank; 9] = [
    Bank::Default,
    Bank::Cool,
    Bank::Natural,
    Bank::Hot,
    Bank::Subtle,
    Bank::Warm,
    Bank::Vivid,
    Bank::Club1,
    Bank::Club2,
];

impl Bank {
    pub fn from_raw(raw: u8) -> Option<Self> {
        BANKS.get(raw as usize).copied()
    }

    pub fn to_raw(self) -> u8 {
        self as u8
    }
}

/// A mood or bank value outside the known ranges marks a masked tag.
pub fn is_garbled(mood: u16, bank: u8) -> bool {
    Mood::from_raw(mood).is_none() || Bank::from_raw(bank).is_none()
}

/// XOR the masked region of a PSSI tag in place. Applying it twice is a no-op.
pub fn apply_mask(tag: &mut [u8], len_entries: u16) {
    let offset = len_entries as u8;
    if let Some(masked) = tag.get_mut(MASK_START..) {
        for (i, byte) in masked.iter_mut().enumerate() {
            *byte ^= MASK_PATTERN[i % MASK_PATTERN.len()].wrapping_add(offset);
        }
    }
}

/// Copy of `tag` with the mask toggled
pub fn deobfuscate(tag: &[u8], len_entries: u16) -> Vec<u8> {
    let mut out = tag.to_vec();
    apply_mask(&mut out, len_entries);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LowPhrase {
    Intro,
    Verse1,
    Verse1b,
    Verse1c,
    Verse2,
    Verse2b,
    Verse2c,
    Bridge,
    Chorus,
    Outro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MidPhrase {
    Intro,
    Verse1,
    Verse2,
    Verse3,
    Verse4,
    Verse5,
    Verse6,
    Bridge,
    Chorus,
    Outro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighPhrase {
    Intro1,
    Intro2,
    Up1,
    Up2,
    Up3,
    Down,
    Chorus1,
    Chorus2,
    Outro1,
    Outro2,
}

/// Phrase label, vocabulary chosen by mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phrase {
    Low(LowPhrase),
    Mid(MidPhrase),
    High(HighPhrase),
}

impl Phrase {
    pub fn label(&self) -> &'static str {
        match self {
            Phrase::Low(p) => match p {
                LowPhrase::Intro => "Intro",
                LowPhrase::Verse1 => "Verse 1",
                LowPhrase::Verse1b => "Verse 1b",
                LowPhrase::Verse1c => "Verse 1c",
                LowPhrase::Verse2 => "Verse 2",
                LowPhrase::Verse2b => "Verse 2b",
                LowPhrase::Verse2c => "Verse 2c",
                LowPhrase::Bridge => "Bridge",
                LowPhrase::Chorus => "Chorus",
                LowPhrase::Outro => "Outro",
            },
            Phrase::Mid(p) => match p {
                MidPhrase::Intro => "Intro",
                MidPhrase::Verse1 => "Verse 1",
                MidPhrase::Verse2 => "Verse 2",
                MidPhrase::Verse3 => "Verse 3",
                MidPhrase::Verse4 => "Verse 4",
                MidPhrase::Verse5 => "Verse 5",
                MidPhrase::Verse6 => "Verse 6",
                MidPhrase::Bridge => "Bridge",
                MidPhrase::Chorus => "Chorus",
                MidPhrase::Outro => "Outro",
            },
            Phrase::High(p) => match p {
                HighPhrase::Intro1 => "Intro 1",
                HighPhrase::Intro2 => "Intro 2",
                HighPhrase::Up1 => "Up 1",
                HighPhrase::Up2 => "Up 2",
                HighPhrase::Up3 => "Up 3",
                HighPhrase::Down => "Down",
                HighPhrase::Chorus1 => "Chorus 1",
                HighPhrase::Chorus2 => "Chorus 2",
                HighPhrase::Outro1 => "Outro 1",
                HighPhrase::Outro2 => "Outro 2",
            },
        }
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind/flag combination with no label for its mood
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error("Unrecognized phrase kind {kind} for {mood:?} mood (k1={k1}, k2={k2}, k3={k3})")]
pub struct UnrecognizedPhrase {
    pub mood: Mood,
    pub kind: u16,
    pub k1: u8,
    pub k2: u8,
    pub k3: u8,
}

/// Look up the label of a phrase.
///
/// Only the high mood looks at the flags: `k1` picks between the numbered
/// intro, chorus and outro variants, `k2`/`k3` between the three "up" phrases.
pub fn resolve_phrase(
    mood: Mood,
    kind: u16,
    k1: u8,
    k2: u8,
    k3: u8,
) -> std::result::Result<Phrase, UnrecognizedPhrase> {
    let unrecognized = UnrecognizedPhrase {
        mood,
        kind,
        k1,
        k2,
        k3,
    };
    let phrase = match mood {
        Mood::Low => Phrase::Low(match kind {
            1 => LowPhrase::Intro,
            2 => LowPhrase::Verse1,
            3 => LowPhrase::Verse1b,
            4 => LowPhrase::Verse1c,
            5 => LowPhrase::Verse2,
            6 => LowPhrase::Verse2b,
            7 => LowPhrase::Verse2c,
            8 => LowPhrase::Bridge,
            9 => LowPhrase::Chorus,
            10 => LowPhrase::Outro,
            _ => return Err(unrecognized),
        }),
        Mood::Mid => Phrase::Mid(match kind {
            1 => MidPhrase::Intro,
            2 => MidPhrase::Verse1,
            3 => MidPhrase::Verse2,
            4 => MidPhrase::Verse3,
            5 => MidPhrase::Verse4,
            6 => MidPhrase::Verse5,
            7 => MidPhrase::Verse6,
            8 => MidPhrase::Bridge,
            9 => MidPhrase::Chorus,
            10 => MidPhrase::Outro,
            _ => return Err(unrecognized),
        }),
        Mood::High => {
            let first = k1 == 1;
            Phrase::High(match (kind, k2, k3) {
                (1, _, _) if first => HighPhrase::Intro1,
                (1, _, _) => HighPhrase::Intro2,
                (2, 0, 0) => HighPhrase::Up1,
                (2, 0, 1) => HighPhrase::Up2,
                (2, 1, 0) => HighPhrase::Up3,
                (3, _, _) => HighPhrase::Down,
                (5, _, _) if first => HighPhrase::Chorus1,
                (5, _, _) => HighPhrase::Chorus2,
                (6, _, _) if first => HighPhrase::Outro1,
                (6, _, _) => HighPhrase::Outro2,
                _ => return Err(unrecognized),
            })
        }
    };
    Ok(phrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_is_an_involution() {
        let original: Vec<u8> = (0..120u8).collect();
        for len_entries in [0u16, 5, 0x35, 300] {
            let masked = deobfuscate(&original, len_entries);
            assert_ne!(masked, original);
            assert_eq!(&masked[..MASK_START], &original[..MASK_START]);
            assert_eq!(deobfuscate(&masked, len_entries), original);
        }
    }

    #[test]
    fn test_mask_key_offset() {
        let zeros = vec![0u8; MASK_START + 20];
        let masked = deobfuscate(&zeros, 3);
        assert_eq!(masked[MASK_START], 0xCE);
        assert_eq!(masked[MASK_START + 18], 0xE4);
        // Pattern repeats after 19 bytes
        assert_eq!(masked[MASK_START + 19], 0xCE);

        // Offset wraps around 256
        let masked = deobfuscate(&zeros, 0x40);
        assert_eq!(masked[MASK_START], 0x0B);
    }

    #[test]
    fn test_mask_on_short_input() {
        let short = [1u8; 10];
        assert_eq!(deobfuscate(&short, 7), short.to_vec());
    }

    #[test]
    fn test_garble_detection() {
        assert!(!is_garbled(1, 0));
        assert!(!is_garbled(3, 8));
        assert!(is_garbled(0xFF, 0));
        assert!(is_garbled(0, 0));
        assert!(is_garbled(2, 9));
    }

    #[test]
    fn test_bank_values() {
        assert_eq!(Bank::from_raw(0), Some(Bank::Default));
        assert_eq!(Bank::from_raw(7), Some(Bank::Club1));
        assert_eq!(Bank::from_raw(8), Some(Bank::Club2));
        assert_eq!(Bank::from_raw(9), None);
        assert_eq!(Bank::Vivid.to_raw(), 6);
    }

    #[test]
    fn test_low_and_mid_tables() {
        assert_eq!(resolve_phrase(Mood::Low, 3, 0, 0, 0).unwrap().label(), "Verse 1b");
        assert_eq!(resolve_phrase(Mood::Low, 7, 0, 0, 0).unwrap().label(), "Verse 2c");
        assert_eq!(resolve_phrase(Mood::Low, 10, 1, 1, 1).unwrap().label(), "Outro");
        assert_eq!(resolve_phrase(Mood::Mid, 7, 0, 0, 0).unwrap().label(), "Verse 6");
        assert_eq!(resolve_phrase(Mood::Mid, 9, 0, 0, 0).unwrap().label(), "Chorus");
        assert!(resolve_phrase(Mood::Low, 0, 0, 0, 0).is_err());
        assert!(resolve_phrase(Mood::Mid, 11, 0, 0, 0).is_err());
    }

    #[test]
    fn test_high_mood_flags() {
        let high = |kind, k1, k2, k3| resolve_phrase(Mood::High, kind, k1, k2, k3);
        assert_eq!(high(1, 1, 0, 0).unwrap(), Phrase::High(HighPhrase::Intro1));
        assert_eq!(high(1, 0, 0, 0).unwrap(), Phrase::High(HighPhrase::Intro2));
        assert_eq!(high(2, 0, 0, 0).unwrap(), Phrase::High(HighPhrase::Up1));
        assert_eq!(high(2, 0, 0, 1).unwrap(), Phrase::High(HighPhrase::Up2));
        assert_eq!(high(2, 0, 1, 0).unwrap(), Phrase::High(HighPhrase::Up3));
        assert_eq!(high(3, 0, 0, 0).unwrap(), Phrase::High(HighPhrase::Down));
        assert_eq!(high(5, 1, 0, 0).unwrap(), Phrase::High(HighPhrase::Chorus1));
        assert_eq!(high(6, 0, 0, 0).unwrap().to_string(), "Outro 2");
    }

    #[test]
    fn test_unrecognized_keeps_raw_values() {
        let err = resolve_phrase(Mood::High, 2, 0, 1, 1).unwrap_err();
        assert_eq!(err.kind, 2);
        assert_eq!((err.k2, err.k3), (1, 1));
        assert_eq!(resolve_phrase(Mood::High, 4, 0, 0, 0).unwrap_err().kind, 4);
    }
}
