//! Enumerated values stored as single bytes in the settings payloads
//!
//! Every documented value of a field is `0x80 + n`. Bytes outside a field's
//! table are kept as [`Setting::RawUnknown`] and written back unchanged.

use binrw::io::{Read, Seek, Write};
use binrw::{BinRead, BinResult, BinWrite, Endian};
use serde::{Deserialize, Serialize};

/// A byte-sized enumerated setting value
pub trait SettingValue: Copy + Sized + 'static {
    /// Every documented value, in byte order
    const ALL: &'static [Self];

    fn to_raw(self) -> u8;

    fn label(self) -> &'static str;

    fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.to_raw() == raw)
    }

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.label() == label)
    }
}

/// A decoded setting byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Setting<T> {
    Known(T),
    RawUnknown(u8),
}

impl<T: SettingValue> Setting<T> {
    pub fn from_raw(raw: u8) -> Self {
        T::from_raw(raw).map_or(Setting::RawUnknown(raw), Setting::Known)
    }

    pub fn to_raw(self) -> u8 {
        match self {
            Setting::Known(value) => value.to_raw(),
            Setting::RawUnknown(raw) => raw,
        }
    }

    /// Label of a known value, or the raw byte as `0x..`
    pub fn label(self) -> String {
        match self {
            Setting::Known(value) => value.label().to_string(),
            Setting::RawUnknown(raw) => format!("{:#04x}", raw),
        }
    }

    /// Parse a label, or a `0x..` byte as produced by [`Setting::label`]
    pub fn from_label(label: &str) -> Option<Self> {
        if let Some(value) = T::from_label(label) {
            return Some(Setting::Known(value));
        }
        let hex = label.strip_prefix("0x")?;
        u8::from_str_radix(hex, 16).ok().map(Self::from_raw)
    }

    pub fn known(self) -> Option<T> {
        match self {
            Setting::Known(value) => Some(value),
            Setting::RawUnknown(_) => None,
        }
    }
}

impl<T: SettingValue> From<T> for Setting<T> {
    fn from(value: T) -> Self {
        Setting::Known(value)
    }
}

impl<T: SettingValue> BinRead for Setting<T> {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let raw = u8::read_options(reader, endian, ())?;
        Ok(Self::from_raw(raw))
    }
}

impl<T: SettingValue> BinWrite for Setting<T> {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        self.to_raw().write_options(writer, endian, ())
    }
}

macro_rules! setting_values {
    ($(
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident = $raw:literal => $label:literal),+ $(,)?
        }
    )+) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl SettingValue for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn to_raw(self) -> u8 {
                match self {
                    $(Self::$variant => $raw),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }
    )+};
}

// Shared by several fields of different files
setting_values! {
    OnOff {
        Off = 0x80 => "off",
        On = 0x81 => "on",
    }

    Lock {
        Unlock = 0x80 => "unlock",
        Lock = 0x81 => "lock",
    }

    /// Jog ring and disc slot lighting
    Illumination {
        Off = 0x80 => "off",
        Dark = 0x81 => "dark",
        Bright = 0x82 => "bright",
    }
}

// MYSETTING.DAT
setting_values! {
    LcdBrightness {
        One = 0x81 => "one",
        Two = 0x82 => "two",
        Three = 0x83 => "three",
        Four = 0x84 => "four",
        Five = 0x85 => "five",
    }

    AutoCueLevel {
        Minus36Db = 0x80 => "minus_36db",
        Minus42Db = 0x81 => "minus_42db",
        Minus48Db = 0x82 => "minus_48db",
        Minus54Db = 0x83 => "minus_54db",
        Minus60Db = 0x84 => "minus_60db",
        Minus66Db = 0x85 => "minus_66db",
        Minus72Db = 0x86 => "minus_72db",
        Minus78Db = 0x87 => "minus_78db",
        Memory = 0x88 => "memory",
    }

    Language {
        English = 0x81 => "english",
        French = 0x82 => "french",
        German = 0x83 => "german",
        Italian = 0x84 => "italian",
        Dutch = 0x85 => "dutch",
        Spanish = 0x86 => "spanish",
        Russian = 0x87 => "russian",
        Korean = 0x88 => "korean",
        ChineseSimplified = 0x89 => "chinese_simplified",
        ChineseTraditional = 0x8A => "chinese_traditional",
        Japanese = 0x8B => "japanese",
        Portuguese = 0x8C => "portuguese",
        Swedish = 0x8D => "swedish",
        Czech = 0x8E => "czech",
        Hungarian = 0x8F => "hungarian",
        Danish = 0x90 => "danish",
        Greek = 0x91 => "greek",
        Turkish = 0x92 => "turkish",
    }

    PlayMode {
        Continue = 0x80 => "continue",
        Single = 0x81 => "single",
    }

    QuantizeBeatValue {
        One = 0x80 => "one",
        Half = 0x81 => "half",
        Quarter = 0x82 => "quarter",
        Eighth = 0x83 => "eighth",
    }

    HotCueAutoLoad {
        Off = 0x80 => "off",
        On = 0x81 => "on",
        Rekordbox = 0x82 => "rekordbox",
    }

    TimeMode {
        Elapsed = 0x80 => "elapsed",
        Remain = 0x81 => "remain",
    }

    JogMode {
        Cdj = 0x80 => "cdj",
        Vinyl = 0x81 => "vinyl",
    }

    TempoRange {
        Six = 0x80 => "six",
        Ten = 0x81 => "ten",
        Sixteen = 0x82 => "sixteen",
        Wide = 0x83 => "wide",
    }

    PhaseMeter {
        Type1 = 0x80 => "type1",
        Type2 = 0x81 => "type2",
    }
}

// MYSETTING2.DAT
setting_values! {
    VinylSpeedAdjust {
        TouchRelease = 0x80 => "touch_release",
        Touch = 0x81 => "touch",
        Release = 0x82 => "release",
    }

    JogDisplayMode {
        Auto = 0x80 => "auto",
        Info = 0x81 => "info",
        Simple = 0x82 => "simple",
        Artwork = 0x83 => "artwork",
    }

    PadButtonBrightness {
        One = 0x81 => "one",
        Two = 0x82 => "two",
        Three = 0x83 => "three",
        Four = 0x84 => "four",
    }

    JogLcdBrightness {
        One = 0x81 => "one",
        Two = 0x82 => "two",
        Three = 0x83 => "three",
        Four = 0x84 => "four",
        Five = 0x85 => "five",
    }

    WaveformDivisions {
        TimeScale = 0x80 => "time_scale",
        Phrase = 0x81 => "phrase",
    }

    WaveformDisplay {
        Waveform = 0x80 => "waveform",
        PhaseMeter = 0x81 => "phase_meter",
    }

    BeatJumpBeatValue {
        Half = 0x80 => "half",
        One = 0x81 => "one",
        Two = 0x82 => "two",
        Four = 0x83 => "four",
        Eight = 0x84 => "eight",
        Sixteen = 0x85 => "sixteen",
        ThirtyTwo = 0x86 => "thirtytwo",
        SixtyFour = 0x87 => "sixtyfour",
    }
}

// DJMMYSETTING.DAT
setting_values! {
    ChannelFaderCurve {
        SteepTop = 0x80 => "steep_top",
        Linear = 0x81 => "linear",
        SteepBottom = 0x82 => "steep_bottom",
    }

    CrossfaderCurve {
        Constant = 0x80 => "constant",
        SlowCut = 0x81 => "slow_cut",
        FastCut = 0x82 => "fast_cut",
    }

    HeadphonesPreEq {
        PostEq = 0x80 => "post_eq",
        PreEq = 0x81 => "pre_eq",
    }

    HeadphonesMonoSplit {
        Stereo = 0x80 => "stereo",
        MonoSplit = 0x81 => "mono_split",
    }

    TalkOverMode {
        Advanced = 0x80 => "advanced",
        Normal = 0x81 => "normal",
    }

    TalkOverLevel {
        Minus24Db = 0x80 => "minus_24db",
        Minus18Db = 0x81 => "minus_18db",
        Minus12Db = 0x82 => "minus_12db",
        Minus6Db = 0x83 => "minus_6db",
    }

    MidiChannel {
        One = 0x80 => "one",
        Two = 0x81 => "two",
        Three = 0x82 => "three",
        Four = 0x83 => "four",
        Five = 0x84 => "five",
        Six = 0x85 => "six",
        Seven = 0x86 => "seven",
        Eight = 0x87 => "eight",
        Nine = 0x88 => "nine",
        Ten = 0x89 => "ten",
        Eleven = 0x8A => "eleven",
        Twelve = 0x8B => "twelve",
        Thirteen = 0x8C => "thirteen",
        Fourteen = 0x8D => "fourteen",
        Fifteen = 0x8E => "fifteen",
        Sixteen = 0x8F => "sixteen",
    }

    MidiButtonType {
        Toggle = 0x80 => "toggle",
        Trigger = 0x81 => "trigger",
    }

    MixerDisplayBrightness {
        White = 0x80 => "white",
        One = 0x81 => "one",
        Two = 0x82 => "two",
        Three = 0x83 => "three",
        Four = 0x84 => "four",
        Five = 0x85 => "five",
    }

    MixerIndicatorBrightness {
        One = 0x80 => "one",
        Two = 0x81 => "two",
        Three = 0x82 => "three",
    }

    ChannelFaderCurveLong {
        Exponential = 0x80 => "exponential",
        Smooth = 0x81 => "smooth",
        Linear = 0x82 => "linear",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_bytes() {
        assert_eq!(Setting::<OnOff>::from_raw(0x81), Setting::Known(OnOff::On));
        assert_eq!(Setting::<OnOff>::from_raw(0x82), Setting::RawUnknown(0x82));
        assert_eq!(Setting::<OnOff>::RawUnknown(0x82).to_raw(), 0x82);
        // Tables starting at 0x81 leave 0x80 undocumented
        assert_eq!(Setting::<LcdBrightness>::from_raw(0x80), Setting::RawUnknown(0x80));
        assert_eq!(Setting::<Language>::from_raw(0x92), Setting::Known(Language::Turkish));
    }

    #[test]
    fn test_tables_are_contiguous() {
        fn check<T: SettingValue>() {
            let first = T::ALL[0].to_raw();
            for (n, value) in T::ALL.iter().enumerate() {
                assert_eq!(value.to_raw(), first + n as u8);
                assert_eq!(T::from_label(value.label()).map(|v| v.to_raw()), Some(value.to_raw()));
            }
        }
        check::<AutoCueLevel>();
        check::<Language>();
        check::<BeatJumpBeatValue>();
        check::<MidiChannel>();
        check::<MixerDisplayBrightness>();
    }

    #[test]
    fn test_labels() {
        assert_eq!(Setting::Known(PlayMode::Continue).label(), "continue");
        assert_eq!(Setting::<PlayMode>::RawUnknown(0x9a).label(), "0x9a");
        assert_eq!(Setting::<PlayMode>::from_label("single"), Some(Setting::Known(PlayMode::Single)));
        assert_eq!(Setting::<PlayMode>::from_label("0x9a"), Some(Setting::RawUnknown(0x9a)));
        assert_eq!(Setting::<PlayMode>::from_label("0x80"), Some(Setting::Known(PlayMode::Continue)));
        assert_eq!(Setting::<PlayMode>::from_label("shuffle"), None);
    }

    #[test]
    fn test_binrw_byte() {
        use binrw::io::Cursor;

        let mut cursor = Cursor::new(vec![0x83u8, 0x90]);
        let level = Setting::<TalkOverLevel>::read_le(&mut cursor).unwrap();
        let other = Setting::<TalkOverLevel>::read_le(&mut cursor).unwrap();
        assert_eq!(level.known(), Some(TalkOverLevel::Minus6Db));
        assert_eq!(other, Setting::RawUnknown(0x90));

        let mut out = Cursor::new(Vec::new());
        level.write_le(&mut out).unwrap();
        other.write_le(&mut out).unwrap();
        assert_eq!(out.into_inner(), vec![0x83, 0x90]);
    }
}
