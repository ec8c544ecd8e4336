//! Fixed-size payloads of the four settings files
//!
//! Field order follows the bytes on disk. Fields named `u*` are not
//! understood and are carried through unchanged.

use binrw::binrw;
use serde::{Deserialize, Serialize};

use super::values::*;
use crate::error::{Error, Result};

const MAGIC: [u8; 4] = [0x78, 0x56, 0x34, 0x12];

/// `get`/`set` by field name for payloads made of [`Setting`] fields
macro_rules! named_settings {
    ($payload:ident { $($field:ident),+ $(,)? }) => {
        impl $payload {
            pub const KEYS: &'static [&'static str] = &[$(stringify!($field)),+];

            pub fn get(&self, key: &str) -> Option<String> {
                $(
                    if key == stringify!($field) {
                        return Some(self.$field.label());
                    }
                )+
                None
            }

            pub fn set(&mut self, key: &str, label: &str) -> Result<()> {
                $(
                    if key == stringify!($field) {
                        self.$field = Setting::from_label(label).ok_or_else(|| invalid(key, label))?;
                        return Ok(());
                    }
                )+
                Err(invalid(key, label))
            }
        }
    };
}

fn invalid(key: &str, value: &str) -> Error {
    Error::InvalidSetting {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// MYSETTING.DAT: player preferences, 40 bytes
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MySetting {
    pub u1: [u8; 8],
    pub on_air_display: Setting<OnOff>,
    pub lcd_brightness: Setting<LcdBrightness>,
    pub quantize: Setting<OnOff>,
    pub auto_cue_level: Setting<AutoCueLevel>,
    pub language: Setting<Language>,
    pub u2: u8,
    pub jog_ring_brightness: Setting<Illumination>,
    pub jog_ring_indicator: Setting<OnOff>,
    pub slip_flashing: Setting<OnOff>,
    pub u3: [u8; 3],
    pub disc_slot_illumination: Setting<Illumination>,
    pub eject_lock: Setting<Lock>,
    pub sync: Setting<OnOff>,
    pub play_mode: Setting<PlayMode>,
    pub quantize_beat_value: Setting<QuantizeBeatValue>,
    pub hotcue_autoload: Setting<HotCueAutoLoad>,
    pub hotcue_color: Setting<OnOff>,
    pub u4: u16,
    pub needle_lock: Setting<Lock>,
    pub u5: u16,
    pub time_mode: Setting<TimeMode>,
    pub jog_mode: Setting<JogMode>,
    pub auto_cue: Setting<OnOff>,
    pub master_tempo: Setting<OnOff>,
    pub tempo_range: Setting<TempoRange>,
    pub phase_meter: Setting<PhaseMeter>,
    pub u6: u16,
}

impl Default for MySetting {
    fn default() -> Self {
        Self {
            u1: [MAGIC[0], MAGIC[1], MAGIC[2], MAGIC[3], 2, 0, 0, 0],
            on_air_display: OnOff::On.into(),
            lcd_brightness: LcdBrightness::Three.into(),
            quantize: OnOff::On.into(),
            auto_cue_level: AutoCueLevel::Memory.into(),
            language: Language::English.into(),
            u2: 0x01,
            jog_ring_brightness: Illumination::Bright.into(),
            jog_ring_indicator: OnOff::On.into(),
            slip_flashing: OnOff::On.into(),
            u3: [0x01; 3],
            disc_slot_illumination: Illumination::Bright.into(),
            eject_lock: Lock::Unlock.into(),
            sync: OnOff::Off.into(),
            play_mode: PlayMode::Single.into(),
            quantize_beat_value: QuantizeBeatValue::One.into(),
            hotcue_autoload: HotCueAutoLoad::On.into(),
            hotcue_color: OnOff::Off.into(),
            u4: 0,
            needle_lock: Lock::Lock.into(),
            u5: 0,
            time_mode: TimeMode::Remain.into(),
            jog_mode: JogMode::Vinyl.into(),
            auto_cue: OnOff::On.into(),
            master_tempo: OnOff::Off.into(),
            tempo_range: TempoRange::Ten.into(),
            phase_meter: PhaseMeter::Type1.into(),
            u6: 0,
        }
    }
}

named_settings!(MySetting {
    on_air_display,
    lcd_brightness,
    quantize,
    auto_cue_level,
    language,
    jog_ring_brightness,
    jog_ring_indicator,
    slip_flashing,
    disc_slot_illumination,
    eject_lock,
    sync,
    play_mode,
    quantize_beat_value,
    hotcue_autoload,
    hotcue_color,
    needle_lock,
    time_mode,
    jog_mode,
    auto_cue,
    master_tempo,
    tempo_range,
    phase_meter,
});

/// MYSETTING2.DAT: more player preferences, 40 bytes
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MySetting2 {
    pub vinyl_speed_adjust: Setting<VinylSpeedAdjust>,
    pub jog_display_mode: Setting<JogDisplayMode>,
    pub pad_button_brightness: Setting<PadButtonBrightness>,
    pub jog_lcd_brightness: Setting<JogLcdBrightness>,
    pub waveform_divisions: Setting<WaveformDivisions>,
    pub u1: [u8; 5],
    pub waveform: Setting<WaveformDisplay>,
    pub u2: u8,
    pub beat_jump_beat_value: Setting<BeatJumpBeatValue>,
    pub u3: [u8; 27],
}

impl Default for MySetting2 {
    fn default() -> Self {
        Self {
            vinyl_speed_adjust: VinylSpeedAdjust::Touch.into(),
            jog_display_mode: JogDisplayMode::Auto.into(),
            pad_button_brightness: PadButtonBrightness::Three.into(),
            jog_lcd_brightness: JogLcdBrightness::Three.into(),
            waveform_divisions: WaveformDivisions::Phrase.into(),
            u1: [0; 5],
            waveform: WaveformDisplay::Waveform.into(),
            u2: 0x81,
            beat_jump_beat_value: BeatJumpBeatValue::Sixteen.into(),
            u3: [0; 27],
        }
    }
}

named_settings!(MySetting2 {
    vinyl_speed_adjust,
    jog_display_mode,
    pad_button_brightness,
    jog_lcd_brightness,
    waveform_divisions,
    waveform,
    beat_jump_beat_value,
});

/// DJMMYSETTING.DAT: mixer preferences, 52 bytes
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DjmMySetting {
    pub u1: [u8; 12],
    pub channel_fader_curve: Setting<ChannelFaderCurve>,
    pub cross_fader_curve: Setting<CrossfaderCurve>,
    pub headphones_pre_eq: Setting<HeadphonesPreEq>,
    pub headphones_mono_split: Setting<HeadphonesMonoSplit>,
    pub beat_fx_quantize: Setting<OnOff>,
    pub mic_low_cut: Setting<OnOff>,
    pub talk_over_mode: Setting<TalkOverMode>,
    pub talk_over_level: Setting<TalkOverLevel>,
    pub midi_channel: Setting<MidiChannel>,
    pub midi_button_type: Setting<MidiButtonType>,
    pub display_brightness: Setting<MixerDisplayBrightness>,
    pub indicator_brightness: Setting<MixerIndicatorBrightness>,
    pub channel_fader_curve_long: Setting<ChannelFaderCurveLong>,
    pub u2: [u8; 27],
}

impl Default for DjmMySetting {
    fn default() -> Self {
        Self {
            u1: [
                MAGIC[0], MAGIC[1], MAGIC[2], MAGIC[3], 1, 0, 0, 0, 0x20, 0, 0, 0,
            ],
            channel_fader_curve: ChannelFaderCurve::Linear.into(),
            cross_fader_curve: CrossfaderCurve::FastCut.into(),
            headphones_pre_eq: HeadphonesPreEq::PostEq.into(),
            headphones_mono_split: HeadphonesMonoSplit::Stereo.into(),
            beat_fx_quantize: OnOff::On.into(),
            mic_low_cut: OnOff::On.into(),
            talk_over_mode: TalkOverMode::Advanced.into(),
            talk_over_level: TalkOverLevel::Minus18Db.into(),
            midi_channel: MidiChannel::One.into(),
            midi_button_type: MidiButtonType::Toggle.into(),
            display_brightness: MixerDisplayBrightness::Five.into(),
            indicator_brightness: MixerIndicatorBrightness::Three.into(),
            channel_fader_curve_long: ChannelFaderCurveLong::Exponential.into(),
            u2: [0; 27],
        }
    }
}

named_settings!(DjmMySetting {
    channel_fader_curve,
    cross_fader_curve,
    headphones_pre_eq,
    headphones_mono_split,
    beat_fx_quantize,
    mic_low_cut,
    talk_over_mode,
    talk_over_level,
    midi_channel,
    midi_button_type,
    display_brightness,
    indicator_brightness,
    channel_fader_curve_long,
});

/// DEVSETTING.DAT, 32 bytes. Only the leading words are known.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevSetting {
    pub u1: [u8; 8],
    pub entries: [u8; 24],
}

impl Default for DevSetting {
    /// Values written by rekordbox 6 with all device flags enabled
    fn default() -> Self {
        let mut entries = [0u8; 24];
        entries[..6].fill(0x01);
        Self {
            u1: [MAGIC[0], MAGIC[1], MAGIC[2], MAGIC[3], 1, 0, 0, 0],
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{ByteReader, ByteWriter};

    fn encode<T>(value: &T) -> Vec<u8>
    where
        T: for<'b> binrw::BinWrite<Args<'b> = ()>,
    {
        let mut w = ByteWriter::little_endian();
        w.write_struct(value).unwrap();
        w.into_inner()
    }

    #[test]
    fn test_payload_sizes() {
        assert_eq!(encode(&MySetting::default()).len(), 40);
        assert_eq!(encode(&MySetting2::default()).len(), 40);
        assert_eq!(encode(&DjmMySetting::default()).len(), 52);
        assert_eq!(encode(&DevSetting::default()).len(), 32);
    }

    #[test]
    fn test_mysetting_field_offsets() {
        let bytes = encode(&MySetting::default());
        assert_eq!(&bytes[..4], &MAGIC);
        assert_eq!(bytes[10], 0x81); // quantize on
        assert_eq!(bytes[11], 0x88); // auto cue level memory
        assert_eq!(bytes[25], 0x81); // hot cue autoload on
        assert_eq!(bytes[26], 0x80); // hot cue color off
        assert_eq!(bytes[29], 0x81); // needle lock
        assert_eq!(bytes[37], 0x80); // phase meter type1
        assert_eq!(&bytes[38..], &[0, 0]);
    }

    #[test]
    fn test_unknown_bytes_survive() {
        let mut bytes = encode(&MySetting2::default());
        bytes[0] = 0xC0;
        bytes[7] = 0x42;
        let decoded: MySetting2 = ByteReader::little_endian(&bytes).read_struct().unwrap();
        assert_eq!(decoded.vinyl_speed_adjust, Setting::RawUnknown(0xC0));
        assert_eq!(decoded.u1[2], 0x42);
        assert_eq!(encode(&decoded), bytes);
    }

    #[test]
    fn test_named_access() {
        let mut djm = DjmMySetting::default();
        assert_eq!(djm.get("talk_over_level").as_deref(), Some("minus_18db"));
        djm.set("talk_over_level", "minus_6db").unwrap();
        assert_eq!(djm.talk_over_level, Setting::Known(TalkOverLevel::Minus6Db));

        assert!(matches!(
            djm.set("talk_over_level", "loud"),
            Err(Error::InvalidSetting { .. })
        ));
        assert!(matches!(djm.set("u1", "off"), Err(Error::InvalidSetting { .. })));
        assert_eq!(djm.get("u2"), None);
        assert_eq!(DjmMySetting::KEYS.len(), 13);
        assert_eq!(MySetting::KEYS.len(), 22);
    }
}
