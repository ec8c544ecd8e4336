//! rekordbox-codec: Pioneer DJ analysis and settings file codecs
//!
//! This crate provides binary read/write support for:
//! - ANLZ files (.DAT, .EXT, .2EX) - big-endian tagged containers
//! - MYSETTING.DAT, MYSETTING2.DAT, DJMMYSETTING.DAT, DEVSETTING.DAT - little-endian
//!
//! Unmodified input round-trips byte for byte, including tags and fields
//! that are not understood.
//!
//! Based on Deep Symmetry's reverse engineering and rekordcrate's structures.

pub mod anlz;
pub mod checksum;
pub mod config;
pub mod cursor;
pub mod error;
pub mod setting;

pub use anlz::tags::{Tag, TagBody, TagKind};
pub use anlz::{AnalysisFile, TagIssue};
pub use config::ParseOptions;
pub use error::{Error, Result};
pub use setting::{ChecksumMismatch, SettingsFile, SettingsKind};
