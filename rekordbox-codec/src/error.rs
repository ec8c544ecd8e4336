//! Error types for rekordbox-codec

use thiserror::Error;

use crate::anlz::phrase::UnrecognizedPhrase;
use crate::setting::ChecksumMismatch;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A length field points past the end of the available bytes.
    #[error("Truncated input at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Bad magic: expected {expected:?}, found {found:?}")]
    BadMagic { expected: String, found: String },

    /// A recognized tag whose counts or lengths contradict each other.
    #[error("Malformed {fourcc} tag: {reason}")]
    MalformedTag { fourcc: String, reason: String },

    #[error(transparent)]
    UnrecognizedPhrase(#[from] UnrecognizedPhrase),

    #[error(transparent)]
    ChecksumMismatch(#[from] ChecksumMismatch),

    #[error("Malformed settings file: {0}")]
    MalformedSettings(String),

    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),

    #[error("Invalid setting {key}={value}")]
    InvalidSetting { key: String, value: String },

    #[error("Binary format error: {0}")]
    BinRw(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn malformed(fourcc: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Error::MalformedTag {
            fourcc: fourcc.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<binrw::Error> for Error {
    fn from(e: binrw::Error) -> Self {
        Error::BinRw(e.to_string())
    }
}
