//! Decode policy for analysis files

use serde::{Deserialize, Serialize};

use crate::anlz::tags::TagKind;

/// Options for [`AnalysisFile::parse_with`](crate::anlz::AnalysisFile::parse_with)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Fail on the first tag that does not decode instead of keeping it
    /// as raw bytes and recording a [`TagIssue`](crate::anlz::TagIssue)
    pub strict: bool,
    /// Kinds kept as raw bytes without decoding
    pub opaque_kinds: Vec<TagKind>,
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn with_opaque(mut self, kind: TagKind) -> Self {
        if !self.opaque_kinds.contains(&kind) {
            self.opaque_kinds.push(kind);
        }
        self
    }

    pub(crate) fn is_opaque(&self, kind: TagKind) -> bool {
        self.opaque_kinds.contains(&kind)
    }
}
