use serde::{Deserialize, Serialize};
use std::fmt;

/// Subtitle line model
/// A subtitle line is a single displayable unit: the text plus a type tag
/// that decides whether passive viewers may see the body.

/// The two kinds of subtitle line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Spoken text, shown to everyone
    Dialogue,
    /// Staging/production metadata, body hidden from passive viewers
    Direction,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineKind::Dialogue => write!(f, "dialogue"),
            LineKind::Direction => write!(f, "direction"),
        }
    }
}

/// One typed subtitle line.
///
/// Invariant: `text` never contains raw newline or other control
/// characters. The constructor enforces this so no call site can smuggle a
/// line break into a single display line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleLine {
    /// Display text
    pub text: String,
    /// Line kind
    #[serde(rename = "type")]
    pub kind: LineKind,
}

impl SubtitleLine {
    /// Create a line, replacing any control characters with spaces and
    /// trimming the result.
    pub fn new(text: impl AsRef<str>, kind: LineKind) -> Self {
        let sanitized: String = text
            .as_ref()
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        SubtitleLine {
            text: sanitized.trim().to_string(),
            kind,
        }
    }

    /// Convenience constructor for dialogue
    pub fn dialogue(text: impl AsRef<str>) -> Self {
        Self::new(text, LineKind::Dialogue)
    }

    /// Convenience constructor for direction
    pub fn direction(text: impl AsRef<str>) -> Self {
        Self::new(text, LineKind::Direction)
    }

    /// Character count of the display text
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
