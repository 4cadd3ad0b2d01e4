use serde::Serialize;

use crate::line::{LineKind, SubtitleLine};
use crate::session::store::SessionDocument;

/// Projection derivation module
/// One pure function turns the session document into the two
/// audience-specific payloads. Every mutation path goes through it, so the
/// viewer-side redaction of direction lines can never be skipped by one
/// call site.

/// Full document view pushed to authoring peers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorView {
    /// The whole line list
    pub lines: Vec<SubtitleLine>,
    /// Current line pointer
    pub current_index: usize,
    /// Whether passive viewers see anything
    pub display_enabled: bool,
}

/// Reduced view pushed to passive viewers: the single active line, with the
/// body withheld for direction lines, or nothing at all while display is
/// disabled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewerView {
    /// Display is disabled; viewers show nothing
    Hidden,
    /// Display is enabled but the session has no lines yet
    Idle,
    /// The active line
    Active {
        /// Index of the active line
        index: usize,
        /// Line kind marker
        #[serde(rename = "type")]
        kind: LineKind,
        /// Body text; omitted for direction lines
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

/// Both projections of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Projections {
    pub author: AuthorView,
    pub viewer: ViewerView,
}

/// Derive both audience projections from the current document snapshot.
pub fn project(doc: &SessionDocument) -> Projections {
    let author = AuthorView {
        lines: doc.lines.clone(),
        current_index: doc.current_index,
        display_enabled: doc.display_enabled,
    };
    let viewer = if !doc.display_enabled {
        ViewerView::Hidden
    } else {
        match doc.lines.get(doc.current_index) {
            None => ViewerView::Idle,
            Some(line) => ViewerView::Active {
                index: doc.current_index,
                kind: line.kind,
                // Direction bodies are production metadata; viewers only
                // get the marker
                text: match line.kind {
                    LineKind::Dialogue => Some(line.text.clone()),
                    LineKind::Direction => None,
                },
            },
        }
    };
    Projections { author, viewer }
}
