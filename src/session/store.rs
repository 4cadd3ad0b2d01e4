use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::classifier::Classifier;
use crate::errors::SessionError;
use crate::line::{LineKind, SubtitleLine};
use crate::postprocess::{postprocess, PostProcessOptions};
use crate::session::broadcast::SessionHub;
use crate::session::projection::{project, AuthorView, ViewerView};

/// Session store module
/// The single source of truth for per-performance documents. Sessions are
/// created on first reference to an id and live until process restart.
/// Mutations on one session are serialized behind its lock; sessions are
/// fully independent of each other. Every accepted mutation re-clamps the
/// current pointer and pushes fresh projections through the hub.

/// One performance session's mutable document.
#[derive(Debug, Clone)]
pub struct SessionDocument {
    /// Session id
    pub id: String,
    /// Authoritative ordered line list
    pub lines: Vec<SubtitleLine>,
    /// Current line pointer, always within `[0, len-1]` (0 when empty)
    pub current_index: usize,
    /// Whether passive viewers see anything
    pub display_enabled: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Serializable snapshot of a session, the shape shells ship to peers at
/// join time and accept back for bulk replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub lines: Vec<SubtitleLine>,
    pub current_index: usize,
    pub display_enabled: bool,
}

struct SessionHandle {
    doc: Mutex<SessionDocument>,
    hub: SessionHub,
}

/// Store of all live sessions, keyed by session id.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
    classifier: Classifier,
    max_line_chars: usize,
}

impl SessionStore {
    /// Create a store. The classifier and line budget are used to
    /// re-normalize manually authored content on edits and bulk replace.
    pub fn new(classifier: Classifier, max_line_chars: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            classifier,
            max_line_chars,
        }
    }

    /// Get or create the handle for a session id.
    fn handle(&self, id: &str) -> Arc<SessionHandle> {
        if let Some(handle) = self.sessions.read().get(id) {
            return Arc::clone(handle);
        }
        let mut sessions = self.sessions.write();
        Arc::clone(sessions.entry(id.to_string()).or_insert_with(|| {
            debug!("creating session {}", id);
            Arc::new(SessionHandle {
                doc: Mutex::new(SessionDocument {
                    id: id.to_string(),
                    lines: Vec::new(),
                    current_index: 0,
                    display_enabled: true,
                    created_at: Utc::now(),
                }),
                hub: SessionHub::new(),
            })
        }))
    }

    /// Apply one mutation under the session's lock, then re-clamp the
    /// pointer and push projections. All mutation entry points funnel
    /// through here so the broadcast discipline cannot be skipped.
    fn mutate(&self, id: &str, apply: impl FnOnce(&mut SessionDocument)) {
        let handle = self.handle(id);
        let mut doc = handle.doc.lock();
        apply(&mut doc);
        doc.current_index = clamp_index(doc.current_index, doc.lines.len());
        handle.hub.publish(project(&doc));
    }

    fn edit_options(&self) -> PostProcessOptions {
        PostProcessOptions {
            max_line_chars: self.max_line_chars,
            // Manually authored blank lines are intentional placeholders
            preserve_empty: true,
        }
    }

    /// Synchronous snapshot read. Unknown ids are not created here.
    pub fn snapshot(&self, id: &str) -> Result<SessionSnapshot, SessionError> {
        let sessions = self.sessions.read();
        let handle = sessions
            .get(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        let doc = handle.doc.lock();
        Ok(SessionSnapshot {
            lines: doc.lines.clone(),
            current_index: doc.current_index,
            display_enabled: doc.display_enabled,
        })
    }

    /// Whether a session already exists
    pub fn contains(&self, id: &str) -> bool {
        self.sessions.read().contains_key(id)
    }

    /// Join a session's authoring room
    pub fn join_authors(&self, id: &str) -> broadcast::Receiver<AuthorView> {
        self.handle(id).hub.join_authors()
    }

    /// Join a session's viewer room
    pub fn join_viewers(&self, id: &str) -> broadcast::Receiver<ViewerView> {
        self.handle(id).hub.join_viewers()
    }

    /// Commit a completed pipeline run, replacing the whole line list.
    /// Lines arrive already normalized by the segmenter.
    pub fn commit_lines(&self, id: &str, lines: Vec<SubtitleLine>) {
        self.mutate(id, |doc| {
            doc.lines = lines;
        });
    }

    /// Replace the whole line list with externally authored content,
    /// re-normalizing it and preserving intentional blank lines.
    pub fn replace_all(&self, id: &str, lines: Vec<SubtitleLine>) {
        let normalized = postprocess(lines, &self.classifier, &self.edit_options());
        self.mutate(id, |doc| {
            doc.lines = normalized;
        });
    }

    /// Update one line's text and kind. The edit is re-normalized, so an
    /// over-long replacement may expand into several lines in place.
    pub fn update_line(&self, id: &str, index: usize, text: &str, kind: LineKind) {
        let normalized = postprocess(
            vec![SubtitleLine::new(text, kind)],
            &self.classifier,
            &self.edit_options(),
        );
        self.mutate(id, |doc| {
            if index >= doc.lines.len() {
                debug!("update_line index {} out of range, ignoring", index);
                return;
            }
            doc.lines.splice(index..=index, normalized);
        });
    }

    /// Split one line into two at a character offset; both halves keep the
    /// original kind.
    pub fn split_line(&self, id: &str, index: usize, offset: usize) {
        self.mutate(id, |doc| {
            let Some(line) = doc.lines.get(index) else {
                debug!("split_line index {} out of range, ignoring", index);
                return;
            };
            let glyphs: Vec<char> = line.text.chars().collect();
            let at = offset.min(glyphs.len());
            let head: String = glyphs[..at].iter().collect();
            let tail: String = glyphs[at..].iter().collect();
            let kind = line.kind;
            doc.lines.splice(
                index..=index,
                [SubtitleLine::new(head, kind), SubtitleLine::new(tail, kind)],
            );
        });
    }

    /// Insert a blank dialogue line after the given index.
    pub fn insert_blank_after(&self, id: &str, index: usize) {
        self.mutate(id, |doc| {
            if index >= doc.lines.len() {
                debug!("insert_blank_after index {} out of range, ignoring", index);
                return;
            }
            doc.lines.insert(index + 1, SubtitleLine::dialogue(""));
        });
    }

    /// Delete one line.
    pub fn delete_line(&self, id: &str, index: usize) {
        self.mutate(id, |doc| {
            if index >= doc.lines.len() {
                debug!("delete_line index {} out of range, ignoring", index);
                return;
            }
            doc.lines.remove(index);
        });
    }

    /// Move the current line pointer. Out-of-range targets are ignored,
    /// tolerating racing edits from concurrent authors.
    pub fn set_current_index(&self, id: &str, index: usize) {
        self.mutate(id, |doc| {
            if doc.lines.is_empty() || index < doc.lines.len() {
                doc.current_index = index;
            } else {
                debug!("set_current_index {} out of range, ignoring", index);
            }
        });
    }

    /// Toggle viewer visibility.
    pub fn set_display_enabled(&self, id: &str, enabled: bool) {
        self.mutate(id, |doc| {
            doc.display_enabled = enabled;
        });
    }
}

/// `[0, len-1]`, or 0 when the list is empty.
fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        index.min(len - 1)
    }
}
