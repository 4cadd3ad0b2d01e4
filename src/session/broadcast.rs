use log::debug;
use tokio::sync::broadcast;

use crate::session::projection::{AuthorView, Projections, ViewerView};

/// Per-session broadcast hub
/// Two disjoint audience rooms per session: authoring peers get the full
/// document, passive viewers get the reduced projection. The hub never
/// holds line data of its own; it is handed freshly derived projections at
/// publish time. Joining a room yields only future pushes — catch-up state
/// comes from the synchronous snapshot read.

/// Buffered events per room. Slow receivers that fall further behind than
/// this lag and resynchronize from the next push, which is acceptable for
/// a current-state feed.
const ROOM_CAPACITY: usize = 64;

/// The two rooms of one session.
#[derive(Debug)]
pub struct SessionHub {
    authors: broadcast::Sender<AuthorView>,
    viewers: broadcast::Sender<ViewerView>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    /// Create an empty hub
    pub fn new() -> Self {
        let (authors, _) = broadcast::channel(ROOM_CAPACITY);
        let (viewers, _) = broadcast::channel(ROOM_CAPACITY);
        Self { authors, viewers }
    }

    /// Join the authoring room
    pub fn join_authors(&self) -> broadcast::Receiver<AuthorView> {
        self.authors.subscribe()
    }

    /// Join the viewer room
    pub fn join_viewers(&self) -> broadcast::Receiver<ViewerView> {
        self.viewers.subscribe()
    }

    /// Push both projections, ignoring rooms with no peers
    pub fn publish(&self, projections: Projections) {
        let _ = self.authors.send(projections.author);
        let _ = self.viewers.send(projections.viewer);
        debug!(
            "published projections to {} author(s), {} viewer(s)",
            self.authors.receiver_count(),
            self.viewers.receiver_count()
        );
    }

    /// Current number of authoring peers
    pub fn author_count(&self) -> usize {
        self.authors.receiver_count()
    }

    /// Current number of passive viewers
    pub fn viewer_count(&self) -> usize {
        self.viewers.receiver_count()
    }
}
