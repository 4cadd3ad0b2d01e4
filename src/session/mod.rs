/*!
 * Per-performance session state and its real-time fan-out.
 *
 * - `store`: the single source of truth for session documents and the
 *   discrete edit operations
 * - `projection`: pure derivation of the author and viewer payloads
 * - `broadcast`: two-room publish/subscribe per session
 */

pub mod broadcast;
pub mod projection;
pub mod store;

pub use broadcast::SessionHub;
pub use projection::{AuthorView, Projections, ViewerView};
pub use store::{SessionDocument, SessionSnapshot, SessionStore};
