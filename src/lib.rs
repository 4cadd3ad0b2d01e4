/*!
 * # stagecue - live stage-subtitle engine
 *
 * A Rust library that turns raw script text into an ordered list of typed
 * subtitle lines and keeps live viewers and editors synchronized to one
 * current-line pointer per performance session.
 *
 * ## Features
 *
 * - Best-scoring character-encoding detection for uploaded scripts
 * - Bounded chunking on sentence boundaries
 * - Segmentation through an external text-understanding service, with
 *   lenient response parsing, grounding validation and a deterministic
 *   per-chunk fallback
 * - Heuristic dialogue/direction classification
 * - Length normalization and inline-aside expansion
 * - Per-session document store with author/viewer broadcast projections
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `decoder`: Byte decoding and encoding selection
 * - `chunker`: Paragraph/sentence chunking
 * - `classifier`: Heuristic line classification
 * - `postprocess`: Line normalization
 * - `segmenter`: Service dispatch, validation and fallback:
 *   - `segmenter::parse`: Lenient response parsing
 *   - `segmenter::validate`: Output validation verdicts
 * - `providers`: Clients for the text-understanding service:
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::mock`: Scripted mock for tests
 * - `session`: Session store, projections and broadcast hub
 * - `app_controller`: Upload-to-commit orchestration
 * - `errors`: Custom error types for the library
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod chunker;
pub mod classifier;
pub mod decoder;
pub mod errors;
pub mod line;
pub mod postprocess;
pub mod providers;
pub mod segmenter;
pub mod session;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::ScriptController;
pub use classifier::Classifier;
pub use decoder::decode_script;
pub use errors::{AppError, ProviderError, SegmentError, SessionError};
pub use line::{LineKind, SubtitleLine};
pub use segmenter::Segmenter;
pub use session::{SessionSnapshot, SessionStore};
