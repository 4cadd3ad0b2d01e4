/*!
 * Error types for the stagecue library.
 *
 * This module contains custom error types for different parts of the
 * library, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Maximum number of characters of detail text carried by an
/// operator-visible diagnostic. Longer service payloads are truncated so a
/// misbehaving endpoint cannot flood a status line.
const DIAGNOSTIC_DETAIL_LIMIT: usize = 160;

/// Errors that can occur when talking to the text-understanding service
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that abort a whole segmentation run.
///
/// Quality problems with a single chunk never surface here; they are
/// handled by per-chunk fallback inside the segmenter. Only transport-level
/// failures, where continuing without operator awareness would be wrong,
/// become a `SegmentError`.
#[derive(Error, Debug)]
pub enum SegmentError {
    /// The service was unreachable or its response never arrived
    #[error("transport failure on chunk {chunk}/{total}: {source}")]
    Transport {
        /// 1-based ordinal of the failing chunk
        chunk: usize,
        /// Total chunks in the run
        total: usize,
        /// The underlying provider error
        source: ProviderError,
    },
}

impl SegmentError {
    /// Short diagnostic code plus truncated detail, suitable for showing
    /// to the operator.
    pub fn diagnostic(&self) -> (&'static str, String) {
        match self {
            SegmentError::Transport { source, .. } => {
                ("TRANSPORT_FAILURE", truncate_detail(&source.to_string()))
            }
        }
    }
}

/// Errors that can occur when addressing sessions
#[derive(Error, Debug)]
pub enum SessionError {
    /// No session exists under the requested id
    #[error("session not found: {0}")]
    NotFound(String),
}

/// Main library error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the service provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from a segmentation run
    #[error("Segmentation error: {0}")]
    Segment(#[from] SegmentError),

    /// Error addressing a session
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

fn truncate_detail(detail: &str) -> String {
    if detail.chars().count() <= DIAGNOSTIC_DETAIL_LIMIT {
        return detail.to_string();
    }
    let mut out: String = detail.chars().take(DIAGNOSTIC_DETAIL_LIMIT).collect();
    out.push('…');
    out
}
