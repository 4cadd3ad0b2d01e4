/*!
 * Mock provider for testing.
 *
 * Behaviors simulate the failure modes the segmenter has to survive:
 * - `MockBehavior::EchoJson` - well-formed, grounded JSON output
 * - `MockBehavior::Garbage` - unparseable text
 * - `MockBehavior::Placeholder` - ordinal-placeholder lines ("第一句")
 * - `MockBehavior::Ungrounded` - valid JSON with invented text
 * - `MockBehavior::Empty` - an empty JSON array
 * - `MockBehavior::Fail` - transport-level failure
 *
 * Per-chunk overrides allow mixed runs (chunk 1 good, chunk 2 rejected).
 */

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::chunker::split_sentences;
use crate::errors::ProviderError;
use crate::providers::{ChunkRequest, Provider};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Return a well-formed JSON array built from the chunk's sentences
    EchoJson,
    /// Return unparseable prose
    Garbage,
    /// Return ordinal placeholders instead of content
    Placeholder,
    /// Return valid JSON whose text has no overlap with the chunk
    Ungrounded,
    /// Return an empty JSON array
    Empty,
    /// Fail at the transport level
    Fail,
}

/// Mock provider with a default behavior and per-ordinal overrides
#[derive(Debug)]
pub struct MockProvider {
    default_behavior: MockBehavior,
    overrides: HashMap<usize, MockBehavior>,
    canned: HashMap<usize, String>,
    request_count: AtomicUsize,
}

impl MockProvider {
    /// Create a mock with one behavior for every chunk
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            default_behavior: behavior,
            overrides: HashMap::new(),
            canned: HashMap::new(),
            request_count: AtomicUsize::new(0),
        }
    }

    /// Mock that always returns well-formed grounded output
    pub fn working() -> Self {
        Self::new(MockBehavior::EchoJson)
    }

    /// Mock that always fails at the transport level
    pub fn failing() -> Self {
        Self::new(MockBehavior::Fail)
    }

    /// Override the behavior for one chunk ordinal (1-based)
    pub fn with_behavior(mut self, ordinal: usize, behavior: MockBehavior) -> Self {
        self.overrides.insert(ordinal, behavior);
        self
    }

    /// Return a fixed response body for one chunk ordinal (1-based)
    pub fn with_response(mut self, ordinal: usize, response: impl Into<String>) -> Self {
        self.canned.insert(ordinal, response.into());
        self
    }

    /// Number of completed calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// A well-formed response: one dialogue object per sentence, wrapped in
    /// a code fence the way chatty models like to reply.
    fn echo_response(request: &ChunkRequest) -> String {
        let items: Vec<serde_json::Value> = split_sentences(&request.chunk_text)
            .into_iter()
            .map(|s| json!({"type": "dialogue", "text": s}))
            .collect();
        format!("```json\n{}\n```", serde_json::Value::Array(items))
    }

    fn placeholder_response() -> String {
        r#"[{"type":"dialogue","text":"第一句"},{"type":"dialogue","text":"第二句"}]"#.to_string()
    }

    fn ungrounded_response() -> String {
        r#"[{"type":"dialogue","text":"這段文字是模型自己編出來的內容"}]"#.to_string()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: &ChunkRequest) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        if let Some(canned) = self.canned.get(&request.ordinal) {
            return Ok(canned.clone());
        }
        let behavior = self
            .overrides
            .get(&request.ordinal)
            .copied()
            .unwrap_or(self.default_behavior);
        match behavior {
            MockBehavior::EchoJson => Ok(Self::echo_response(request)),
            MockBehavior::Garbage => Ok("抱歉，我沒辦法處理這段文字。".to_string()),
            MockBehavior::Placeholder => Ok(Self::placeholder_response()),
            MockBehavior::Ungrounded => Ok(Self::ungrounded_response()),
            MockBehavior::Empty => Ok("[]".to_string()),
            MockBehavior::Fail => Err(ProviderError::ConnectionError(
                "mock transport failure".to_string(),
            )),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.default_behavior {
            MockBehavior::Fail => Err(ProviderError::ConnectionError(
                "mock transport failure".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
