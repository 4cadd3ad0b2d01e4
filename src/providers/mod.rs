/*!
 * Client implementations for the external text-understanding service.
 *
 * This module contains the provider trait the segmenter dispatches through:
 * - Anthropic: messages-API client for the live service
 * - Mock: scripted provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// One segmentation request: a single chunk plus its position in the run.
#[derive(Debug, Clone)]
pub struct ChunkRequest {
    /// The chunk text to segment
    pub chunk_text: String,
    /// 1-based ordinal of this chunk
    pub ordinal: usize,
    /// Total chunks in the run
    pub total: usize,
    /// Literal per-line length budget quoted in the instructions
    pub max_line_chars: usize,
}

impl ChunkRequest {
    /// Render the instruction prompt for this chunk.
    pub fn prompt(&self) -> String {
        format!(
            "你是劇本字幕分段助手。以下是一部劇本的第 {ordinal}/{total} 段文字。\n\
             把它拆成逐行字幕，並以 JSON 陣列回覆，元素形如 {{\"type\": \"dialogue\"|\"direction\", \"text\": \"...\"}}。\n\
             規則：\n\
             1. 保持原文順序與用字，不增刪改寫。\n\
             2. 不要重複之前段落的內容，只處理本段。\n\
             3. 每行 text 不超過 {budget} 個字。\n\
             4. 舞台指示（燈光、音效、動作等）標為 direction，其餘為 dialogue。\n\
             5. 只回覆 JSON 陣列，不要其他說明。\n\
             本段文字：\n{chunk}",
            ordinal = self.ordinal,
            total = self.total,
            budget = self.max_line_chars,
            chunk = self.chunk_text,
        )
    }
}

/// Common trait for text-understanding providers.
///
/// The response is deliberately a free-form string: the segmenter treats
/// whatever comes back as untrusted text and runs it through its own
/// lenient parser and validation.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Submit one chunk and return the raw response text.
    async fn complete(&self, request: &ChunkRequest) -> Result<String, ProviderError>;

    /// Test the connection to the provider.
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

pub mod anthropic;
pub mod mock;
