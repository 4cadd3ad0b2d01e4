/*!
 * Script segmentation orchestration.
 *
 * Dispatches chunks to the text-understanding service concurrently,
 * validates each response, falls back to a deterministic heuristic split
 * for rejected chunks, and reassembles results in original chunk order.
 * A transport-level failure aborts the whole run with nothing committed;
 * quality rejections never do.
 */

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use tokio::sync::Semaphore;

use crate::app_config::{Config, SegmentationConfig};
use crate::chunker::{chunk_script, split_paragraphs, split_sentences};
use crate::classifier::Classifier;
use crate::errors::SegmentError;
use crate::line::SubtitleLine;
use crate::postprocess::{postprocess, PostProcessOptions};
use crate::providers::{ChunkRequest, Provider};

pub mod parse;
pub mod validate;

use validate::validate_response;

/// Segmenter for whole scripts
pub struct Segmenter {
    /// The service provider to dispatch chunks to
    provider: Arc<dyn Provider>,
    /// Classifier shared with validation and fallback
    classifier: Classifier,
    /// Segmentation thresholds
    config: SegmentationConfig,
    /// Maximum concurrent chunk requests
    concurrent_requests: usize,
}

impl Segmenter {
    /// Create a segmenter from configuration
    pub fn new(provider: Arc<dyn Provider>, config: &Config) -> Self {
        Self {
            provider,
            classifier: Classifier::new(config.segmentation.speaker_colon_cutoff),
            config: config.segmentation.clone(),
            concurrent_requests: config.provider.concurrent_requests.max(1),
        }
    }

    /// The classifier this segmenter normalizes with
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Segment a whole script into typed subtitle lines.
    ///
    /// Chunk requests run concurrently up to the configured cap; results
    /// are reassembled in chunk order, so final line order always equals
    /// input order regardless of response arrival order. Nothing is
    /// returned until every chunk has either validated service output or
    /// fallback output, so callers commit all-or-nothing. A transport
    /// failure stops the run immediately: chunks not yet dispatched are
    /// never sent.
    pub async fn segment_script(&self, text: &str) -> Result<Vec<SubtitleLine>, SegmentError> {
        let chunks = chunk_script(text, self.config.max_chunk_chars);
        if chunks.is_empty() {
            return Ok(Vec::new());
        }
        let total = chunks.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrent_requests));

        let mut requests = stream::iter(chunks.into_iter().enumerate())
            .map(|(index, chunk)| {
                let provider = Arc::clone(&self.provider);
                let semaphore = Arc::clone(&semaphore);
                let classifier = self.classifier.clone();
                let config = self.config.clone();
                async move {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .expect("segmentation semaphore never closes");
                    let request = ChunkRequest {
                        chunk_text: chunk.clone(),
                        ordinal: index + 1,
                        total,
                        max_line_chars: config.max_line_chars,
                    };
                    let outcome = match provider.complete(&request).await {
                        Ok(response) => {
                            match validate_response(&response, &chunk, &classifier, &config) {
                                Ok(lines) => {
                                    debug!(
                                        "chunk {}/{} accepted with {} line(s)",
                                        index + 1,
                                        total,
                                        lines.len()
                                    );
                                    Ok(lines)
                                }
                                Err(rejection) => {
                                    warn!(
                                        "chunk {}/{} rejected ({}), using fallback segmentation",
                                        index + 1,
                                        total,
                                        rejection.code()
                                    );
                                    Ok(fallback_segment(&chunk, &classifier, &config))
                                }
                            }
                        }
                        Err(source) => Err(SegmentError::Transport {
                            chunk: index + 1,
                            total,
                            source,
                        }),
                    };
                    (index, outcome)
                }
            })
            .buffer_unordered(self.concurrent_requests);

        let mut results = Vec::with_capacity(total);
        while let Some((index, outcome)) = requests.next().await {
            match outcome {
                Ok(lines) => results.push((index, lines)),
                // Returning drops the stream, cancelling in-flight
                // requests; undispatched chunks are never sent
                Err(err) => return Err(err),
            }
        }

        // Reassemble in original chunk order before anything is committed
        results.sort_by_key(|(index, _)| *index);

        let mut lines = Vec::new();
        for (_, chunk_lines) in results {
            lines.extend(chunk_lines);
        }
        Ok(lines)
    }

    /// Deterministic fallback split for a single chunk.
    pub fn fallback_segment(&self, chunk: &str) -> Vec<SubtitleLine> {
        fallback_segment(chunk, &self.classifier, &self.config)
    }
}

/// Paragraph/sentence split through the classifier and post-processor:
/// the non-service rendition of a chunk, used whenever service output is
/// rejected.
pub fn fallback_segment(
    chunk: &str,
    classifier: &Classifier,
    config: &SegmentationConfig,
) -> Vec<SubtitleLine> {
    let mut lines = Vec::new();
    for paragraph in split_paragraphs(chunk) {
        for sentence in split_sentences(&paragraph) {
            let kind = classifier.classify(&sentence);
            lines.push(SubtitleLine::new(sentence, kind));
        }
    }
    postprocess(
        lines,
        classifier,
        &PostProcessOptions {
            max_line_chars: config.max_line_chars,
            preserve_empty: false,
        },
    )
}
