use std::sync::Arc;

use log::info;

use crate::app_config::Config;
use crate::decoder::decode_script;
use crate::errors::SegmentError;
use crate::providers::Provider;
use crate::segmenter::Segmenter;
use crate::session::SessionStore;

/// Upload orchestration module
/// Ties the pipeline together for shells: decode the uploaded bytes, run
/// segmentation, and commit the result to the session in one step. Nothing
/// reaches the session until the whole run has finished, so peers never see
/// a half-updated document.

/// Controller owning the segmenter and the session store.
pub struct ScriptController {
    segmenter: Segmenter,
    store: Arc<SessionStore>,
}

impl ScriptController {
    /// Create a controller from configuration and a provider.
    pub fn new(provider: Arc<dyn Provider>, config: &Config) -> Self {
        let segmenter = Segmenter::new(provider, config);
        let store = Arc::new(SessionStore::new(
            segmenter.classifier().clone(),
            config.segmentation.max_line_chars,
        ));
        Self { segmenter, store }
    }

    /// The shared session store, for shells that route edit operations and
    /// room joins directly.
    pub fn store(&self) -> Arc<SessionStore> {
        Arc::clone(&self.store)
    }

    /// Decode an uploaded script, segment it, and commit the whole result
    /// to the session. Returns the number of committed lines.
    ///
    /// A transport failure propagates before anything is committed; chunks
    /// that were already segmented in this run are discarded with it.
    pub async fn import_script(
        &self,
        session_id: &str,
        raw: &[u8],
    ) -> Result<usize, SegmentError> {
        let decoded = decode_script(raw);
        info!(
            "importing script for session {}: {} bytes decoded as {}",
            session_id,
            raw.len(),
            decoded.encoding
        );
        let lines = self.segmenter.segment_script(&decoded.text).await?;
        let count = lines.len();
        self.store.commit_lines(session_id, lines);
        info!("session {} committed {} line(s)", session_id, count);
        Ok(count)
    }
}
