/*!
 * End-to-end pipeline tests: decode, segment, commit, observe.
 */

use std::sync::Arc;

use stagecue::app_config::Config;
use stagecue::app_controller::ScriptController;
use stagecue::errors::SegmentError;
use stagecue::providers::mock::{MockBehavior, MockProvider};
use stagecue::providers::Provider;
use stagecue::session::projection::ViewerView;

use crate::common;

fn config() -> Config {
    let mut config = Config::default();
    config.segmentation.max_chunk_chars = 100;
    config
}

fn controller(mock: Arc<MockProvider>) -> ScriptController {
    common::init_logging();
    let provider: Arc<dyn Provider> = mock;
    ScriptController::new(provider, &config())
}

/// A script small enough to fit one chunk but mixing dialogue and
/// directions, uploaded as UTF-16LE the way desktop editors save files.
#[tokio::test]
async fn test_import_script_withWorkingProvider_shouldCommitLines() {
    let controller = controller(Arc::new(MockProvider::working()));
    let raw = common::utf16le_with_bom(common::sample_script());

    let count = controller.import_script("show-1", &raw).await.unwrap();
    assert!(count > 0);

    let snapshot = controller.store().snapshot("show-1").unwrap();
    assert_eq!(snapshot.lines.len(), count);
    assert_eq!(snapshot.current_index, 0);
    assert!(snapshot.display_enabled);
}

/// A mixed run: chunk 1 accepted, chunk 2 rejected and re-segmented by the
/// deterministic fallback, with overall order intact
#[tokio::test]
async fn test_import_script_withOneRejectedChunk_shouldMixFallbackInOrder() {
    // 96 chars: fills the 100-char budget so the second paragraph cannot
    // join the first chunk
    let first = format!("{}大家加油。", "第一幕的台詞我們慢慢順一次".repeat(7));
    let second = "（燈暗）\n她說：第二幕現在開始。";
    let script = format!("{}\n\n{}", first, second);

    let mock = Arc::new(MockProvider::working().with_behavior(2, MockBehavior::Garbage));
    let controller = controller(mock.clone());

    let count = controller
        .import_script("show-1", script.as_bytes())
        .await
        .unwrap();
    assert!(count > 0);
    assert_eq!(mock.request_count(), 2);

    let snapshot = controller.store().snapshot("show-1").unwrap();
    // Fallback output for chunk 2 sits after every chunk-1 line
    let dark = snapshot
        .lines
        .iter()
        .position(|l| l.text == "（燈暗）")
        .unwrap();
    assert!(dark > 0);
    assert!(snapshot.lines[..dark]
        .iter()
        .all(|l| !l.text.contains("第二幕")));
    assert_eq!(snapshot.lines[dark + 1].text, "她說：第二幕現在開始。");
}

/// A transport failure aborts the import: the error surfaces and the
/// session is never created
#[tokio::test]
async fn test_import_script_withTransportFailure_shouldCommitNothing() {
    let first = format!("{}。", "第一幕的台詞我們慢慢順一次".repeat(6));
    let second = format!("{}。", "第二幕的走位我們仔細對一次".repeat(6));
    let script = format!("{}\n\n{}", first, second);

    let mock = Arc::new(MockProvider::working().with_behavior(2, MockBehavior::Fail));
    let controller = controller(mock);

    let result = controller.import_script("show-1", script.as_bytes()).await;
    assert!(matches!(result, Err(SegmentError::Transport { .. })));
    assert!(controller.store().snapshot("show-1").is_err());
}

/// After an import, advancing the pointer drives the viewer feed
#[tokio::test]
async fn test_pipeline_withViewerJoined_shouldPushActiveLine() {
    let controller = controller(Arc::new(MockProvider::working()));
    let raw = common::sample_script().as_bytes();
    controller.import_script("show-1", raw).await.unwrap();

    let store = controller.store();
    let mut viewers = store.join_viewers("show-1");
    store.set_current_index("show-1", 0);

    match viewers.try_recv().unwrap() {
        ViewerView::Active { index, .. } => assert_eq!(index, 0),
        other => panic!("expected active view, got {:?}", other),
    }
}
