/*!
 * Tests for segmentation dispatch, validation verdicts and fallback
 */

use std::sync::Arc;

use stagecue::app_config::Config;
use stagecue::classifier::Classifier;
use stagecue::errors::SegmentError;
use stagecue::line::LineKind;
use stagecue::providers::mock::{MockBehavior, MockProvider};
use stagecue::providers::Provider;
use stagecue::segmenter::validate::{validate_response, Rejection};
use stagecue::segmenter::{fallback_segment, Segmenter};

fn config() -> Config {
    let mut config = Config::default();
    config.segmentation.max_chunk_chars = 100;
    config
}

/// Two single-sentence paragraphs that each fit a 100-char chunk alone but
/// not together, so the script always splits into exactly two chunks.
fn two_chunk_script() -> (String, String, String) {
    let first = format!("{}。", "第一幕的台詞我們慢慢順一次".repeat(6));
    let second = format!("{}。", "第二幕的走位我們仔細對一次".repeat(6));
    let script = format!("{}\n\n{}", first, second);
    (script, first, second)
}

#[test]
fn test_validate_response_withEchoedChunk_shouldAccept() {
    let chunk = "今天晚上我們去看戲。";
    let response = r#"```json
[{"type":"dialogue","text":"今天晚上我們去看戲。"}]
```"#;
    let lines =
        validate_response(response, chunk, &Classifier::default(), &config().segmentation)
            .unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].kind, LineKind::Dialogue);
}

/// A declared type is honored; a missing one is inferred by the classifier
#[test]
fn test_validate_response_withMissingType_shouldInferKind() {
    let chunk = "（燈暗）她說：我們開始吧。";
    let response = r#"[{"text":"（燈暗）"},{"text":"她說：我們開始吧。"}]"#;
    let lines =
        validate_response(response, chunk, &Classifier::default(), &config().segmentation)
            .unwrap();
    assert_eq!(lines[0].kind, LineKind::Direction);
    assert_eq!(lines[1].kind, LineKind::Dialogue);
}

#[test]
fn test_validate_response_withProse_shouldRejectParseFailure() {
    let verdict = validate_response(
        "抱歉，我沒辦法處理這段文字。",
        "今天晚上我們去看戲。",
        &Classifier::default(),
        &config().segmentation,
    );
    assert_eq!(verdict.unwrap_err(), Rejection::ParseFailure);
}

#[test]
fn test_validate_response_withEmptyArray_shouldRejectEmptyOutput() {
    let verdict = validate_response(
        "[]",
        "今天晚上我們去看戲。",
        &Classifier::default(),
        &config().segmentation,
    );
    assert_eq!(verdict.unwrap_err(), Rejection::EmptyOutput);
}

#[test]
fn test_validate_response_withOrdinalPlaceholders_shouldRejectPlaceholderOutput() {
    let response = r#"[{"type":"dialogue","text":"第一句"},{"type":"dialogue","text":"第二句"}]"#;
    let verdict = validate_response(
        response,
        "今天晚上我們去看戲。",
        &Classifier::default(),
        &config().segmentation,
    );
    assert_eq!(verdict.unwrap_err(), Rejection::PlaceholderOutput);
}

#[test]
fn test_validate_response_withInventedText_shouldRejectInvalidOutput() {
    let response = r#"[{"type":"dialogue","text":"這段文字是模型自己編出來的內容"}]"#;
    let verdict = validate_response(
        response,
        "今天晚上我們去看戲。",
        &Classifier::default(),
        &config().segmentation,
    );
    assert_eq!(verdict.unwrap_err(), Rejection::InvalidOutput);
}

/// The deterministic fallback classifies sentences the same way the
/// validator would
#[test]
fn test_fallback_segment_withMixedChunk_shouldClassifyLines() {
    let chunk = "（燈暗）\n她說：今天的排練很順利。\n舞台上響起鼓聲。";
    let lines = fallback_segment(chunk, &Classifier::default(), &config().segmentation);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].kind, LineKind::Direction);
    assert_eq!(lines[1].kind, LineKind::Dialogue);
    assert_eq!(lines[2].kind, LineKind::Direction);
}

#[tokio::test]
async fn test_segment_script_withWorkingProvider_shouldPreserveChunkOrder() {
    let (script, _, _) = two_chunk_script();
    let mock = Arc::new(MockProvider::working());
    let provider: Arc<dyn Provider> = mock.clone();
    let segmenter = Segmenter::new(provider, &config());

    let lines = segmenter.segment_script(&script).await.unwrap();
    assert!(!lines.is_empty());
    assert_eq!(mock.request_count(), 2);

    let first_pos = lines.iter().position(|l| l.text.contains("第一幕"));
    let second_pos = lines.iter().position(|l| l.text.contains("第二幕"));
    assert!(first_pos.unwrap() < second_pos.unwrap());
}

/// A rejected chunk falls back without disturbing accepted neighbors
#[tokio::test]
async fn test_segment_script_withOneRejectedChunk_shouldFallBackInPlace() {
    let (script, _, second) = two_chunk_script();
    let mock = Arc::new(MockProvider::working().with_behavior(2, MockBehavior::Garbage));
    let provider: Arc<dyn Provider> = mock.clone();
    let segmenter = Segmenter::new(provider, &config());

    let lines = segmenter.segment_script(&script).await.unwrap();
    let expected_tail =
        fallback_segment(&second, segmenter.classifier(), &config().segmentation);
    assert!(lines.len() > expected_tail.len());
    assert_eq!(&lines[lines.len() - expected_tail.len()..], &expected_tail[..]);
}

/// A transport failure on any chunk aborts the whole run
#[tokio::test]
async fn test_segment_script_withTransportFailure_shouldAbort() {
    let (script, _, _) = two_chunk_script();
    let mock = Arc::new(MockProvider::working().with_behavior(2, MockBehavior::Fail));
    let provider: Arc<dyn Provider> = mock.clone();
    let segmenter = Segmenter::new(provider, &config());

    let result = segmenter.segment_script(&script).await;
    match result {
        Err(SegmentError::Transport { chunk, total, .. }) => {
            assert_eq!(chunk, 2);
            assert_eq!(total, 2);
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}

/// A transport failure stops the run before later chunks are dispatched
#[tokio::test]
async fn test_segment_script_withEarlyTransportFailure_shouldNotDispatchRemaining() {
    let first = format!("{}。", "第一幕的台詞我們慢慢順一次".repeat(6));
    let second = format!("{}。", "第二幕的走位我們仔細對一次".repeat(6));
    let third = format!("{}。", "第三幕的謝幕我們認真排一次".repeat(6));
    let script = format!("{}\n\n{}\n\n{}", first, second, third);

    let mut config = config();
    // One request at a time makes the dispatch order deterministic
    config.provider.concurrent_requests = 1;

    let mock = Arc::new(MockProvider::working().with_behavior(1, MockBehavior::Fail));
    let provider: Arc<dyn Provider> = mock.clone();
    let segmenter = Segmenter::new(provider, &config);

    let result = segmenter.segment_script(&script).await;
    assert!(matches!(result, Err(SegmentError::Transport { chunk: 1, .. })));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn test_segment_script_withEmptyScript_shouldReturnNoLines() {
    let mock = Arc::new(MockProvider::working());
    let provider: Arc<dyn Provider> = mock.clone();
    let segmenter = Segmenter::new(provider, &config());

    let lines = segmenter.segment_script("   \n\n ").await.unwrap();
    assert!(lines.is_empty());
    assert_eq!(mock.request_count(), 0);
}
