/*!
 * Tests for the heuristic line classifier
 */

use stagecue::classifier::Classifier;
use stagecue::line::LineKind;

fn classify(text: &str) -> LineKind {
    Classifier::default().classify(text)
}

#[test]
fn test_classify_withBracketWrappedStaging_shouldTagDirection() {
    assert_eq!(classify("（燈暗）"), LineKind::Direction);
    assert_eq!(classify("【換場，音樂漸弱】"), LineKind::Direction);
    assert_eq!(classify("（）"), LineKind::Direction);
}

#[test]
fn test_classify_withStagingPrefix_shouldTagDirection() {
    assert_eq!(classify("舞台上響起鼓聲。"), LineKind::Direction);
    assert_eq!(classify("燈光轉為暖黃色"), LineKind::Direction);
}

#[test]
fn test_classify_withShortActionLine_shouldTagDirection() {
    assert_eq!(classify("主角轉身退場"), LineKind::Direction);
    assert_eq!(classify("她坐下"), LineKind::Direction);
}

/// Bracket-wrapped text without staging vocabulary is spoken dialogue,
/// whatever keywords follow further down the cascade
#[test]
fn test_classify_withWrappedNonStaging_shouldTagDialogue() {
    assert_eq!(classify("（小聲）我真的不知道"), LineKind::Dialogue);
    assert_eq!(classify("「把那個道具放好。」"), LineKind::Dialogue);
}

#[test]
fn test_classify_withKeywordDensity_shouldTagDirection() {
    assert_eq!(classify("一陣鼓聲之後燈光漸暗。"), LineKind::Direction);
}

/// A speaker label terminates the cascade either way
#[test]
fn test_classify_withSpeakerLabel_shouldFollowLabel() {
    assert_eq!(classify("她說：你好"), LineKind::Dialogue);
    assert_eq!(classify("甲：「舞台很大。」"), LineKind::Dialogue);
    assert_eq!(classify("旁白：多年以後他回到故鄉"), LineKind::Direction);
}

#[test]
fn test_classify_withMovementVerbNoPunctuation_shouldTagDirection() {
    assert_eq!(classify("他慢慢望向窗外"), LineKind::Direction);
}

/// Punctuated prose with no structural signal defaults to dialogue
#[test]
fn test_classify_withPlainSentence_shouldDefaultToDialogue() {
    assert_eq!(classify("今天晚上我們去看戲好不好？"), LineKind::Dialogue);
    assert_eq!(classify("我等了你整整三年。"), LineKind::Dialogue);
}

/// A custom colon cutoff changes which labels are recognized
#[test]
fn test_classify_withTightColonCutoff_shouldIgnoreLateColon() {
    let tight = Classifier::new(2);
    assert_eq!(tight.classify("甲：你好"), LineKind::Dialogue);
    // Colon at position 3 falls outside the cutoff; the default verdict
    // applies instead of the label rule
    assert_eq!(tight.classify("李大叔：你好"), LineKind::Dialogue);
}
