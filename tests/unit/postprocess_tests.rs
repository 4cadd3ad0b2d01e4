/*!
 * Tests for line normalization
 */

use stagecue::classifier::Classifier;
use stagecue::line::{LineKind, SubtitleLine};
use stagecue::postprocess::{enforce_length, postprocess, PostProcessOptions};

fn run(lines: Vec<SubtitleLine>, options: &PostProcessOptions) -> Vec<SubtitleLine> {
    postprocess(lines, &Classifier::default(), options)
}

/// A spaceless over-long dialogue line is re-split into pieces that each
/// fit the budget, and rejoining them reproduces the original text
#[test]
fn test_postprocess_withOverlongDialogue_shouldSplitLosslessly() {
    let original = "這是一句完全沒有空白也沒有任何標點符號的超長台詞需要硬切成幾段";
    assert_eq!(original.chars().count(), 31);

    let out = run(
        vec![SubtitleLine::dialogue(original)],
        &PostProcessOptions {
            max_line_chars: 20,
            preserve_empty: false,
        },
    );
    assert!(out.len() >= 2);
    for line in &out {
        assert_eq!(line.kind, LineKind::Dialogue);
        assert!(line.char_len() <= 20);
    }
    let rejoined: String = out.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(rejoined, original);
}

/// Direction lines are exempt from the length budget
#[test]
fn test_postprocess_withLongDirection_shouldNotSplit() {
    let text = "（全體演員緩緩走向舞台中央，燈光由暗轉亮，鼓聲與掌聲同時響起）";
    let out = run(
        vec![SubtitleLine::direction(text)],
        &PostProcessOptions::default(),
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].text, text);
}

/// Inline asides become their own direction lines; the surrounding
/// dialogue merges into one line at the first fragment's position
#[test]
fn test_postprocess_withInlineAside_shouldExtractDirection() {
    let out = run(
        vec![SubtitleLine::dialogue("我不想走（轉身離去）你別攔我")],
        &PostProcessOptions::default(),
    );
    assert_eq!(out.len(), 2);
    assert_eq!(out[0], SubtitleLine::dialogue("我不想走 你別攔我"));
    assert_eq!(out[1], SubtitleLine::direction("（轉身離去）"));
}

/// Punctuation-only lines are vacuous and dropped by default
#[test]
fn test_postprocess_withVacuousLine_shouldDrop() {
    let out = run(
        vec![
            SubtitleLine::dialogue("。。。"),
            SubtitleLine::dialogue("有內容的一句"),
        ],
        &PostProcessOptions::default(),
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].text, "有內容的一句");
}

/// `preserve_empty` keeps intentionally blank lines for manual edits
#[test]
fn test_postprocess_withPreserveEmpty_shouldKeepBlankLines() {
    let out = run(
        vec![SubtitleLine::dialogue(""), SubtitleLine::dialogue("台詞")],
        &PostProcessOptions {
            max_line_chars: 20,
            preserve_empty: true,
        },
    );
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].text, "");
}

/// Whitespace split points are preferred over hard cuts and consumed
#[test]
fn test_enforce_length_withWhitespace_shouldSplitAtSpace() {
    let pieces = enforce_length("第一段台詞 第二段台詞補滿長度", 10);
    assert_eq!(pieces[0], "第一段台詞");
    assert!(pieces.iter().all(|p| p.chars().count() <= 10));
    assert!(pieces.iter().all(|p| !p.contains(' ')));
}

#[test]
fn test_enforce_length_withShortText_shouldReturnSingle() {
    assert_eq!(enforce_length("短句", 20), vec!["短句"]);
}
