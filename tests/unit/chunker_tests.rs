/*!
 * Tests for script chunking
 */

use stagecue::chunker::{chunk_script, split_paragraphs, split_sentences};

use crate::common;

/// Concatenated chunks must contain every sentence in original order
#[test]
fn test_chunk_script_withMultiParagraphScript_shouldPreserveOrder() {
    let script = common::sample_script();
    let chunks = chunk_script(script, 100);
    assert!(!chunks.is_empty());

    let joined = chunks.concat();
    let mut cursor = 0usize;
    for paragraph in split_paragraphs(script) {
        for sentence in split_sentences(&paragraph) {
            let found = joined[cursor..]
                .find(&sentence)
                .unwrap_or_else(|| panic!("sentence missing or out of order: {}", sentence));
            cursor += found + sentence.len();
        }
    }
}

/// No chunk may exceed the configured limit
#[test]
fn test_chunk_script_withSmallLimit_shouldRespectBudget() {
    let script = "第一句話說完了。".repeat(40);
    let chunks = chunk_script(&script, 100);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.chars().count() <= 100, "oversized chunk: {}", chunk);
    }
}

/// A single over-limit sentence is hard-sliced but fully covered
#[test]
fn test_chunk_script_withOversizedSentence_shouldCoverAllContent() {
    let long_sentence = "這句話沒有任何標點所以永遠不會自然斷開".repeat(10);
    let script = format!("開場白。\n\n{}", long_sentence);
    let chunks = chunk_script(&script, 100);

    let non_ws_in: usize = script.chars().filter(|c| !c.is_whitespace()).count();
    let non_ws_out: usize = chunks
        .iter()
        .map(|c| c.chars().filter(|ch| !ch.is_whitespace()).count())
        .sum();
    assert_eq!(non_ws_in, non_ws_out);
    assert!(chunks.iter().all(|c| c.chars().count() <= 100));
    // The oversized sentence spans consecutive chunks in order
    assert!(chunks.concat().contains(&long_sentence.replace('\n', "")));
}

/// The caller's budget is honored as given, even below the config minimum
#[test]
fn test_chunk_script_withTinyBudget_shouldHonorCallerLimit() {
    let script = "第一句話說完了。第二句話也說完了。";
    let chunks = chunk_script(script, 10);
    assert!(chunks.len() >= 2);
    assert!(chunks.iter().all(|c| c.chars().count() <= 10));

    let non_ws: usize = chunks
        .iter()
        .map(|c| c.chars().filter(|ch| !ch.is_whitespace()).count())
        .sum();
    assert_eq!(non_ws, script.chars().count());
}

#[test]
fn test_chunk_script_withWhitespaceOnlyInput_shouldReturnNoChunks() {
    assert!(chunk_script("  \n\n\t ", 100).is_empty());
    assert!(chunk_script("", 100).is_empty());
}

#[test]
fn test_split_sentences_withMixedTerminals_shouldSplitOnEach() {
    let sentences = split_sentences("真的嗎？太好了！我們走吧……好。");
    assert_eq!(sentences.len(), 4);
    assert_eq!(sentences[2], "我們走吧……");
}
