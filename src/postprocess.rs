use log::trace;

use crate::classifier::Classifier;
use crate::line::{LineKind, SubtitleLine};

/// Line normalization module
/// Every line headed for a session passes through here, whether it came
/// from the service, from fallback segmentation or from a manual edit:
/// inline asides are expanded into their own lines, dialogue is re-split to
/// the visible length budget, stray bracket fragments are stripped and
/// vacuous lines are dropped.

const BRACKET_PAIRS: &[(char, char)] = &[
    ('（', '）'),
    ('(', ')'),
    ('【', '】'),
    ('[', ']'),
    ('〔', '〕'),
];

const QUOTE_PAIRS: &[(char, char)] = &[('「', '」'), ('『', '』'), ('“', '”'), ('‘', '’')];

/// Punctuation a dialogue line may be split after when no whitespace is
/// available near the limit.
const SOFT_PUNCTUATION: &[char] = &['、', '，', ',', '；', ';', '：', ':', '·', '—', '－', '-'];

/// Normalization options.
#[derive(Debug, Clone)]
pub struct PostProcessOptions {
    /// Maximum visible characters per dialogue line
    pub max_line_chars: usize,
    /// Keep lines that are empty after punctuation stripping. Used when
    /// normalizing manually authored content, where an intentional blank
    /// line must survive.
    pub preserve_empty: bool,
}

impl Default for PostProcessOptions {
    fn default() -> Self {
        Self {
            max_line_chars: 20,
            preserve_empty: false,
        }
    }
}

/// Run the full normalization pass over a list of lines.
pub fn postprocess(
    lines: Vec<SubtitleLine>,
    classifier: &Classifier,
    options: &PostProcessOptions,
) -> Vec<SubtitleLine> {
    let mut expanded = Vec::with_capacity(lines.len());
    for line in lines {
        match line.kind {
            LineKind::Dialogue => expanded.extend(expand_asides(&line, classifier)),
            LineKind::Direction => expanded.push(line),
        }
    }

    let mut sized = Vec::with_capacity(expanded.len());
    for line in expanded {
        match line.kind {
            // Direction lines are exempt from the length budget
            LineKind::Direction => sized.push(line),
            LineKind::Dialogue => {
                let pieces = enforce_length(&line.text, options.max_line_chars);
                if pieces.is_empty() {
                    // Blank dialogue lines survive to the vacuous-line
                    // filter, which decides their fate via preserve_empty
                    sized.push(line);
                } else {
                    sized.extend(pieces.into_iter().map(SubtitleLine::dialogue));
                }
            }
        }
    }

    let mut out = Vec::with_capacity(sized.len());
    for mut line in sized {
        line.text = strip_stray_fragments(&line.text);
        if options.preserve_empty || !strip_punctuation(&line.text).is_empty() {
            out.push(line);
        } else {
            trace!("dropping vacuous line: {:?}", line.text);
        }
    }
    out
}

/// Expand inline bracketed asides out of a dialogue line.
///
/// Asides that classify as direction become their own line at their
/// original position; the dialogue fragments around them merge into a
/// single line at the position of the first fragment, with a single space
/// inserted at a junction only when neither side already ends/starts with
/// whitespace or punctuation. An aside that classifies as dialogue is not
/// extracted and merges back inline.
fn expand_asides(line: &SubtitleLine, classifier: &Classifier) -> Vec<SubtitleLine> {
    let pieces = split_bracket_spans(&line.text);
    if pieces.len() <= 1 {
        return vec![line.clone()];
    }

    let mut out: Vec<SubtitleLine> = Vec::new();
    let mut dialogue_slot: Option<usize> = None;
    let mut dialogue_text = String::new();

    for piece in pieces {
        let (text, is_span) = match &piece {
            Piece::Plain(t) => (t.as_str(), false),
            Piece::Span(t) => (t.as_str(), true),
        };
        if is_span && classifier.classify(text) == LineKind::Direction {
            out.push(SubtitleLine::direction(text));
            continue;
        }
        if dialogue_slot.is_none() {
            dialogue_slot = Some(out.len());
            out.push(SubtitleLine::dialogue(""));
        }
        merge_fragment(&mut dialogue_text, text);
    }

    match dialogue_slot {
        Some(slot) if dialogue_text.trim().is_empty() => {
            out.remove(slot);
        }
        Some(slot) => {
            out[slot] = SubtitleLine::dialogue(dialogue_text);
        }
        None => {}
    }
    out
}

enum Piece {
    Plain(String),
    Span(String),
}

/// Split text into plain fragments and balanced bracketed spans (brackets
/// kept on the span).
fn split_bracket_spans(text: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut plain = String::new();
    let mut span = String::new();
    let mut closer: Option<char> = None;
    let mut opener: Option<char> = None;
    let mut depth = 0usize;

    for ch in text.chars() {
        match closer {
            None => {
                if let Some((_, close)) = BRACKET_PAIRS.iter().find(|(o, _)| *o == ch) {
                    if !plain.trim().is_empty() {
                        pieces.push(Piece::Plain(plain.trim().to_string()));
                    }
                    plain.clear();
                    span.clear();
                    span.push(ch);
                    closer = Some(*close);
                    opener = Some(ch);
                    depth = 1;
                } else {
                    plain.push(ch);
                }
            }
            Some(close) => {
                span.push(ch);
                if Some(ch) == opener {
                    depth += 1;
                } else if ch == close {
                    depth -= 1;
                    if depth == 0 {
                        pieces.push(Piece::Span(span.clone()));
                        span.clear();
                        closer = None;
                        opener = None;
                    }
                }
            }
        }
    }
    // Unterminated span: treat the remainder as plain text
    if !span.is_empty() {
        plain.push_str(&span);
    }
    if !plain.trim().is_empty() {
        pieces.push(Piece::Plain(plain.trim().to_string()));
    }
    pieces
}

fn merge_fragment(buffer: &mut String, fragment: &str) {
    if buffer.is_empty() {
        buffer.push_str(fragment);
        return;
    }
    let left_open = buffer
        .chars()
        .next_back()
        .is_some_and(|c| !c.is_whitespace() && !is_punct_char(c));
    let right_open = fragment
        .chars()
        .next()
        .is_some_and(|c| !c.is_whitespace() && !is_punct_char(c));
    if left_open && right_open {
        buffer.push(' ');
    }
    buffer.push_str(fragment);
}

/// Re-split dialogue text to the visible length budget. Preferred split
/// points, in order: the nearest preceding whitespace, a soft-punctuation
/// run within 5 characters of the limit (punctuation stays on the left
/// piece), a hard cut at the limit.
pub fn enforce_length(text: &str, max_line_chars: usize) -> Vec<String> {
    let limit = max_line_chars.max(4);
    let mut pieces = Vec::new();
    let mut rest: Vec<char> = text.trim().chars().collect();

    while rest.len() > limit {
        let cut = find_cut(&rest, limit);
        let (head, consumed) = cut;
        let piece: String = rest[..head].iter().collect();
        if !piece.trim().is_empty() {
            pieces.push(piece.trim().to_string());
        }
        rest.drain(..head + consumed);
        while rest.first().is_some_and(|c| c.is_whitespace()) {
            rest.remove(0);
        }
    }
    let tail: String = rest.iter().collect();
    if !tail.trim().is_empty() {
        pieces.push(tail.trim().to_string());
    }
    pieces
}

/// Returns (chars kept on the left, delimiter chars consumed).
fn find_cut(chars: &[char], limit: usize) -> (usize, usize) {
    // Nearest preceding whitespace anywhere in the window
    for idx in (1..limit).rev() {
        if chars[idx].is_whitespace() {
            return (idx, 1);
        }
    }
    // Soft-punctuation run within 5 characters of the limit; split after
    // the run so the punctuation stays with the left piece
    for idx in (limit.saturating_sub(5)..limit).rev() {
        if SOFT_PUNCTUATION.contains(&chars[idx]) {
            return (idx + 1, 0);
        }
    }
    (limit, 0)
}

/// Strip a stray leading closer or trailing opener left behind when an
/// aside was cut out at the very edge of a line.
pub fn strip_stray_fragments(text: &str) -> String {
    let mut out = text.trim().to_string();
    loop {
        let before = out.len();
        if let Some(first) = out.chars().next() {
            if let Some((open, _)) = pair_for_closer(first) {
                if !out.contains(open) {
                    out = out[first.len_utf8()..].trim_start().to_string();
                }
            }
        }
        if let Some(last) = out.chars().next_back() {
            if let Some((_, close)) = pair_for_opener(last) {
                if !out.contains(close) {
                    out.truncate(out.len() - last.len_utf8());
                    out = out.trim_end().to_string();
                }
            }
        }
        if out.len() == before {
            return out;
        }
    }
}

fn pair_for_closer(ch: char) -> Option<(char, char)> {
    BRACKET_PAIRS
        .iter()
        .chain(QUOTE_PAIRS.iter())
        .find(|(_, c)| *c == ch)
        .copied()
}

fn pair_for_opener(ch: char) -> Option<(char, char)> {
    BRACKET_PAIRS
        .iter()
        .chain(QUOTE_PAIRS.iter())
        .find(|(o, _)| *o == ch)
        .copied()
}

/// True for ASCII punctuation and the common CJK punctuation blocks.
pub fn is_punct_char(ch: char) -> bool {
    ch.is_ascii_punctuation()
        || matches!(ch,
            '\u{3000}'..='\u{303F}'
            | '\u{FF01}'..='\u{FF0F}'
            | '\u{FF1A}'..='\u{FF20}'
            | '\u{FF3B}'..='\u{FF40}'
            | '\u{FF5B}'..='\u{FF65}'
            | '\u{2010}'..='\u{205E}')
}

/// Remove whitespace and punctuation, keeping only content characters.
pub fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !is_punct_char(*c))
        .collect()
}
