use log::trace;

use crate::line::LineKind;

/// Heuristic line classification module
/// A pure, ordered rule cascade that tags a text unit as dialogue or
/// direction. Bracket structure and explicit speaker labeling outrank
/// keyword density, so quoted dialogue that merely mentions a prop is not
/// mis-tagged as a stage direction.

/// Staging vocabulary: stage, lighting, sound, chorus, blackout, scenery
/// and the other production terms that mark a line as a direction.
pub const STAGING_KEYWORDS: &[&str] = &[
    "舞台", "舞臺", "台上", "臺上", "後台", "背景", "佈景", "布景", "道具",
    "燈光", "燈暗", "燈亮", "暗場", "亮場", "追光", "聚光",
    "音效", "音樂", "配樂", "鐘聲", "鼓聲", "掌聲",
    "開幕", "落幕", "幕啟", "幕落", "換場", "轉場", "中場",
    "合唱", "歌隊", "旁白", "畫外音", "字幕", "投影",
    "全體", "眾人", "群眾", "演員",
];

/// Physical-action vocabulary used by the short-line rule.
pub const ACTION_KEYWORDS: &[&str] = &[
    "坐下", "站起", "起身", "轉身", "走向", "跑向", "退場", "上場", "下場",
    "跪下", "躺下", "揮手", "點頭", "搖頭", "鞠躬", "擁抱", "停頓", "沉默",
    "環顧", "凝視", "嘆氣", "大笑", "痛哭",
];

/// Movement/gesture verbs for the last keyword rule. Broader and noisier
/// than `ACTION_KEYWORDS`, which is why this rule sits at the bottom of the
/// cascade.
pub const MOVEMENT_VERBS: &[&str] = &[
    "走", "跑", "站", "坐", "跳", "跪", "躺", "推", "拉", "抱", "揮",
    "望向", "看向", "拿起", "放下", "離開", "進入", "退到", "衝出",
];

const BRACKET_PAIRS: &[(char, char)] = &[
    ('（', '）'),
    ('(', ')'),
    ('【', '】'),
    ('[', ']'),
    ('〔', '〕'),
];

const QUOTE_MARKS: &[char] = &['「', '」', '『', '』', '“', '”', '"', '\''];

const TERMINAL_PUNCTUATION: &[char] = &['。', '．', '.', '！', '!', '？', '?', '…'];

const TRAILING_CLOSERS: &[char] = &['」', '』', '”', '’', '）', ')', '】', ']', '"', '\''];

/// Heuristic classifier. Pure: the same input always yields the same kind.
#[derive(Debug, Clone)]
pub struct Classifier {
    /// A speaker-label colon must appear within this many leading chars
    speaker_colon_cutoff: usize,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(6)
    }
}

type Rule = (&'static str, fn(&Classifier, &str) -> Option<LineKind>);

/// The cascade, first match wins. Order is semantic: structural rules
/// (brackets, speaker labels) must fire before keyword-density rules.
const RULES: &[Rule] = &[
    ("wrapped_staging", Classifier::rule_wrapped_staging),
    ("staging_prefix", Classifier::rule_staging_prefix),
    ("short_action", Classifier::rule_short_action),
    ("wrapped_non_staging", Classifier::rule_wrapped_non_staging),
    ("keyword_density", Classifier::rule_keyword_density),
    ("speaker_label", Classifier::rule_speaker_label),
    ("single_keyword", Classifier::rule_single_keyword),
    ("movement_verb", Classifier::rule_movement_verb),
];

impl Classifier {
    /// Create a classifier with the given speaker-colon cutoff.
    pub fn new(speaker_colon_cutoff: usize) -> Self {
        Self {
            speaker_colon_cutoff,
        }
    }

    /// Classify one text unit. Never fails; the default verdict is dialogue.
    pub fn classify(&self, text: &str) -> LineKind {
        let text = text.trim();
        for (name, rule) in RULES {
            if let Some(kind) = rule(self, text) {
                trace!("rule {} tagged {:?}: {}", name, kind, text);
                return kind;
            }
        }
        LineKind::Dialogue
    }

    /// Rule a: fully bracket-wrapped text whose interior is empty or
    /// mentions the staging vocabulary.
    fn rule_wrapped_staging(&self, text: &str) -> Option<LineKind> {
        let interior = bracket_interior(text)?;
        if interior.trim().is_empty()
            || contains_any(interior, STAGING_KEYWORDS)
            || contains_any(interior, ACTION_KEYWORDS)
        {
            Some(LineKind::Direction)
        } else {
            None
        }
    }

    /// Rule b: text starting with a staging-vocabulary keyword.
    fn rule_staging_prefix(&self, text: &str) -> Option<LineKind> {
        if STAGING_KEYWORDS.iter().any(|k| text.starts_with(k)) {
            Some(LineKind::Direction)
        } else {
            None
        }
    }

    /// Rule c: short text without terminal punctuation that names a
    /// physical action.
    fn rule_short_action(&self, text: &str) -> Option<LineKind> {
        if char_len(text) <= 16
            && !has_terminal_punctuation(text)
            && contains_any(text, ACTION_KEYWORDS)
        {
            Some(LineKind::Direction)
        } else {
            None
        }
    }

    /// Rule d: bracket-wrapped text that failed rule a is dialogue. The
    /// explicit negative stops bracketed non-staging text from being
    /// double-counted by the keyword rules below.
    fn rule_wrapped_non_staging(&self, text: &str) -> Option<LineKind> {
        bracket_interior(text).map(|_| LineKind::Dialogue)
    }

    /// Rule e: unbracketed, unquoted text with two or more staging hits.
    fn rule_keyword_density(&self, text: &str) -> Option<LineKind> {
        if !text.contains(QUOTE_MARKS) && keyword_hits(text) >= 2 {
            Some(LineKind::Direction)
        } else {
            None
        }
    }

    /// Rule f: a speaker-label colon within the leading cutoff terminates
    /// the cascade either way — a staging label is a direction, any other
    /// label is spoken dialogue.
    fn rule_speaker_label(&self, text: &str) -> Option<LineKind> {
        let label = speaker_label(text, self.speaker_colon_cutoff)?;
        if contains_any(&label, STAGING_KEYWORDS) {
            Some(LineKind::Direction)
        } else {
            Some(LineKind::Dialogue)
        }
    }

    /// Rule g: short unpunctuated text with exactly one staging hit.
    fn rule_single_keyword(&self, text: &str) -> Option<LineKind> {
        if !has_terminal_punctuation(text) && char_len(text) <= 24 && keyword_hits(text) == 1 {
            Some(LineKind::Direction)
        } else {
            None
        }
    }

    /// Rule h: no terminal punctuation and a movement/gesture verb.
    fn rule_movement_verb(&self, text: &str) -> Option<LineKind> {
        if !has_terminal_punctuation(text) && contains_any(text, MOVEMENT_VERBS) {
            Some(LineKind::Direction)
        } else {
            None
        }
    }
}

/// If the text is fully wrapped by one matching bracket pair, return the
/// interior. "（a）b（c）" is not wrapped: the first pair closes before the
/// end of the text.
fn bracket_interior(text: &str) -> Option<&str> {
    let mut chars = text.chars();
    let first = chars.next()?;
    let (open, close) = BRACKET_PAIRS.iter().find(|(o, _)| *o == first)?;
    let last = text.chars().next_back()?;
    if last != *close {
        return None;
    }

    let mut depth = 1usize;
    for (idx, ch) in text.char_indices().skip(1) {
        if ch == *open {
            depth += 1;
        } else if ch == *close {
            depth -= 1;
            if depth == 0 {
                // Wrapped only when the matching closer is the final char
                return if idx + ch.len_utf8() == text.len() {
                    Some(&text[first.len_utf8()..idx])
                } else {
                    None
                };
            }
        }
    }
    None
}

/// Count staging-vocabulary occurrences (staging terms plus physical
/// actions), summed over every keyword.
fn keyword_hits(text: &str) -> usize {
    STAGING_KEYWORDS
        .iter()
        .chain(ACTION_KEYWORDS.iter())
        .map(|k| text.matches(k).count())
        .sum()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

fn has_terminal_punctuation(text: &str) -> bool {
    text.trim_end_matches(TRAILING_CLOSERS)
        .chars()
        .next_back()
        .is_some_and(|c| TERMINAL_PUNCTUATION.contains(&c))
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Find a speaker label: the text before a colon that appears within the
/// first `cutoff` characters.
fn speaker_label(text: &str, cutoff: usize) -> Option<String> {
    for (pos, ch) in text.chars().enumerate() {
        if pos >= cutoff {
            return None;
        }
        if ch == '：' || ch == ':' {
            return Some(text.chars().take(pos).collect());
        }
    }
    None
}
