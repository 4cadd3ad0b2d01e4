use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::SegmentationConfig;
use crate::classifier::Classifier;
use crate::line::{LineKind, SubtitleLine};
use crate::postprocess::{postprocess, strip_punctuation, PostProcessOptions};
use crate::segmenter::parse::{parse_response, RawSegment};

/// Service-output validation module
/// A parsed response is only accepted once every line can be traced back to
/// its source chunk. Rejections name the reason; all of them are handled by
/// per-chunk fallback, never by aborting the run.

/// Why a chunk's service output was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// All recovery stages failed to parse the response
    ParseFailure,
    /// Normalization left zero lines
    EmptyOutput,
    /// Every line is an ordinal placeholder ("第三句") instead of content
    PlaceholderOutput,
    /// At least one line has no meaningful overlap with the source chunk
    InvalidOutput,
}

impl Rejection {
    /// Short diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::ParseFailure => "PARSE_FAILURE",
            Rejection::EmptyOutput => "EMPTY_OUTPUT",
            Rejection::PlaceholderOutput => "PLACEHOLDER_OUTPUT",
            Rejection::InvalidOutput => "INVALID_OUTPUT",
        }
    }
}

/// Ordinal placeholder shapes, matched against punctuation-stripped text.
static PLACEHOLDER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^第[0-9０-９零一二三四五六七八九十百千两兩]+[句行段條条]$")
        .expect("placeholder pattern is valid")
});

/// Validate one chunk's response. On success the returned lines are already
/// normalized through the post-processor.
pub fn validate_response(
    response: &str,
    chunk: &str,
    classifier: &Classifier,
    config: &SegmentationConfig,
) -> Result<Vec<SubtitleLine>, Rejection> {
    let Some(segments) = parse_response(response) else {
        return Err(Rejection::ParseFailure);
    };

    let lines = normalize_segments(segments, classifier);
    let lines = postprocess(
        lines,
        classifier,
        &PostProcessOptions {
            max_line_chars: config.max_line_chars,
            preserve_empty: false,
        },
    );

    if lines.is_empty() {
        return Err(Rejection::EmptyOutput);
    }

    if lines
        .iter()
        .all(|l| PLACEHOLDER_PATTERN.is_match(&strip_punctuation(&l.text)))
    {
        return Err(Rejection::PlaceholderOutput);
    }

    let source = strip_punctuation(chunk);
    for line in &lines {
        if !is_grounded(&line.text, &source, config) {
            debug!("ungrounded line rejected: {:?}", line.text);
            return Err(Rejection::InvalidOutput);
        }
    }

    Ok(lines)
}

/// Normalize raw parsed elements into typed lines, inferring a missing or
/// unrecognized type through the classifier.
fn normalize_segments(segments: Vec<RawSegment>, classifier: &Classifier) -> Vec<SubtitleLine> {
    let mut lines = Vec::with_capacity(segments.len());
    for segment in segments {
        let Some(text) = segment.text else {
            continue;
        };
        let kind = segment
            .segment_type
            .as_deref()
            .and_then(parse_kind)
            .unwrap_or_else(|| classifier.classify(&text));
        lines.push(SubtitleLine::new(text, kind));
    }
    lines
}

fn parse_kind(raw: &str) -> Option<LineKind> {
    match raw.trim().to_lowercase().as_str() {
        "dialogue" | "dialog" | "speech" | "對白" | "台詞" | "臺詞" => Some(LineKind::Dialogue),
        "direction" | "stage" | "stage_direction" | "action" | "指示" | "舞台指示" => {
            Some(LineKind::Direction)
        }
        _ => None,
    }
}

/// Grounding/overlap check: the punctuation-stripped line must be contained
/// verbatim in the stripped source, or, for text longer than the minimum
/// probe, some contiguous substring of probe length must be.
fn is_grounded(text: &str, stripped_source: &str, config: &SegmentationConfig) -> bool {
    let stripped = strip_punctuation(text);
    if stripped.is_empty() || stripped_source.contains(&stripped) {
        return true;
    }

    let glyphs: Vec<char> = stripped.chars().collect();
    if glyphs.len() <= config.grounding_probe_min {
        return false;
    }
    for len in config.grounding_probe_min..=config.grounding_probe_max.min(glyphs.len()) {
        for window in glyphs.windows(len) {
            let probe: String = window.iter().collect();
            if stripped_source.contains(&probe) {
                return true;
            }
        }
    }
    false
}
