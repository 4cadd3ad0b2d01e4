use log::debug;
use serde::Deserialize;

/// Lenient response parsing module
/// Service responses are untrusted free-form text that usually embeds a
/// JSON array. Recovery is a small named-stage pipeline rather than nested
/// exception handling: fence strip, direct decode, bracket salvage with
/// trailing repair, object-scan reconstruction. Only when every stage fails
/// does the caller record a parse failure.

/// One element of the service's output, decoded permissively. Field name
/// drift ("content" for "text", "kind" for "type") is tolerated; anything
/// else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSegment {
    /// Line text under any of the accepted field names
    #[serde(default, alias = "content", alias = "line")]
    pub text: Option<String>,
    /// Declared line type, if any
    #[serde(default, rename = "type", alias = "kind")]
    pub segment_type: Option<String>,
}

/// Parse a response through the recovery stages. `None` means all four
/// stages failed.
pub fn parse_response(response: &str) -> Option<Vec<RawSegment>> {
    let stripped = strip_code_fences(response);

    if let Ok(segments) = serde_json::from_str::<Vec<RawSegment>>(stripped) {
        debug!("response parsed at stage: direct");
        return Some(segments);
    }

    if let Some(segments) = salvage_bracketed_array(stripped) {
        debug!("response parsed at stage: bracket salvage");
        return Some(segments);
    }

    let scanned = scan_objects(stripped);
    if !scanned.is_empty() {
        debug!("response parsed at stage: object scan ({} objects)", scanned.len());
        return Some(scanned);
    }

    None
}

/// Remove surrounding markdown code-fence markers, tolerating a language
/// tag on the opening fence.
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line ("json", "text", ...)
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

/// Stage 3: take the substring between the first `[` and the last `]` and
/// parse it, repairing an unterminated trailing object or array when the
/// service ran out of tokens mid-reply.
fn salvage_bracketed_array(text: &str) -> Option<Vec<RawSegment>> {
    let start = text.find('[')?;
    let candidate = match text.rfind(']') {
        Some(end) if end > start => &text[start..=end],
        _ => &text[start..],
    };

    if let Ok(segments) = serde_json::from_str::<Vec<RawSegment>>(candidate) {
        return Some(segments);
    }

    // Truncate to the last complete object and close the array
    if let Some(last_brace) = candidate.rfind('}') {
        let mut repaired = candidate[..=last_brace].trim_end().to_string();
        if !repaired.ends_with(']') {
            repaired.push(']');
        }
        if let Ok(segments) = serde_json::from_str::<Vec<RawSegment>>(&repaired) {
            return Some(segments);
        }
    }

    // Trailing comma after the last object
    let trimmed = candidate.trim_end_matches(']').trim_end().trim_end_matches(',');
    let repaired = format!("{}]", trimmed);
    serde_json::from_str::<Vec<RawSegment>>(&repaired).ok()
}

/// Stage 4: reconstruct an array from every balanced `{...}` substring.
/// The scanner is string-aware so braces inside text do not break pairing.
fn scan_objects(text: &str) -> Vec<RawSegment> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(idx);
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(begin) = start.take() {
                            let object = &text[begin..=idx];
                            if let Ok(segment) = serde_json::from_str::<RawSegment>(object) {
                                segments.push(segment);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    segments
}
