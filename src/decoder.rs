use encoding_rs::{Encoding, BIG5, GBK, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use log::debug;

/// Script byte decoding module
/// Picks the best-scoring character encoding for an uploaded script buffer.
/// Decoding never fails: the worst case is a best-effort UTF-8 decode with
/// replacement characters.

/// A decoded script together with the encoding label that won the scoring.
#[derive(Debug, Clone)]
pub struct DecodedScript {
    /// Decoded text, leading BOM stripped
    pub text: String,
    /// Label of the winning encoding
    pub encoding: &'static str,
}

/// Candidate encodings the decoder tries.
///
/// UTF-32 is not covered by encoding_rs (it deliberately omits it), so the
/// two UTF-32 variants are decoded inline. They are only ever candidates
/// when announced by a BOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    Rs(&'static Encoding),
    Utf32Le,
    Utf32Be,
}

impl Candidate {
    fn label(self) -> &'static str {
        match self {
            Candidate::Rs(enc) => enc.name(),
            Candidate::Utf32Le => "UTF-32LE",
            Candidate::Utf32Be => "UTF-32BE",
        }
    }

    fn is_utf_family(self) -> bool {
        match self {
            Candidate::Rs(enc) => {
                enc == UTF_8 || enc == UTF_16LE || enc == UTF_16BE
            }
            Candidate::Utf32Le | Candidate::Utf32Be => true,
        }
    }

    fn decode(self, raw: &[u8]) -> String {
        match self {
            // BOM handling is deferred: the BOM decodes to U+FEFF and is
            // stripped from the winner, so every candidate is scored over
            // the same input.
            Candidate::Rs(enc) => enc.decode_without_bom_handling(raw).0.into_owned(),
            Candidate::Utf32Le => decode_utf32(raw, u32::from_le_bytes),
            Candidate::Utf32Be => decode_utf32(raw, u32::from_be_bytes),
        }
    }
}

/// Decode a raw script buffer, choosing the best-scoring encoding.
///
/// The candidate list starts with a BOM hit when one is present, then
/// UTF-8, the UTF-16 variants, two legacy CJK multi-byte encodings and a
/// single-byte fallback. Each candidate decode is scored and the highest
/// scoring non-empty result wins; ties go to the earlier candidate.
pub fn decode_script(raw: &[u8]) -> DecodedScript {
    if raw.is_empty() {
        return DecodedScript {
            text: String::new(),
            encoding: "UTF-8",
        };
    }

    let mut candidates: Vec<Candidate> = Vec::with_capacity(8);
    if let Some(bom) = sniff_bom(raw) {
        // A BOM is as close to ground truth as this ever gets. A clean
        // decode under the announced encoding wins outright; scoring only
        // arbitrates when the BOM lied (mojibake of a legacy encoding can
        // out-score a correct UTF decode on raw CJK density).
        let text = bom.decode(raw);
        let stripped = text.trim_start_matches('\u{feff}');
        if !stripped.is_empty() && !stripped.contains('\u{FFFD}') {
            return DecodedScript {
                text: strip_bom(text),
                encoding: bom.label(),
            };
        }
        candidates.push(bom);
    }

    // Strictly valid UTF-8 is conclusive the same way a truthful BOM is:
    // multi-byte CJK sequences almost never pass UTF-8 validation by
    // accident, while a legacy double-byte reading of the same bytes can
    // out-score the correct decode on ideograph density alone.
    if candidates.is_empty() {
        if let Ok(text) = std::str::from_utf8(raw) {
            return DecodedScript {
                text: strip_bom(text.to_string()),
                encoding: "UTF-8",
            };
        }
    }

    for fixed in [
        Candidate::Rs(UTF_8),
        Candidate::Rs(UTF_16LE),
        Candidate::Rs(UTF_16BE),
        Candidate::Rs(GBK),
        Candidate::Rs(BIG5),
        Candidate::Rs(WINDOWS_1252),
    ] {
        if !candidates.contains(&fixed) {
            candidates.push(fixed);
        }
    }

    let mut best: Option<(i64, Candidate, String)> = None;
    for candidate in candidates {
        let text = candidate.decode(raw);
        if text.trim_start_matches('\u{feff}').is_empty() {
            continue;
        }
        let score = score_decode(&text, candidate.is_utf_family());
        debug!("decode candidate {} scored {}", candidate.label(), score);
        let better = match &best {
            Some((best_score, _, _)) => score > *best_score,
            None => true,
        };
        if better {
            best = Some((score, candidate, text));
        }
    }

    match best {
        Some((_, candidate, text)) => DecodedScript {
            text: strip_bom(text),
            encoding: candidate.label(),
        },
        // Every candidate decoded to nothing; fall back to best-effort UTF-8
        None => DecodedScript {
            text: strip_bom(UTF_8.decode_without_bom_handling(raw).0.into_owned()),
            encoding: "UTF-8",
        },
    }
}

/// Detect a leading byte-order-mark. UTF-32LE must be checked before
/// UTF-16LE because their BOMs share a prefix.
fn sniff_bom(raw: &[u8]) -> Option<Candidate> {
    if raw.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some(Candidate::Rs(UTF_8))
    } else if raw.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        Some(Candidate::Utf32Le)
    } else if raw.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        Some(Candidate::Utf32Be)
    } else if raw.starts_with(&[0xFF, 0xFE]) {
        Some(Candidate::Rs(UTF_16LE))
    } else if raw.starts_with(&[0xFE, 0xFF]) {
        Some(Candidate::Rs(UTF_16BE))
    } else {
        None
    }
}

/// Score a decoded candidate. CJK ideographs weigh heavily because the
/// scripts this system handles are CJK-dominant; a run of Latin-1-range
/// characters is the usual signature of a mojibake decode of multi-byte
/// input, and replacement markers are outright decode failures.
fn score_decode(text: &str, utf_family: bool) -> i64 {
    let mut score: i64 = if utf_family { 5 } else { 0 };
    for ch in text.chars() {
        score += match ch {
            '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}' => 6,
            '\u{20}'..='\u{7E}' => 2,
            '\u{80}'..='\u{FF}' => -3,
            '\u{FFFD}' => -20,
            _ => 0,
        };
    }
    score
}

fn strip_bom(text: String) -> String {
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

fn decode_utf32(raw: &[u8], from_bytes: fn([u8; 4]) -> u32) -> String {
    let mut out = String::with_capacity(raw.len() / 4);
    let mut chunks = raw.chunks_exact(4);
    for chunk in &mut chunks {
        let value = from_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        out.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
    }
    if !chunks.remainder().is_empty() {
        out.push('\u{FFFD}');
    }
    out
}
