use log::{debug, error};

/// Script chunking module
/// Splits normalized script text into ordered, bounded-size chunks on
/// sentence boundaries so each chunk can be submitted as one segmentation
/// request. Chunking is lossless over non-whitespace content.

/// Characters that terminate a sentence.
const TERMINAL_PUNCTUATION: &[char] = &['。', '．', '.', '！', '!', '？', '?', '…'];

/// Closing quotes/brackets that stay attached to the sentence they close.
const TRAILING_CLOSERS: &[char] = &['」', '』', '”', '’', '）', ')', '】', ']', '"', '\''];

/// Split text into paragraphs on blank lines.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.trim().is_empty() {
                paragraphs.push(current.trim_end().to_string());
            }
            current.clear();
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    if !current.trim().is_empty() {
        paragraphs.push(current.trim_end().to_string());
    }
    paragraphs
}

/// Split a paragraph into sentences on terminal punctuation. A newline also
/// ends a sentence so no sentence ever carries a raw line break. Closing
/// quotes and brackets directly after the terminal mark stay with their
/// sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\n' || ch == '\r' {
            flush_sentence(&mut current, &mut sentences);
            continue;
        }
        current.push(ch);
        if TERMINAL_PUNCTUATION.contains(&ch) {
            // Runs of terminal punctuation ("……", "?!") belong to one sentence
            while let Some(&next) = chars.peek() {
                if TERMINAL_PUNCTUATION.contains(&next) || TRAILING_CLOSERS.contains(&next) {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            flush_sentence(&mut current, &mut sentences);
        }
    }
    flush_sentence(&mut current, &mut sentences);
    sentences
}

fn flush_sentence(current: &mut String, sentences: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}

/// Split script text into ordered chunks of at most `max_chunk_chars`
/// characters. Sentences accumulate into a buffer that is flushed whenever
/// the next sentence would overflow the budget; a single sentence larger
/// than the budget is hard-sliced into fixed-size pieces after flushing any
/// pending buffer.
///
/// The caller's budget is honored as given; zero is treated as 1 so the
/// hard-slice step stays well-defined.
pub fn chunk_script(text: &str, max_chunk_chars: usize) -> Vec<String> {
    let budget = max_chunk_chars.max(1);
    let mut chunks: Vec<String> = Vec::new();
    let mut buffer = String::new();
    let mut buffer_chars = 0usize;

    let mut flush = |buffer: &mut String, buffer_chars: &mut usize, chunks: &mut Vec<String>| {
        if !buffer.trim().is_empty() {
            chunks.push(buffer.trim().to_string());
        }
        buffer.clear();
        *buffer_chars = 0;
    };

    for paragraph in split_paragraphs(text) {
        for sentence in split_sentences(&paragraph) {
            let sentence_chars = sentence.chars().count();

            if sentence_chars > budget {
                flush(&mut buffer, &mut buffer_chars, &mut chunks);
                let glyphs: Vec<char> = sentence.chars().collect();
                for piece in glyphs.chunks(budget) {
                    chunks.push(piece.iter().collect());
                }
                continue;
            }

            // +1 accounts for the joining newline
            if buffer_chars > 0 && buffer_chars + sentence_chars + 1 > budget {
                flush(&mut buffer, &mut buffer_chars, &mut chunks);
            }
            if !buffer.is_empty() {
                buffer.push('\n');
                buffer_chars += 1;
            }
            buffer.push_str(&sentence);
            buffer_chars += sentence_chars;
        }
    }
    flush(&mut buffer, &mut buffer_chars, &mut chunks);

    verify_coverage(text, &chunks);
    debug!("chunked script into {} chunk(s)", chunks.len());
    chunks
}

/// Chunking must never lose script content. Compare non-whitespace character
/// counts before and after; a mismatch is a bug worth shouting about.
fn verify_coverage(text: &str, chunks: &[String]) {
    let input_chars = text.chars().filter(|c| !c.is_whitespace()).count();
    let output_chars: usize = chunks
        .iter()
        .map(|c| c.chars().filter(|ch| !ch.is_whitespace()).count())
        .sum();
    if input_chars != output_chars {
        error!(
            "CRITICAL: lost content during chunking! input {} chars, chunked {} chars",
            input_chars, output_chars
        );
    }
}
