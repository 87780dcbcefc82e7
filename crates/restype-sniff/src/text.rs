//! Plain-text classification for content with no binary signature.

use restype_core::OCTET_STREAM;

use crate::xml;

/// Lines considered when looking for a delimiter pattern.
const SAMPLE_LINES: usize = 20;

/// Header plus at least two rows.
const MIN_DELIMITED_LINES: usize = 3;

/// Classify `bytes` that matched no binary signature.
///
/// Binary-looking data (NUL bytes or invalid UTF-8) is
/// `application/octet-stream`. Text is refined to JSON, markup (see
/// [`xml::markup_type`]), CSV or TSV when its shape says so, and is
/// `text/plain` otherwise.
pub fn classify(bytes: &[u8]) -> &'static str {
    let Some(text) = as_text(bytes) else {
        return OCTET_STREAM;
    };
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return "application/json";
    }
    if trimmed.starts_with('<') {
        if let Some(mime) = xml::markup_type(trimmed) {
            return mime;
        }
    }
    if has_consistent_delimiter(text, b',') {
        return "text/csv";
    }
    if has_consistent_delimiter(text, b'\t') {
        return "text/tab-separated-values";
    }
    "text/plain"
}

/// `bytes` as UTF-8 text. A multi-byte character cut off at the end of the
/// buffer is tolerated since sniffing usually sees a prefix.
fn as_text(bytes: &[u8]) -> Option<&str> {
    if bytes.contains(&0) {
        return None;
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) if e.error_len().is_none() => std::str::from_utf8(&bytes[..e.valid_up_to()]).ok(),
        Err(_) => None,
    }
}

/// At least [`MIN_DELIMITED_LINES`] non-empty lines, each with the same
/// non-zero count of `delimiter`. A trailing partial line is ignored.
fn has_consistent_delimiter(text: &str, delimiter: u8) -> bool {
    let complete = match text.rfind('\n') {
        Some(end) if !text.ends_with('\n') => &text[..end],
        _ => text,
    };
    let mut counts = complete
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SAMPLE_LINES)
        .map(|line| line.bytes().filter(|b| *b == delimiter).count());

    let Some(first) = counts.next() else {
        return false;
    };
    let mut lines = 1;
    for count in counts {
        if count != first {
            return false;
        }
        lines += 1;
    }
    first > 0 && lines >= MIN_DELIMITED_LINES
}
