//! Engine output normalization.
//!
//! `zq` has no single output shape: depending on buffering it emits one
//! bare object, one array, or one object per line. [`normalize`] accepts
//! all three and yields an ordered record list.
//!
//! Multi-line output is best-effort (bad lines are skipped). Single-payload
//! output is strict since there is no smaller unit to fall back to.

use serde_json::Value;

use crate::error::QueryError;

/// Ordered records extracted from engine output.
pub type NormalizedRecords = Vec<Value>;

/// Characters of context kept on each side of a parse failure.
const EXCERPT_RADIUS: usize = 40;

/// Characters of output shown in debug previews.
const PREVIEW_CHARS: usize = 300;

/// Result of folding newline-delimited output.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LineFold {
    pub records: Vec<Value>,
    /// Lines that failed the shape guard or did not parse.
    pub discarded: usize,
}

/// Normalize raw engine output into records.
pub fn normalize(text: &str) -> Result<NormalizedRecords, QueryError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    tracing::debug!(
        length = trimmed.len(),
        preview = %preview(trimmed, PREVIEW_CHARS),
        "Normalizing engine output",
    );

    let lines: Vec<&str> = trimmed
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect();

    let parsed = if lines.len() > 1 {
        let fold = fold_lines(&lines);
        tracing::debug!(
            parsed = fold.records.len(),
            discarded = fold.discarded,
            "Parsed newline-delimited objects",
        );
        Value::Array(fold.records)
    } else {
        parse_single(trimmed)?
    };

    Ok(match parsed {
        Value::Array(records) => records,
        other => vec![other],
    })
}

/// Parse each line as a standalone object, skipping anything that fails.
pub fn fold_lines(lines: &[&str]) -> LineFold {
    lines
        .iter()
        .enumerate()
        .fold(LineFold::default(), |mut acc, (index, line)| {
            match parse_object_line(line) {
                Some(value) => acc.records.push(value),
                None => {
                    tracing::warn!(line = index, text = %line.trim(), "Skipping unparseable output line");
                    acc.discarded += 1;
                }
            }
            acc
        })
}

/// Parse one line if it passes the `{ ... }` shape guard.
fn parse_object_line(line: &str) -> Option<Value> {
    let line = line.trim();
    if !(line.starts_with('{') && line.ends_with('}')) {
        return None;
    }
    serde_json::from_str(line).ok()
}

/// Parse a single payload, falling back to shape-guard extraction.
fn parse_single(text: &str) -> Result<Value, QueryError> {
    let direct_err = match serde_json::from_str(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let extracted = extract_array(text)
        .map(|s| ("array", s))
        .or_else(|| extract_object(text).map(|s| ("object", s)));

    match extracted {
        Some((shape, candidate)) => {
            tracing::debug!(shape, length = candidate.len(), "Extracted JSON from output");
            serde_json::from_str(candidate).map_err(|e| parse_error(text, &e))
        }
        None => {
            tracing::debug!("No JSON pattern found, using full output");
            Err(parse_error(text, &direct_err))
        }
    }
}

/// Leading `[` through the last `]`.
fn extract_array(text: &str) -> Option<&str> {
    extract_between(text, '[', ']')
}

/// Leading `{` through the last `}`.
fn extract_object(text: &str) -> Option<&str> {
    extract_between(text, '{', '}')
}

fn extract_between(text: &str, open: char, close: char) -> Option<&str> {
    if !text.starts_with(open) {
        return None;
    }
    text.rfind(close).map(|end| &text[..end + close.len_utf8()])
}

fn parse_error(text: &str, err: &serde_json::Error) -> QueryError {
    tracing::error!(
        length = text.len(),
        line = err.line(),
        column = err.column(),
        "Engine output failed to parse",
    );
    QueryError::OutputParse {
        length: text.len(),
        excerpt: excerpt(text, err.line(), err.column()),
        reason: err.to_string(),
    }
}

/// Escaped window of `text` around the 1-based `line`/`column` position.
///
/// `column` counts bytes, as reported by `serde_json`.
fn excerpt(text: &str, line: usize, column: usize) -> String {
    let line_text = text.split('\n').nth(line.saturating_sub(1)).unwrap_or(text);
    let byte_offset = column.saturating_sub(1);
    let center = line_text
        .char_indices()
        .take_while(|(i, _)| *i < byte_offset)
        .count();
    let chars: Vec<char> = line_text.chars().collect();
    let start = center.saturating_sub(EXCERPT_RADIUS);
    let end = (center + EXCERPT_RADIUS).min(chars.len());
    let window: String = chars[start..end].iter().collect();
    format!("{window:?}")
}

fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
