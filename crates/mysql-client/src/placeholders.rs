//! Placeholder rewriting.
//!
//! The server understands `?` for positional parameters and the driver
//! understands `:name` for named ones. Statements written in the DB-API
//! `pyformat` style (`%s`, `%(name)s`) are rewritten to those forms before
//! they are sent:
//!
//! | Input | Output |
//! |-------|--------|
//! | `%s` | `?` |
//! | `%(name)s` | `:name` |
//! | `%%` | `%` |
//!
//! Quoted literals, quoted identifiers and comments are copied unchanged.
//! Only statements that carry parameters are rewritten; a bare `%` in a
//! parameterless statement is the modulo operator.

use std::borrow::Cow;

/// Rewrite `pyformat` placeholders into driver placeholders.
///
/// Returns the input unchanged (borrowed) when it contains no `%`.
#[must_use]
pub fn rewrite_pyformat(sql: &str) -> Cow<'_, str> {
    if !sql.contains('%') {
        return Cow::Borrowed(sql);
    }

    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut i = 0;
    // Start of the pending run of bytes to copy verbatim.
    let mut copied = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i = skip_quoted(bytes, i, quote);
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = skip_line(bytes, i);
            }
            b'#' => {
                i = skip_line(bytes, i);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(bytes, i);
            }
            b'%' => {
                let replacement = match bytes.get(i + 1) {
                    Some(b's') => Some(("?".to_string(), 2)),
                    Some(b'%') => Some(("%".to_string(), 2)),
                    Some(b'(') => named_placeholder(sql, i),
                    _ => None,
                };
                match replacement {
                    Some((text, consumed)) => {
                        out.push_str(&sql[copied..i]);
                        out.push_str(&text);
                        i += consumed;
                        copied = i;
                    }
                    None => i += 1,
                }
            }
            _ => i += 1,
        }
    }

    out.push_str(&sql[copied..]);
    Cow::Owned(out)
}

/// Check whether `keyword` appears as a word outside literals and comments.
///
/// Matching is ASCII case-insensitive. Executable comments (`/*! ... */`)
/// are scanned like code, since the server runs them.
#[must_use]
pub fn contains_keyword(sql: &str, keyword: &str) -> bool {
    let bytes = sql.as_bytes();
    let keyword = keyword.as_bytes();
    if keyword.is_empty() {
        return false;
    }
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'$';

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i = skip_quoted(bytes, i, quote);
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = skip_line(bytes, i);
            }
            b'#' => {
                i = skip_line(bytes, i);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') && bytes.get(i + 2) != Some(&b'!') => {
                i = skip_block_comment(bytes, i);
            }
            b if is_word(b) => {
                let start = i;
                while i < bytes.len() && is_word(bytes[i]) {
                    i += 1;
                }
                if bytes[start..i].eq_ignore_ascii_case(keyword) {
                    return true;
                }
            }
            _ => i += 1,
        }
    }
    false
}

/// Parse `%(name)s` starting at `start`; returns `(":name", consumed)`.
fn named_placeholder(sql: &str, start: usize) -> Option<(String, usize)> {
    let rest = &sql[start + 2..];
    let close = rest.find(')')?;
    let name = &rest[..close];
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid || rest.as_bytes().get(close + 1) != Some(&b's') {
        return None;
    }
    Some((format!(":{name}"), 2 + close + 2))
}

fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if quote != b'`' => i += 2,
            b if b == quote => {
                if bytes.get(i + 1) == Some(&quote) {
                    i += 2;
                } else {
                    return i + 1;
                }
            }
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_line(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| *b == b'\n')
        .map_or(bytes.len(), |pos| start + pos + 1)
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start + 2..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(bytes.len(), |pos| start + 2 + pos + 2)
}
