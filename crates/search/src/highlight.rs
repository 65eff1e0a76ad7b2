//! Case-insensitive matching and excerpt windows

use serde::{Deserialize, Serialize};

/// Characters of context kept on each side of a match
pub const EXCERPT_CONTEXT: usize = 40;

const ELLIPSIS: &str = "…";

fn fold_char(c: char) -> impl Iterator<Item = char> {
    c.to_lowercase().map(|l| if l == 'ς' { 'σ' } else { l })
}

/// Case-folded copy of `text`
///
/// Characters are lowercased one at a time, so every offset in the folded
/// text maps back to a whole character of `text`. Final sigma folds to σ.
pub fn fold_case(text: &str) -> String {
    text.chars().flat_map(fold_char).collect()
}

/// True if `text` folds to exactly `query`
///
/// `query` must already be folded with [`fold_case`].
pub fn eq_ignore_case(text: &str, query: &str) -> bool {
    text.chars().flat_map(fold_char).eq(query.chars())
}

/// Byte range of the first case-insensitive occurrence of `needle`
///
/// `needle` must already be folded with [`fold_case`]. Offsets index into
/// `haystack`.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return Some((0, 0));
    }
    for (start, _) in haystack.char_indices() {
        let mut expected = needle.chars();
        let mut end = start;
        let mut matched = false;
        'scan: for (offset, c) in haystack[start..].char_indices() {
            for lower in fold_char(c) {
                match expected.next() {
                    Some(e) if e == lower => {}
                    _ => break 'scan,
                }
            }
            end = start + offset + c.len_utf8();
            if expected.as_str().is_empty() {
                matched = true;
                break;
            }
        }
        if matched {
            return Some((start, end));
        }
    }
    None
}

/// A short window of field text around a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    /// Window text, with `…` where it was cut
    pub text: String,
    /// Byte offset of the match in `text`
    pub start: usize,
    /// Byte offset just past the match in `text`
    pub end: usize,
}

impl Highlight {
    /// Excerpt of `field` around the first occurrence of `query`
    ///
    /// `None` if the query does not occur in the field.
    pub fn excerpt(field: &str, query: &str) -> Option<Highlight> {
        let (start, end) = find_ignore_case(field, query)?;

        let from = field[..start]
            .char_indices()
            .rev()
            .nth(EXCERPT_CONTEXT - 1)
            .map(|(i, _)| i)
            .unwrap_or(0);
        let to = field[end..]
            .char_indices()
            .nth(EXCERPT_CONTEXT)
            .map(|(i, _)| end + i)
            .unwrap_or(field.len());

        let mut text = String::with_capacity(to - from + 2 * ELLIPSIS.len());
        if from > 0 {
            text.push_str(ELLIPSIS);
        }
        let shift = text.len();
        text.push_str(&field[from..to]);
        if to < field.len() {
            text.push_str(ELLIPSIS);
        }

        Some(Highlight {
            text,
            start: start - from + shift,
            end: end - from + shift,
        })
    }

    /// The matched text
    pub fn matched(&self) -> &str {
        &self.text[self.start..self.end]
    }

    /// Window text with the match wrapped in `open` and `close`
    pub fn marked(&self, open: &str, close: &str) -> String {
        format!(
            "{}{}{}{}{}",
            &self.text[..self.start],
            open,
            self.matched(),
            close,
            &self.text[self.end..]
        )
    }
}
