// src/core/normalizer.rs

use crate::constants::{COMMENT_MARKER, LINE_CONTINUATION};

/// A logical script line, tagged with the 1-based number of its first physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

/// Turns raw script text into the logical lines the parser consumes.
///
/// Blank lines and comment lines are dropped first. A line ending in `\` is
/// then joined with the next remaining line: the backslash is removed and no
/// space is inserted. The indentation of the first physical line of each group is kept.
pub fn normalize(source: &str) -> Vec<SourceLine> {
    normalize_lines(source.lines())
}

/// Same as [`normalize`], for input that is already split into lines.
pub fn normalize_lines<'a, I>(lines: I) -> Vec<SourceLine>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut logical = Vec::new();
    let mut pending: Option<SourceLine> = None;

    for (index, raw) in lines.into_iter().enumerate() {
        let number = index + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
            continue;
        }

        let current = match pending.take() {
            Some(mut group) => {
                group.text.push_str(raw);
                group
            }
            None => SourceLine {
                number,
                text: raw.to_string(),
            },
        };

        match current.text.strip_suffix(LINE_CONTINUATION) {
            Some(joined) => {
                pending = Some(SourceLine {
                    number: current.number,
                    text: joined.to_string(),
                });
            }
            None => logical.push(current),
        }
    }

    // A trailing backslash on the last line simply has nothing to join.
    if let Some(group) = pending {
        if !group.text.trim().is_empty() {
            logical.push(group);
        }
    }

    logical
}
