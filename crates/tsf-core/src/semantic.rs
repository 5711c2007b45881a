//! Semantic token projection for editor highlighting.
//!
//! Lines that parse into a valid entry are re-scanned to find the byte spans
//! of the category, the duration and each remaining word. The absolute spans
//! are then delta-encoded into the flat integer stream editors expect.

use serde::Serialize;

use crate::parser::LineParser;
use crate::rules::Classifier;
use crate::timesheet::WorkItem;

/// Token types, in legend order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Class,
    Property,
    String,
    Comment,
}

impl SemanticType {
    pub const ALL: [Self; 4] = [Self::Class, Self::Property, Self::String, Self::Comment];

    /// Position of this type in the legend.
    pub const fn index(self) -> u32 {
        match self {
            Self::Class => 0,
            Self::Property => 1,
            Self::String => 2,
            Self::Comment => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Property => "property",
            Self::String => "string",
            Self::Comment => "comment",
        }
    }

    /// Legend names for the protocol's capability announcement.
    pub fn legend() -> Vec<&'static str> {
        Self::ALL.iter().map(|kind| kind.as_str()).collect()
    }
}

/// One highlighted span with absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenReady {
    pub line: u32,
    pub column: u32,
    pub length: u32,
    pub kind: SemanticType,
}

/// Projects every line that parses into a valid entry.
///
/// Failing lines and holidays contribute nothing.
pub fn project<C, S>(parser: &LineParser<'_, C>, lines: &[S]) -> Vec<TokenReady>
where
    C: Classifier + ?Sized,
    S: AsRef<str>,
{
    let mut tokens = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let valid = match parser.parse_line(line) {
            Ok(WorkItem::Entry(entry)) => entry.validate().is_ok(),
            Ok(WorkItem::Holiday(_)) | Err(_) => false,
        };
        if valid {
            tokens.extend(project_line(to_u32(index), line));
        }
    }
    tokens
}

/// Spans of an already-parsed line: category, duration, then each word.
pub fn project_line(line: u32, text: &str) -> Vec<TokenReady> {
    words(text)
        .enumerate()
        .map(|(position, (column, word))| TokenReady {
            line,
            column: to_u32(column),
            length: to_u32(word.len()),
            kind: match position {
                0 => SemanticType::Class,
                1 => SemanticType::Property,
                _ => SemanticType::String,
            },
        })
        .collect()
}

/// Space-separated words of `text` with their byte offsets.
fn words(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = text.len() - text.trim_start().len();
    text.trim().split(' ').filter_map(move |piece| {
        let start = offset;
        offset += piece.len() + 1;
        (!piece.is_empty()).then_some((start, piece))
    })
}

/// Delta-encodes tokens as `(line, column, length, type, modifiers)` groups.
///
/// The column is relative to the previous token only on the same line.
/// Tokens must be sorted by line, then column, as [`project`] yields them;
/// a token that goes backwards gets a zero delta.
pub fn encode(tokens: &[TokenReady]) -> Vec<u32> {
    let mut data = Vec::with_capacity(tokens.len() * 5);
    let mut previous: Option<&TokenReady> = None;
    for token in tokens {
        let (line, column) = match previous {
            Some(prev) if prev.line == token.line => (0, token.column.saturating_sub(prev.column)),
            Some(prev) => (token.line.saturating_sub(prev.line), token.column),
            None => (token.line, token.column),
        };
        data.extend([line, column, token.length, token.kind.index(), 0]);
        previous = Some(token);
    }
    data
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
