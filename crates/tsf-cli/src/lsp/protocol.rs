//! The subset of language server protocol types the server uses.

use serde::{Deserialize, Serialize};
use tsf_core::TokenReady;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn on_line(line: u32, start: u32, end: u32) -> Self {
        Self {
            start: Position::new(line, start),
            end: Position::new(line, end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: u8,
    pub source: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextDocumentIdentifier {
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextDocumentItem {
    pub uri: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidOpenParams {
    pub text_document: TextDocumentItem,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentChange {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidChangeParams {
    pub text_document: TextDocumentIdentifier,
    pub content_changes: Vec<ContentChange>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidSaveParams {
    pub text_document: TextDocumentIdentifier,
    #[serde(default)]
    pub text: Option<String>,
}

/// Parameters carrying only a document: close, semantic tokens, formatting.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentParams {
    pub text_document: TextDocumentIdentifier,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionParams {
    pub text_document: TextDocumentIdentifier,
    pub position: Position,
}

/// Length of `text` in UTF-16 code units, the protocol's default column unit.
pub fn utf16_len(text: &str) -> u32 {
    u32::try_from(text.encode_utf16().count()).unwrap_or(u32::MAX)
}

/// Rewrites byte columns and lengths of `tokens` into UTF-16 code units.
///
/// A token whose span does not fall on character boundaries of its line is
/// left untouched.
pub fn utf16_tokens<S: AsRef<str>>(tokens: &[TokenReady], lines: &[S]) -> Vec<TokenReady> {
    tokens
        .iter()
        .map(|token| {
            let line = lines.get(token.line as usize).map_or("", |line| line.as_ref());
            let start = token.column as usize;
            let end = start + token.length as usize;
            match (line.get(..start), line.get(start..end)) {
                (Some(before), Some(text)) => TokenReady {
                    column: utf16_len(before),
                    length: utf16_len(text),
                    ..*token
                },
                _ => *token,
            }
        })
        .collect()
}

/// Edits that strip trailing spaces and ensure a final newline.
pub fn format_edits(text: &str) -> Vec<TextEdit> {
    if text.is_empty() {
        return Vec::new();
    }
    let lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;
    let needs_newline = !text.ends_with('\n');

    let mut edits = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        let line_no = u32::try_from(index).unwrap_or(u32::MAX);
        let trimmed = line.trim_end_matches(' ');
        let is_last = index == last && needs_newline;
        if trimmed.len() < line.len() || is_last {
            edits.push(TextEdit {
                range: Range::on_line(line_no, utf16_len(trimmed), utf16_len(line)),
                new_text: if is_last { "\n".to_string() } else { String::new() },
            });
        }
    }
    edits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting_strips_spaces_and_adds_newline() {
        let edits = format_edits("aaa 1.0 x  \nbbb 2.0");
        assert_eq!(
            edits,
            vec![
                TextEdit {
                    range: Range::on_line(0, 9, 11),
                    new_text: String::new(),
                },
                TextEdit {
                    range: Range::on_line(1, 7, 7),
                    new_text: "\n".to_string(),
                },
            ]
        );
    }

    #[test]
    fn formatting_replaces_trailing_spaces_on_last_line_with_newline() {
        let edits = format_edits("aaa 1.0 x   ");
        assert_eq!(
            edits,
            vec![TextEdit {
                range: Range::on_line(0, 9, 12),
                new_text: "\n".to_string(),
            }]
        );
    }

    #[test]
    fn formatted_document_needs_no_edits() {
        assert!(format_edits("aaa 1.0 x\nbbb 2.0 y\n").is_empty());
        assert!(format_edits("").is_empty());
    }

    #[test]
    fn columns_count_utf16_units() {
        let edits = format_edits("aaa 1.0 zażółć \n");
        assert_eq!(edits[0].range, Range::on_line(0, 14, 15));
    }

    #[test]
    fn token_columns_become_utf16() {
        use tsf_core::SemanticType;

        let token = |column, length, kind| TokenReady {
            line: 0,
            column,
            length,
            kind,
        };
        let lines = ["aaa 1.0 zażółć gęślą"];
        let bytes = vec![
            token(0, 3, SemanticType::Class),
            token(4, 3, SemanticType::Property),
            token(8, 10, SemanticType::String),
            token(19, 8, SemanticType::String),
        ];
        assert_eq!(
            utf16_tokens(&bytes, &lines),
            vec![
                token(0, 3, SemanticType::Class),
                token(4, 3, SemanticType::Property),
                token(8, 6, SemanticType::String),
                token(15, 5, SemanticType::String),
            ]
        );
    }

    #[test]
    fn camel_case_params() {
        let params: DidChangeParams = serde_json::from_value(serde_json::json!({
            "textDocument": {"uri": "file:///a", "version": 2},
            "contentChanges": [{"text": "aaa 1.0 x"}]
        }))
        .unwrap();
        assert_eq!(params.text_document.uri, "file:///a");
        assert_eq!(params.content_changes[0].text, "aaa 1.0 x");
    }
}
