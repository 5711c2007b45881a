//! Line tokenizer.
//!
//! Splits a raw line into spaces, dots, numbers and words. Spaces are never
//! coalesced, and only a space or a dot closes a run: `1h30m` and `Task-123`
//! are single words. The tokenizer never fails; malformed input surfaces
//! later as a parse error.

use std::fmt;

/// One lexical unit of a timesheet line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Space,
    Word(String),
    /// A run of ASCII digits. `text` is the run as written, so leading zeros
    /// and runs too long for `value` survive; `value` saturates at
    /// `u64::MAX` and only feeds bound checks.
    Number { value: u64, text: String },
    Dot,
}

impl Token {
    /// The source text this token was scanned from.
    pub fn value(&self) -> String {
        match self {
            Self::Space => " ".to_string(),
            Self::Word(word) => word.clone(),
            Self::Number { text, .. } => text.clone(),
            Self::Dot => ".".to_string(),
        }
    }

    pub const fn is_space(&self) -> bool {
        matches!(self, Self::Space)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Space => write!(f, "space"),
            Self::Word(word) => write!(f, "word({word})"),
            Self::Number { text, .. } => write!(f, "number({text})"),
            Self::Dot => write!(f, "dot"),
        }
    }
}

/// Concatenates token values back into text.
pub fn join(tokens: &[Token]) -> String {
    tokens.iter().map(Token::value).collect()
}

/// Splits `line` into tokens.
pub fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut run = String::new();

    for ch in line.chars() {
        match ch {
            ' ' => {
                flush(&mut run, &mut tokens);
                tokens.push(Token::Space);
            }
            '.' => {
                flush(&mut run, &mut tokens);
                tokens.push(Token::Dot);
            }
            _ => run.push(ch),
        }
    }
    flush(&mut run, &mut tokens);

    tokens
}

fn flush(run: &mut String, tokens: &mut Vec<Token>) {
    if run.is_empty() {
        return;
    }
    let text = std::mem::take(run);
    if text.bytes().all(|b| b.is_ascii_digit()) {
        tokens.push(Token::Number {
            value: parse_digits(&text),
            text,
        });
    } else {
        tokens.push(Token::Word(text));
    }
}

/// Parses an ASCII digit string, saturating at `u64::MAX` on overflow.
pub(crate) fn parse_digits(digits: &str) -> u64 {
    digits.bytes().fold(0_u64, |acc, b| {
        acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
    })
}
