//! Duration notations.
//!
//! Two notations are accepted for the duration column:
//! - decimal hours, `H.F`: a one-digit fraction is tenths of an hour
//!   (`F * 6` minutes), a two-digit fraction is hundredths (`F * 3 / 5`,
//!   integer division);
//! - literal `XhYm`, where either unit may be omitted; a bare number is
//!   whole hours.
//!
//! The reverse direction ([`minutes_as_fraction`]) renders minutes with
//! `minutes * 10 / 6`, which inverts the one-digit rule exactly. Minutes
//! that came from a two-digit fraction do not always round-trip.

use std::fmt;

use crate::error::ParseError;
use crate::token::{Token, parse_digits};

const MAX_HOURS: u64 = 24;
const MAX_MINUTES: u64 = 60;

/// Hours and minutes decoded from a duration column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkTime {
    pub hours: u8,
    pub minutes: u8,
}

impl WorkTime {
    pub const fn new(hours: u8, minutes: u8) -> Self {
        Self { hours, minutes }
    }
}

impl fmt::Display for WorkTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_decimal(u32::from(self.hours), u32::from(self.minutes)))
    }
}

/// Decodes the token run accumulated for the duration column.
pub fn decode(run: &[Token]) -> Result<WorkTime, ParseError> {
    match run {
        [Token::Number { value, .. }] => Ok(WorkTime::new(hours(*value)?, 0)),
        [Token::Word(word)] => decode_literal(word),
        [
            Token::Number { value: whole, .. },
            Token::Dot,
            Token::Number {
                value: fraction,
                text,
            },
        ] => Ok(WorkTime::new(hours(*whole)?, fraction_to_minutes(*fraction, text.len())?)),
        _ => Err(ParseError::InvalidTime),
    }
}

/// Converts a decimal fraction of an hour into minutes.
pub fn fraction_to_minutes(fraction: u64, width: usize) -> Result<u8, ParseError> {
    let minutes = match width {
        1 => fraction * 6,
        2 => fraction * 3 / 5,
        _ => return Err(ParseError::InvalidTime),
    };
    u8::try_from(minutes).map_err(|_| ParseError::InvalidTime)
}

fn decode_literal(word: &str) -> Result<WorkTime, ParseError> {
    let mut time = WorkTime::default();
    let mut pending = String::new();
    let mut seen_hours = false;
    let mut seen_minutes = false;

    for ch in word.chars() {
        match ch {
            '0'..='9' => pending.push(ch),
            'h' if !pending.is_empty() && !seen_hours && !seen_minutes => {
                time.hours = hours(parse_digits(&pending))?;
                seen_hours = true;
                pending.clear();
            }
            'm' if !pending.is_empty() && !seen_minutes => {
                time.minutes = minutes(parse_digits(&pending))?;
                seen_minutes = true;
                pending.clear();
            }
            _ => return Err(ParseError::InvalidTime),
        }
    }

    if !pending.is_empty() || !(seen_hours || seen_minutes) {
        return Err(ParseError::InvalidTime);
    }
    Ok(time)
}

fn hours(value: u64) -> Result<u8, ParseError> {
    if value >= MAX_HOURS {
        return Err(ParseError::InvalidTime);
    }
    u8::try_from(value).map_err(|_| ParseError::InvalidTime)
}

fn minutes(value: u64) -> Result<u8, ParseError> {
    if value >= MAX_MINUTES {
        return Err(ParseError::InvalidTime);
    }
    u8::try_from(value).map_err(|_| ParseError::InvalidTime)
}

/// Renders minutes as the digits after the decimal point.
///
/// `30` → `"5"`, `45` → `"75"`, `0` → `"0"`.
pub fn minutes_as_fraction(minutes: u32) -> String {
    let value = minutes * 10 / 6;
    if value % 10 == 0 {
        (value / 10).to_string()
    } else {
        value.to_string()
    }
}

/// Renders `hours` and `minutes` as `H.F`.
pub fn format_decimal(hours: u32, minutes: u32) -> String {
    format!("{hours}.{}", minutes_as_fraction(minutes))
}
