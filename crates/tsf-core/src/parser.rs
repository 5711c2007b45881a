//! Line parser.
//!
//! A line is `category duration [task] comment...`. Tokens drive a four-state
//! machine, Category → Hours → Task → Comment, through the pure
//! [`transition`] function; the [`LineParser`] folds the emitted [`Effect`]s
//! into a [`TimesheetEntry`].
//!
//! On a holiday every non-blank line becomes a [`Holiday`] and the state
//! machine is bypassed.
//!
//! The parser does not check entry bounds; callers run
//! [`TimesheetEntry::validate`] afterwards.

use crate::duration::{self, WorkTime};
use crate::error::ParseError;
use crate::rules::Classifier;
use crate::timesheet::{Day, Holiday, TimesheetEntry, WorkItem};
use crate::token::{self, Token};

/// Parser state. The token run being accumulated travels with the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Category(Vec<Token>),
    Hours(Vec<Token>),
    Task,
    /// Terminal: every remaining token belongs to the comment.
    Comment,
}

impl State {
    pub const fn initial() -> Self {
        Self::Category(Vec::new())
    }
}

/// What a transition contributes to the entry under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Category(String),
    Duration(WorkTime),
    Task(String),
    Comment(Token),
}

/// Advances the state machine by one token.
pub fn transition<C>(state: State, token: Token, classifier: &C) -> Result<(State, Effect), ParseError>
where
    C: Classifier + ?Sized,
{
    match state {
        State::Category(mut run) => {
            if token.is_space() {
                let category = accept_category(&run, classifier)?;
                Ok((State::Hours(Vec::new()), Effect::Category(category)))
            } else {
                run.push(token);
                Ok((State::Category(run), Effect::None))
            }
        }
        State::Hours(mut run) => match token {
            Token::Space if run.is_empty() => Ok((State::Hours(run), Effect::None)),
            Token::Space => {
                let time = duration::decode(&run)?;
                Ok((State::Task, Effect::Duration(time)))
            }
            other => {
                run.push(other);
                Ok((State::Hours(run), Effect::None))
            }
        },
        State::Task => match token {
            Token::Space => Ok((State::Task, Effect::Comment(Token::Space))),
            Token::Word(word) if classifier.is_task(&word) => {
                Ok((State::Comment, Effect::Task(word)))
            }
            other => Ok((State::Comment, Effect::Comment(other))),
        },
        State::Comment => Ok((State::Comment, Effect::Comment(token))),
    }
}

/// Closes the state machine at end of line.
///
/// An open run is treated as if a space followed it. A line that never got
/// past the category has no duration.
pub fn finish<C>(state: State, classifier: &C) -> Result<Effect, ParseError>
where
    C: Classifier + ?Sized,
{
    match state {
        State::Category(run) => {
            accept_category(&run, classifier)?;
            Err(ParseError::InvalidTime)
        }
        State::Hours(run) => duration::decode(&run).map(Effect::Duration),
        State::Task | State::Comment => Ok(Effect::None),
    }
}

fn accept_category<C>(run: &[Token], classifier: &C) -> Result<String, ParseError>
where
    C: Classifier + ?Sized,
{
    if run.is_empty() {
        return Err(ParseError::InvalidCategory);
    }
    let candidate = token::join(run);
    if classifier.is_category(&candidate) {
        Ok(candidate)
    } else {
        Err(ParseError::InvalidCategory)
    }
}

#[derive(Debug, Default)]
struct Draft {
    entry: TimesheetEntry,
    comment: Vec<Token>,
}

impl Draft {
    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::Category(category) => self.entry.category = category,
            Effect::Duration(time) => {
                self.entry.hours = time.hours;
                self.entry.minutes = time.minutes;
            }
            Effect::Task(task) => self.entry.task = Some(task),
            Effect::Comment(token) => self.comment.push(token),
        }
    }

    fn finish(mut self) -> TimesheetEntry {
        self.entry.comment = token::join(&self.comment).trim().to_string();
        self.entry
    }
}

/// Parses lines recorded for a single day.
pub struct LineParser<'a, C: ?Sized> {
    classifier: &'a C,
    day: Day,
    holiday: bool,
}

impl<'a, C> LineParser<'a, C>
where
    C: Classifier + ?Sized,
{
    pub fn new(classifier: &'a C, day: Day) -> Self {
        let holiday = classifier.is_holiday(&day);
        Self {
            classifier,
            day,
            holiday,
        }
    }

    pub const fn day(&self) -> Day {
        self.day
    }

    /// Parses one raw line into a work item.
    pub fn parse_line(&self, raw: &str) -> Result<WorkItem, ParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyLine);
        }
        if self.holiday {
            return Ok(WorkItem::Holiday(Holiday {
                date: self.day,
                description: raw.to_string(),
            }));
        }
        self.parse_entry(trimmed).map(WorkItem::Entry)
    }

    fn parse_entry(&self, line: &str) -> Result<TimesheetEntry, ParseError> {
        let tokens = token::tokenize(line);
        tracing::trace!(
            tokens = %tokens.iter().map(ToString::to_string).collect::<Vec<_>>().join(","),
            "tokenized line"
        );

        let mut state = State::initial();
        let mut draft = Draft::default();
        for token in tokens {
            let (next, effect) = transition(state, token, self.classifier)?;
            draft.apply(effect);
            state = next;
        }
        draft.apply(finish(state, self.classifier)?);

        Ok(draft.finish())
    }
}
