//! Classification rules for categories, tasks and holidays.
//!
//! The parser only sees the [`Classifier`] capability; [`Rules`] is the
//! configuration-backed implementation loaded from TOML.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timesheet::Day;

/// Predicates the parser and the statistics need from configuration.
pub trait Classifier {
    /// Whether `text` is a configured category.
    fn is_category(&self, text: &str) -> bool;

    /// Whether `text` is a task reference.
    fn is_task(&self, text: &str) -> bool;

    /// Whether `day` is a non-working day.
    fn is_holiday(&self, day: &Day) -> bool;

    /// Whether `category` counts toward overtime.
    fn is_overtime(&self, _category: &str) -> bool {
        false
    }

    /// Categories offered for completion.
    fn possible_categories(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Invalid rule definitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("empty category")]
    EmptyCategory,
    #[error("category cannot contain spaces: {0:?}")]
    CategoryWithSpace(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Categories {
    #[serde(default)]
    pub regular: Vec<String>,
    #[serde(default)]
    pub overtime: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holidays {
    /// `MM-DD` dates observed every year.
    #[serde(default)]
    pub repeatable: Vec<String>,
    /// `YYYY-MM-DD` one-off dates.
    #[serde(default, rename = "addhoc")]
    pub ad_hoc: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPattern {
    pub prefix: String,
    /// Require only digits after the prefix.
    #[serde(rename = "onlyNumbers")]
    pub only_numbers: bool,
}

impl Default for TaskPattern {
    fn default() -> Self {
        Self {
            prefix: "Task-".to_string(),
            only_numbers: true,
        }
    }
}

/// Categories, holidays and task pattern from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    #[serde(default)]
    pub categories: Categories,
    #[serde(default)]
    pub holidays: Holidays,
    #[serde(default)]
    pub tasks: TaskPattern,
}

impl Rules {
    /// Rules with the given regular categories and default task pattern.
    pub fn with_categories<I, S>(regular: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: Categories {
                regular: regular.into_iter().map(Into::into).collect(),
                overtime: Vec::new(),
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        for category in self.categories.regular.iter().chain(&self.categories.overtime) {
            if category.is_empty() {
                return Err(RulesError::EmptyCategory);
            }
            if category.contains(' ') {
                return Err(RulesError::CategoryWithSpace(category.clone()));
            }
        }
        Ok(())
    }
}

impl Classifier for Rules {
    fn is_category(&self, text: &str) -> bool {
        self.categories.regular.iter().any(|c| c == text)
            || self.categories.overtime.iter().any(|c| c == text)
    }

    fn is_task(&self, text: &str) -> bool {
        let Some(rest) = text.strip_prefix(self.tasks.prefix.as_str()) else {
            return false;
        };
        !self.tasks.only_numbers || rest.bytes().all(|b| b.is_ascii_digit())
    }

    fn is_holiday(&self, day: &Day) -> bool {
        let date = day.to_string();
        if self.holidays.ad_hoc.iter().any(|d| *d == date) {
            return true;
        }
        let month_day = day.date().format("%m-%d").to_string();
        self.holidays.repeatable.iter().any(|d| *d == month_day)
    }

    fn is_overtime(&self, category: &str) -> bool {
        self.categories.overtime.iter().any(|c| c == category)
    }

    /// Regular categories followed by overtime ones.
    fn possible_categories(&self) -> Vec<String> {
        self.categories
            .regular
            .iter()
            .chain(&self.categories.overtime)
            .cloned()
            .collect()
    }
}
