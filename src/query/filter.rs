//! Store-independent filter expressions over articles.
//!
//! A [`Filter`] is a conjunction of per-field conditions plus an optional
//! group of alternatives of which at least one must hold. Each field path
//! carries at most one condition; a timestamp range is a single condition
//! holding both of its bounds.

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};

use crate::models::{fields, Article};

/// Case-insensitive literal substring pattern.
#[derive(Debug, Clone)]
pub struct TextPattern {
    needle: String,
    regex: Regex,
}

impl TextPattern {
    pub fn new(needle: impl Into<String>) -> Result<Self, regex::Error> {
        let needle = needle.into();
        let regex = RegexBuilder::new(&regex::escape(&needle))
            .case_insensitive(true)
            .build()?;
        Ok(Self { needle, regex })
    }

    /// The text searched for, as supplied by the caller.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Escaped regular expression for stores that evaluate regexes themselves.
    pub fn as_regex(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl PartialEq for TextPattern {
    fn eq(&self, other: &Self) -> bool {
        self.needle == other.needle
    }
}

/// Inclusive timestamp range. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| at >= start) && self.end.map_or(true, |end| at <= end)
    }
}

/// Match condition applied to one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Exact string equality.
    Equals(String),
    /// Field contains the pattern.
    Contains(TextPattern),
    /// Field is absent or does not contain the pattern.
    Excludes(TextPattern),
    /// Timestamp falls within the range.
    Within(DateRange),
}

impl Condition {
    fn matches(&self, article: &Article, path: &str) -> bool {
        match self {
            Condition::Equals(expected) => article.text_at(path) == Some(expected.as_str()),
            Condition::Contains(pattern) => article
                .text_at(path)
                .is_some_and(|text| pattern.is_match(text)),
            Condition::Excludes(pattern) => !article
                .text_at(path)
                .is_some_and(|text| pattern.is_match(text)),
            Condition::Within(range) => {
                path == fields::TIMESTAMP
                    && article.timestamp().is_some_and(|at| range.contains(at))
            }
        }
    }
}

/// A condition bound to a dotted field path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCondition {
    pub path: String,
    pub condition: Condition,
}

impl FieldCondition {
    pub fn new(path: impl Into<String>, condition: Condition) -> Self {
        Self {
            path: path.into(),
            condition,
        }
    }

    pub fn matches(&self, article: &Article) -> bool {
        self.condition.matches(article, &self.path)
    }
}

/// Filter over article records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    required: Vec<FieldCondition>,
    alternatives: Vec<FieldCondition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `condition` on `path`, replacing any earlier condition on it.
    pub fn and(mut self, path: impl Into<String>, condition: Condition) -> Self {
        let path = path.into();
        match self.required.iter_mut().find(|c| c.path == path) {
            Some(existing) => existing.condition = condition,
            None => self.required.push(FieldCondition::new(path, condition)),
        }
        self
    }

    /// Require at least one of `alternatives` to hold.
    pub fn any_of(mut self, alternatives: Vec<FieldCondition>) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn required(&self) -> &[FieldCondition] {
        &self.required
    }

    pub fn alternatives(&self) -> &[FieldCondition] {
        &self.alternatives
    }

    /// Condition required on `path`, if any.
    pub fn condition(&self, path: &str) -> Option<&Condition> {
        self.required
            .iter()
            .find(|c| c.path == path)
            .map(|c| &c.condition)
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.alternatives.is_empty()
    }

    pub fn matches(&self, article: &Article) -> bool {
        let any_alternative = self.alternatives.is_empty()
            || self.alternatives.iter().any(|c| c.matches(article));
        any_alternative && self.required.iter().all(|c| c.matches(article))
    }
}
