// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error types.

use thiserror::Error;

/// Returned when an instant cannot be encoded because its year does not fit
/// in four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("year {year} outside of range [0,9999]")]
pub struct RangeError {
    /// The offending calendar year, in the instant's own zone.
    pub year: i32,
}

/// Returned when text does not match the expected layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parsing time {value:?} as {layout:?}: {reason}")]
pub struct ParseError {
    /// The input that failed to parse.
    pub value: String,
    /// The layout the input was matched against.
    pub layout: String,
    /// What went wrong.
    pub reason: String,
}

impl ParseError {
    pub(crate) fn new(value: &str, layout: &str, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_owned(),
            layout: layout.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Crate-wide error.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("unknown time zone {0:?}")]
    UnknownTimeZone(String),
    #[error("invalid duration {0:?}")]
    InvalidDuration(String),
    #[error("non-positive interval for ticker")]
    NonPositiveInterval,
}
