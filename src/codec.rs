// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The CQL timestamp text encoding.
//!
//! Instants are written as `YYYY-MM-DD HH:MM:SS.mmm±HHMM`: every field
//! zero-padded, exactly three fractional digits (further digits are
//! truncated) and a numeric offset, never `Z`. As a serialized scalar the
//! text is wrapped in double quotes, which makes it a valid JSON string leaf.
//!
//! ```
//! use cqltime::{Instant, Location, Month};
//!
//! let t = Instant::date(2024, Month::March, 5, 7, 8, 9, 123_000_000, Location::Utc).unwrap();
//! assert_eq!(t.encode().unwrap(), "\"2024-03-05 07:08:09.123+0000\"");
//! assert_eq!(Instant::decode("\"2024-03-05 07:08:09.123+0000\"").unwrap(), t);
//! ```
//!
//! Years outside `[0, 9999]` cannot be written in four digits and fail with a
//! [`RangeError`]. Decoding is strict: anything that deviates from the
//! layout, including a different number of fractional digits, fails with a
//! [`ParseError`].

use crate::error::{ParseError, RangeError};
use crate::instant::Instant;
use crate::location::Location;
use chrono::DateTime;
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// strftime layout of the encoding.
pub const CASSANDRA_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f%z";

/// Byte template of an unquoted encoding: `0` is any ASCII digit, `+` is
/// either sign.
const SHAPE: &[u8; 28] = b"0000-00-00 00:00:00.000+0000";

fn element_at(index: usize) -> &'static str {
    match index {
        0..=3 => "year",
        4 | 7 => "'-' date separator",
        5..=6 => "month",
        8..=9 => "day",
        10 => "' ' separator",
        11..=12 => "hour",
        13 | 16 => "':' time separator",
        14..=15 => "minute",
        17..=18 => "second",
        19 => "'.' before fractional second",
        20..=22 => "fractional second digit",
        23 => "offset sign",
        _ => "offset digit",
    }
}

/// Checks `body` byte-for-byte against [`SHAPE`].
fn check_shape(body: &str) -> Result<(), String> {
    let bytes = body.as_bytes();
    for (i, (&b, &expected)) in bytes.iter().zip(SHAPE.iter()).enumerate() {
        let ok = match expected {
            b'0' => b.is_ascii_digit(),
            b'+' => b == b'+' || b == b'-',
            _ => b == expected,
        };
        if !ok {
            // Every earlier byte matched ASCII, so `i` starts a char.
            let found = body
                .get(i..)
                .and_then(|rest| rest.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            return Err(format!("expected {} at byte {i}, found {found:?}", element_at(i)));
        }
    }
    match bytes.len().cmp(&SHAPE.len()) {
        std::cmp::Ordering::Less => Err(format!(
            "input ends before {}",
            element_at(bytes.len())
        )),
        std::cmp::Ordering::Greater => Err("extra text after offset".to_owned()),
        std::cmp::Ordering::Equal => Ok(()),
    }
}

fn strip_quotes(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
}

/// Encodes `instant` as a quoted timestamp.
pub fn encode(instant: &Instant) -> Result<String, RangeError> {
    instant.encode()
}

/// Decodes a timestamp, quoted or bare.
pub fn decode(text: &str) -> Result<Instant, ParseError> {
    Instant::decode(text)
}

impl Instant {
    /// Encodes as `"YYYY-MM-DD HH:MM:SS.mmm±HHMM"`, quotes included.
    ///
    /// The year is taken in the instant's own zone.
    pub fn encode(&self) -> Result<String, RangeError> {
        let body = self.encode_unquoted()?;
        Ok(format!("\"{body}\""))
    }

    fn encode_unquoted(&self) -> Result<String, RangeError> {
        let year = self.year();
        if !(0..10_000).contains(&year) {
            debug!("refusing to encode {}: year {} needs more than four digits", self, year);
            return Err(RangeError { year });
        }
        Ok(self.as_datetime().format(CASSANDRA_FORMAT).to_string())
    }

    /// Decodes an encoded timestamp. One pair of surrounding double quotes
    /// is accepted and stripped.
    ///
    /// The result is in UTC for a zero offset and in an unnamed fixed zone
    /// otherwise; no zone database lookup happens.
    pub fn decode(text: &str) -> Result<Self, ParseError> {
        let body = strip_quotes(text);
        let fail = |reason: String| {
            debug!("rejecting timestamp {text:?}: {reason}");
            ParseError::new(text, CASSANDRA_FORMAT, reason)
        };

        check_shape(body).map_err(fail)?;
        let fixed =
            DateTime::parse_from_str(body, CASSANDRA_FORMAT).map_err(|e| fail(e.to_string()))?;

        let offset = *fixed.offset();
        let location = if offset.local_minus_utc() == 0 {
            Location::Utc
        } else {
            Location::from(offset)
        };
        Ok(Self::from(fixed).in_location(location))
    }

    /// The quoted encoding as bytes.
    pub fn marshal(&self) -> Result<Vec<u8>, RangeError> {
        self.encode().map(String::into_bytes)
    }

    /// Decodes `data` into `self`.
    ///
    /// On failure `self` is reset to [`Instant::zero`] and the error is
    /// returned; the zeroed value carries no meaning.
    pub fn unmarshal(&mut self, data: &[u8]) -> Result<(), ParseError> {
        let decoded = match std::str::from_utf8(data) {
            Ok(text) => Self::decode(text),
            Err(e) => Err(ParseError::new(
                &String::from_utf8_lossy(data),
                CASSANDRA_FORMAT,
                e.to_string(),
            )),
        };
        match decoded {
            Ok(instant) => {
                *self = instant;
                Ok(())
            }
            Err(e) => {
                *self = Self::zero();
                Err(e)
            }
        }
    }
}

// ── Serde ─────────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
impl Serialize for Instant {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let body = self
            .encode_unquoted()
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&body)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Instant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::decode(&text).map_err(serde::de::Error::custom)
    }
}
