// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time primitives that speak the CQL timestamp encoding.
//!
//! This crate wraps [`chrono`] (and `chrono-tz` for the IANA zone database)
//! behind a small surface whose one opinion is the text format: instants are
//! written as `YYYY-MM-DD HH:MM:SS.mmm±HHMM`, the literal form a Cassandra
//! `timestamp` column accepts, instead of RFC 3339.
//!
//! # Core types
//!
//! - [`Instant`] — an absolute instant plus the [`Location`] it is displayed
//!   in.
//! - [`Duration`] — signed nanoseconds, with the constants [`NANOSECOND`]
//!   through [`WEEK`].
//! - [`Location`] — UTC, the host zone, a fixed offset, or a named zone.
//! - [`Timer`] / [`Ticker`] — one-shot and repeating notification sources.
//! - [`Month`] / [`Weekday`] — re-exported from chrono.
//!
//! # Encoding
//!
//! | Operation | Result |
//! |-----------|--------|
//! | [`Instant::encode`] | `"2024-03-05 07:08:09.123+0000"`, quotes included |
//! | [`Instant::decode`] | strict parse, quotes optional |
//! | `serde` (default feature) | the same text as a string leaf |
//!
//! Years outside `[0, 9999]` fail to encode with [`RangeError`]; input that
//! deviates from the layout fails to decode with [`ParseError`].
//!
//! ```
//! use cqltime::{Instant, Location, Month, Weekday, HOUR};
//!
//! let t = Instant::decode("2024-03-05 07:08:09.123+0000").unwrap();
//! assert_eq!(t.weekday(), Weekday::Tue);
//! assert_eq!(t.month(), Month::March);
//!
//! let later = t + HOUR * 2;
//! assert_eq!(later.encode().unwrap(), "\"2024-03-05 09:08:09.123+0000\"");
//! assert_eq!(later.location(), Location::Utc);
//! ```

pub mod codec;
mod duration;
mod error;
mod instant;
mod location;
mod timer;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use chrono::{FixedOffset, Month, Weekday};
pub use codec::{decode, encode, CASSANDRA_FORMAT};
pub use duration::{
    parse_duration, Duration, DAY, HOUR, MICROSECOND, MILLISECOND, MINUTE, NANOSECOND, SECOND,
    WEEK,
};
pub use error::{Error, ParseError, RangeError};
pub use instant::{now, parse, parse_in_location, since, until, Instant, WEEKDAY_NAMES};
pub use location::{fixed_zone, load_location, FixedZone, Location, ZoneOffset};
pub use timer::{after, after_func, new_ticker, new_timer, sleep, tick, Ticker, Timer};
