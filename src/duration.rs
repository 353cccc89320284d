// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Signed elapsed time at nanosecond resolution.
//!
//! [`Duration`] is a plain `i64` nanosecond count. It converts losslessly to
//! [`chrono::TimeDelta`] for calendar arithmetic and to
//! [`std::time::Duration`] for sleeping, and can be projected onto `qtty`
//! quantities.
//!
//! The textual form uses unit suffixes, largest first, e.g. `72h3m0.5s`,
//! `1.5µs` or `-300ms`. [`parse_duration`] accepts the same grammar with an
//! optional sign and any sequence of decimal numbers followed by a unit
//! (`ns`, `us`/`µs`, `ms`, `s`, `m`, `h`).

use crate::error::Error;
use chrono::TimeDelta;
use qtty::{Day, Days, Seconds};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A signed span of time, counted in nanoseconds.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Duration(i64);

pub const NANOSECOND: Duration = Duration(1);
pub const MICROSECOND: Duration = Duration(1_000);
pub const MILLISECOND: Duration = Duration(1_000_000);
pub const SECOND: Duration = Duration(1_000_000_000);
pub const MINUTE: Duration = Duration(60 * SECOND.0);
pub const HOUR: Duration = Duration(60 * MINUTE.0);
pub const DAY: Duration = Duration(24 * HOUR.0);
pub const WEEK: Duration = Duration(7 * DAY.0);

impl Duration {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(i64::MAX);
    pub const MIN: Self = Self(i64::MIN);

    // ── constructors ──────────────────────────────────────────────────

    #[inline]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros.saturating_mul(MICROSECOND.0))
    }

    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(MILLISECOND.0))
    }

    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(SECOND.0))
    }

    /// Builds a duration from fractional seconds, saturating at the
    /// representable bounds.
    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * SECOND.0 as f64) as i64)
    }

    /// Converts a [`TimeDelta`], saturating when it exceeds the `i64`
    /// nanosecond range.
    pub fn from_time_delta(delta: TimeDelta) -> Self {
        match delta.num_nanoseconds() {
            Some(nanos) => Self(nanos),
            None if delta < TimeDelta::zero() => Self::MIN,
            None => Self::MAX,
        }
    }

    // ── projections ───────────────────────────────────────────────────

    /// The duration as an integer nanosecond count.
    #[inline]
    pub const fn as_nanos(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn as_micros(&self) -> i64 {
        self.0 / MICROSECOND.0
    }

    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0 / MILLISECOND.0
    }

    #[inline]
    pub fn as_secs_f64(&self) -> f64 {
        let secs = self.0 / SECOND.0;
        let nanos = self.0 % SECOND.0;
        secs as f64 + nanos as f64 / 1e9
    }

    #[inline]
    pub fn as_minutes(&self) -> f64 {
        let min = self.0 / MINUTE.0;
        let nanos = self.0 % MINUTE.0;
        min as f64 + nanos as f64 / MINUTE.0 as f64
    }

    #[inline]
    pub fn as_hours(&self) -> f64 {
        let hours = self.0 / HOUR.0;
        let nanos = self.0 % HOUR.0;
        hours as f64 + nanos as f64 / HOUR.0 as f64
    }

    /// Converts to a [`std::time::Duration`]; `None` when negative.
    pub fn to_std(&self) -> Option<std::time::Duration> {
        u64::try_from(self.0)
            .ok()
            .map(std::time::Duration::from_nanos)
    }

    #[inline]
    pub fn to_time_delta(&self) -> TimeDelta {
        TimeDelta::nanoseconds(self.0)
    }

    // ── rounding ──────────────────────────────────────────────────────

    /// Absolute value; `Duration::MIN` saturates to `Duration::MAX`.
    #[inline]
    pub const fn abs(&self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Rounds toward zero to a multiple of `m`. A non-positive `m` leaves
    /// the duration unchanged.
    pub const fn truncate(&self, m: Duration) -> Self {
        if m.0 <= 0 {
            return *self;
        }
        Self(self.0 - self.0 % m.0)
    }

    /// Rounds to the nearest multiple of `m`, halfway values away from zero.
    /// A non-positive `m` leaves the duration unchanged; results that would
    /// overflow saturate.
    pub const fn round(&self, m: Duration) -> Self {
        if m.0 <= 0 {
            return *self;
        }
        let d = self.0;
        let mut r = d % m.0;
        if d < 0 {
            r = -r;
            if less_than_half(r, m.0) {
                return Self(d + r);
            }
            return match d.checked_sub(m.0 - r) {
                Some(v) => Self(v),
                None => Self::MIN,
            };
        }
        if less_than_half(r, m.0) {
            return Self(d - r);
        }
        match d.checked_add(m.0 - r) {
            Some(v) => Self(v),
            None => Self::MAX,
        }
    }
}

#[inline]
const fn less_than_half(x: i64, y: i64) -> bool {
    (x as u64) + (x as u64) < y as u64
}

// ═══════════════════════════════════════════════════════════════════════════
// Display / parsing
// ═══════════════════════════════════════════════════════════════════════════

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0s");
        }
        if self.0 < 0 {
            f.write_str("-")?;
        }
        let u = self.0.unsigned_abs();
        let second = SECOND.0 as u64;

        if u < second {
            let (unit, scale, digits) = if u < 1_000 {
                ("ns", 1, 0)
            } else if u < 1_000_000 {
                ("µs", 1_000, 3)
            } else {
                ("ms", 1_000_000, 6)
            };
            write!(f, "{}", u / scale)?;
            write_fraction(f, u % scale, digits)?;
            return f.write_str(unit);
        }

        let secs = u / second;
        let hours = secs / 3600;
        let minutes = (secs / 60) % 60;
        if hours > 0 {
            write!(f, "{hours}h")?;
        }
        if hours > 0 || minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        write!(f, "{}", secs % 60)?;
        write_fraction(f, u % second, 9)?;
        f.write_str("s")
    }
}

fn write_fraction(f: &mut fmt::Formatter<'_>, value: u64, digits: usize) -> fmt::Result {
    if value == 0 {
        return Ok(());
    }
    let padded = format!("{value:0digits$}");
    write!(f, ".{}", padded.trim_end_matches('0'))
}

fn unit_scale(unit: &str) -> Option<u64> {
    let scale = match unit {
        "ns" => NANOSECOND,
        "us" | "µs" | "μs" => MICROSECOND,
        "ms" => MILLISECOND,
        "s" => SECOND,
        "m" => MINUTE,
        "h" => HOUR,
        _ => return None,
    };
    Some(scale.0 as u64)
}

/// Parses a duration such as `"300ms"`, `"-1.5h"` or `"2h45m"`.
pub fn parse_duration(s: &str) -> Result<Duration, Error> {
    let invalid = || Error::InvalidDuration(s.to_owned());

    let (negative, mut rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_part, tail) = rest.split_at(int_len);
        let (frac_part, tail) = match tail.strip_prefix('.') {
            Some(t) => t.split_at(t.bytes().take_while(u8::is_ascii_digit).count()),
            None => ("", tail),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let unit_len = tail
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale = unit_scale(unit).ok_or_else(invalid)?;

        let whole: u64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let mut value = whole.checked_mul(scale).ok_or_else(invalid)?;

        if !frac_part.is_empty() {
            // Digits past the 18th cannot move a u64 nanosecond count.
            let kept = &frac_part[..frac_part.len().min(18)];
            let numerator: u128 = kept.parse().map_err(|_| invalid())?;
            let denominator = 10u128.pow(kept.len() as u32);
            let frac = numerator * scale as u128 / denominator;
            value = value.checked_add(frac as u64).ok_or_else(invalid)?;
        }

        total = total.checked_add(value).ok_or_else(invalid)?;
        rest = tail;
    }

    if negative {
        if total > 1 << 63 {
            return Err(invalid());
        }
        Ok(Duration((total as i64).wrapping_neg()))
    } else {
        i64::try_from(total).map(Duration).map_err(|_| invalid())
    }
}

impl std::str::FromStr for Duration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Arithmetic
// ═══════════════════════════════════════════════════════════════════════════

impl Add for Duration {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Duration {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Duration {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Duration {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Duration {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self::Output {
        Self(self.0.saturating_neg())
    }
}

impl Mul<i64> for Duration {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Mul<Duration> for i64 {
    type Output = Duration;
    #[inline]
    fn mul(self, rhs: Duration) -> Self::Output {
        rhs * self
    }
}

/// Saturates like the other operators: division by zero goes to [`MAX`] or
/// [`MIN`] by the sign of the dividend (zero stays zero), and `MIN / -1` is
/// [`MAX`].
///
/// [`MAX`]: Duration::MAX
/// [`MIN`]: Duration::MIN
impl Div<i64> for Duration {
    type Output = Self;
    #[inline]
    fn div(self, rhs: i64) -> Self::Output {
        match self.0.checked_div(rhs) {
            Some(q) => Self(q),
            None if rhs == 0 => match self.0.signum() {
                1 => Self::MAX,
                -1 => Self::MIN,
                _ => Self::ZERO,
            },
            None => Self::MAX,
        }
    }
}

impl Sum for Duration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

// ── conversions ───────────────────────────────────────────────────────────

impl From<std::time::Duration> for Duration {
    /// Saturates at `Duration::MAX`.
    fn from(d: std::time::Duration) -> Self {
        Self(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
    }
}

impl From<TimeDelta> for Duration {
    fn from(delta: TimeDelta) -> Self {
        Self::from_time_delta(delta)
    }
}

impl From<Duration> for TimeDelta {
    fn from(d: Duration) -> Self {
        d.to_time_delta()
    }
}

impl From<Duration> for Seconds {
    fn from(d: Duration) -> Self {
        Seconds::new(d.as_secs_f64())
    }
}

impl From<Seconds> for Duration {
    fn from(s: Seconds) -> Self {
        Self::from_secs_f64(s.value())
    }
}

impl From<Duration> for Days {
    fn from(d: Duration) -> Self {
        Seconds::from(d).to::<Day>()
    }
}
