// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Absolute instants with a display zone.
//!
//! [`Instant`] is a newtype over `chrono::DateTime<Location>`: the absolute
//! instant plus the [`Location`] used to project it onto calendar fields.
//! Equality, ordering and hashing look only at the absolute instant, so the
//! same moment viewed from two zones compares equal.
//!
//! Calendar construction ([`Instant::date`], [`Instant::add_date`])
//! normalizes out-of-range fields: October 32 is November 1, month 13 is
//! January of the next year. Wall-clock readings that fall in a DST gap are
//! resolved with the offset in effect before the gap; readings that occur
//! twice resolve to the earlier instant.

use crate::duration::Duration;
use crate::error::ParseError;
use crate::location::Location;
use chrono::format::{Parsed, StrftimeItems};
use chrono::{
    DateTime, Datelike, FixedOffset, Local, LocalResult, Month, NaiveDate, NaiveDateTime,
    NaiveTime, Offset, TimeDelta, TimeZone, Timelike, Utc, Weekday,
};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// English weekday names, Sunday first.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

const NANOS_PER_SEC: i128 = 1_000_000_000;
const SECS_PER_DAY: i128 = 86_400;

/// Unix timestamp of the zero instant, 0001-01-01 00:00:00 UTC.
const ZERO_UNIX_SECS: i64 = -62_135_596_800;

const ZERO_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1, 1, 1) {
    Some(date) => date,
    None => panic!("0001-01-01 is representable"),
};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %z";

/// A point in time together with the zone it is displayed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(DateTime<Location>);

impl Instant {
    // ── constructors ──────────────────────────────────────────────────

    /// The current wall-clock time in the local zone.
    pub fn now() -> Self {
        Self(Local::now().with_timezone(&Location::Local))
    }

    /// The zero instant, 0001-01-01 00:00:00 UTC.
    pub fn zero() -> Self {
        let naive = NaiveDateTime::new(ZERO_DATE, NaiveTime::MIN);
        Self(Location::Utc.from_utc_datetime(&naive))
    }

    /// Whether this is the zero instant.
    pub fn is_zero(&self) -> bool {
        self.0.timestamp() == ZERO_UNIX_SECS && self.0.timestamp_subsec_nanos() == 0
    }

    /// The local instant `sec` seconds and `nsec` nanoseconds after the Unix
    /// epoch. `nsec` may lie outside `[0, 1e9)`.
    ///
    /// Returns `None` outside chrono's representable range.
    pub fn unix(sec: i64, nsec: i64) -> Option<Self> {
        let sec = sec.checked_add(nsec.div_euclid(NANOS_PER_SEC as i64))?;
        let nsec = nsec.rem_euclid(NANOS_PER_SEC as i64) as u32;
        DateTime::from_timestamp(sec, nsec).map(|dt| Self(dt.with_timezone(&Location::Local)))
    }

    /// The local instant `millis` milliseconds after the Unix epoch.
    pub fn unix_milli(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(|dt| Self(dt.with_timezone(&Location::Local)))
    }

    /// The instant at the given wall-clock reading in `loc`.
    ///
    /// Fields outside their usual range are normalized. Returns `None` when
    /// the result falls outside chrono's representable range.
    #[allow(clippy::too_many_arguments)]
    pub fn date(
        year: i32,
        month: Month,
        day: i64,
        hour: i64,
        min: i64,
        sec: i64,
        nsec: i64,
        loc: Location,
    ) -> Option<Self> {
        let month0 = i64::from(month.number_from_month()) - 1;
        normalize(i64::from(year), month0, day, hour, min, sec, nsec, loc)
    }

    // ── arithmetic ────────────────────────────────────────────────────

    /// `self + d`, or `None` on overflow.
    pub fn checked_add(&self, d: Duration) -> Option<Self> {
        self.0.checked_add_signed(d.to_time_delta()).map(Self)
    }

    /// `self - d`, or `None` on overflow.
    pub fn checked_sub(&self, d: Duration) -> Option<Self> {
        self.0.checked_sub_signed(d.to_time_delta()).map(Self)
    }

    /// Adds calendar years, months and days, keeping the wall-clock time.
    ///
    /// Overflowing fields normalize, so October 31 plus one month is
    /// December 1.
    pub fn add_date(&self, years: i64, months: i64, days: i64) -> Option<Self> {
        let local = self.0.naive_local();
        normalize(
            i64::from(local.year()).checked_add(years)?,
            i64::from(local.month0()).checked_add(months)?,
            i64::from(local.day()).checked_add(days)?,
            i64::from(local.hour()),
            i64::from(local.minute()),
            i64::from(local.second()),
            i64::from(local.nanosecond()),
            self.location(),
        )
    }

    /// The elapsed time from `earlier` to `self`, saturating at the
    /// [`Duration`] bounds.
    pub fn duration_since(&self, earlier: Instant) -> Duration {
        Duration::from_time_delta(self.0.signed_duration_since(earlier.0))
    }

    // ── comparison ────────────────────────────────────────────────────

    #[inline]
    pub fn before(&self, other: &Instant) -> bool {
        self.0 < other.0
    }

    #[inline]
    pub fn after(&self, other: &Instant) -> bool {
        self.0 > other.0
    }

    /// Whether both denote the same absolute instant, whatever their zones.
    #[inline]
    pub fn equal(&self, other: &Instant) -> bool {
        self.0 == other.0
    }

    // ── rounding ──────────────────────────────────────────────────────

    /// Rounds down to a multiple of `d` since the zero instant.
    ///
    /// Works on the absolute instant, not the zone's wall clock. A
    /// non-positive `d` returns `self` unchanged.
    pub fn truncate(&self, d: Duration) -> Self {
        if d <= Duration::ZERO {
            return *self;
        }
        let r = self.remainder(d);
        self.shift(-r).unwrap_or(*self)
    }

    /// Rounds to the nearest multiple of `d` since the zero instant,
    /// halfway values up. A non-positive `d` returns `self` unchanged.
    pub fn round(&self, d: Duration) -> Self {
        if d <= Duration::ZERO {
            return *self;
        }
        let r = self.remainder(d);
        let m = i128::from(d.as_nanos());
        let shifted = if r + r < m {
            self.shift(-r)
        } else {
            self.shift(m - r)
        };
        shifted.unwrap_or(*self)
    }

    fn remainder(&self, d: Duration) -> i128 {
        let secs = i128::from(self.0.timestamp()) - i128::from(ZERO_UNIX_SECS);
        let nanos = secs * NANOS_PER_SEC + i128::from(self.0.timestamp_subsec_nanos());
        nanos.rem_euclid(i128::from(d.as_nanos()))
    }

    fn shift(&self, nanos: i128) -> Option<Self> {
        // |nanos| is below one rounding unit, which fits in an i64.
        self.checked_add(Duration::from_nanos(i64::try_from(nanos).ok()?))
    }

    // ── zones ─────────────────────────────────────────────────────────

    /// The same instant displayed in `loc`.
    pub fn in_location(&self, loc: Location) -> Self {
        Self(self.0.with_timezone(&loc))
    }

    pub fn utc(&self) -> Self {
        self.in_location(Location::Utc)
    }

    pub fn local(&self) -> Self {
        self.in_location(Location::Local)
    }

    pub fn location(&self) -> Location {
        self.0.timezone()
    }

    /// The zone abbreviation in effect and its offset east of UTC, in
    /// seconds.
    pub fn zone(&self) -> (String, i32) {
        let name = self.location().abbreviation_at(&self.0.naive_utc());
        (name, self.offset().local_minus_utc())
    }

    #[inline]
    pub fn offset(&self) -> FixedOffset {
        self.0.offset().fix()
    }

    // ── calendar projection ───────────────────────────────────────────

    #[inline]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    #[inline]
    pub fn month(&self) -> Month {
        MONTHS[self.0.month0() as usize]
    }

    #[inline]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    #[inline]
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    #[inline]
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    #[inline]
    pub fn second(&self) -> u32 {
        self.0.second()
    }

    #[inline]
    pub fn nanosecond(&self) -> u32 {
        self.0.nanosecond()
    }

    #[inline]
    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Day of the year, 1-based.
    #[inline]
    pub fn year_day(&self) -> u32 {
        self.0.ordinal()
    }

    /// ISO 8601 year and week number.
    pub fn iso_week(&self) -> (i32, u32) {
        let week = self.0.iso_week();
        (week.year(), week.week())
    }

    pub fn date_parts(&self) -> (i32, Month, u32) {
        (self.year(), self.month(), self.day())
    }

    pub fn clock(&self) -> (u32, u32, u32) {
        (self.hour(), self.minute(), self.second())
    }

    // ── epoch projection ──────────────────────────────────────────────

    #[inline]
    pub fn unix_secs(&self) -> i64 {
        self.0.timestamp()
    }

    #[inline]
    pub fn unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Nanoseconds since the Unix epoch; `None` outside the `i64` range
    /// (roughly years 1678 to 2262).
    #[inline]
    pub fn unix_nanos(&self) -> Option<i64> {
        self.0.timestamp_nanos_opt()
    }

    // ── text ──────────────────────────────────────────────────────────

    /// Renders with a strftime layout. Returns `None` if the layout holds an
    /// invalid specifier.
    pub fn format(&self, layout: &str) -> Option<String> {
        use std::fmt::Write;
        let mut out = String::new();
        write!(out, "{}", self.0.format(layout)).ok()?;
        Some(out)
    }

    /// The wrapped chrono value.
    #[inline]
    pub fn as_datetime(&self) -> &DateTime<Location> {
        &self.0
    }
}

impl Default for Instant {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0.format(DISPLAY_FORMAT), self.zone().0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Calendar normalization
// ═══════════════════════════════════════════════════════════════════════════

#[allow(clippy::too_many_arguments)]
fn normalize(
    year: i64,
    month0: i64,
    day: i64,
    hour: i64,
    min: i64,
    sec: i64,
    nsec: i64,
    loc: Location,
) -> Option<Instant> {
    let year = year.checked_add(month0.div_euclid(12))?;
    let month = month0.rem_euclid(12) as u32 + 1;
    let first = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, 1)?;

    let nanos = (i128::from(day) - 1) * SECS_PER_DAY * NANOS_PER_SEC
        + i128::from(hour) * 3_600 * NANOS_PER_SEC
        + i128::from(min) * 60 * NANOS_PER_SEC
        + i128::from(sec) * NANOS_PER_SEC
        + i128::from(nsec);
    let secs = i64::try_from(nanos.div_euclid(NANOS_PER_SEC)).ok()?;
    let subsec = nanos.rem_euclid(NANOS_PER_SEC) as i64;

    let naive = NaiveDateTime::new(first, NaiveTime::MIN)
        .checked_add_signed(TimeDelta::try_seconds(secs)?)?
        .checked_add_signed(TimeDelta::nanoseconds(subsec))?;
    resolve_local(naive, loc)
}

/// Maps a wall-clock reading in `loc` to an instant.
fn resolve_local(naive: NaiveDateTime, loc: Location) -> Option<Instant> {
    let dt = match loc.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let before = loc.offset_at(&naive.checked_sub_signed(TimeDelta::days(1))?);
            let utc = naive
                .checked_sub_signed(TimeDelta::seconds(i64::from(before.local_minus_utc())))?;
            loc.from_utc_datetime(&utc)
        }
    };
    Some(Instant(dt))
}

// ═══════════════════════════════════════════════════════════════════════════
// Free functions
// ═══════════════════════════════════════════════════════════════════════════

/// The current wall-clock time in the local zone.
pub fn now() -> Instant {
    Instant::now()
}

/// Time elapsed since `t`.
pub fn since(t: Instant) -> Duration {
    Instant::now().duration_since(t)
}

/// Time remaining until `t`.
pub fn until(t: Instant) -> Duration {
    t.duration_since(Instant::now())
}

/// Parses `value` with a strftime `layout`.
///
/// If the layout carries an offset the result is in a fixed zone with that
/// offset (UTC for `+0000`); otherwise the reading is taken as UTC.
pub fn parse(layout: &str, value: &str) -> Result<Instant, ParseError> {
    parse_with(layout, value, Location::Utc)
}

/// Like [`parse`], but a reading without an offset is taken in `loc`, and
/// an offset matching `loc`'s at that instant keeps `loc` as the zone.
pub fn parse_in_location(layout: &str, value: &str, loc: Location) -> Result<Instant, ParseError> {
    parse_with(layout, value, loc)
}

fn parse_with(layout: &str, value: &str, loc: Location) -> Result<Instant, ParseError> {
    let err = |reason: String| ParseError::new(value, layout, reason);

    let mut parsed = Parsed::new();
    chrono::format::parse(&mut parsed, value, StrftimeItems::new(layout))
        .map_err(|e| err(e.to_string()))?;

    if let Ok(fixed) = parsed.to_datetime() {
        return Ok(keep_offset(fixed, loc));
    }

    let naive = parsed
        .to_naive_datetime_with_offset(0)
        .or_else(|e| {
            parsed
                .to_naive_date()
                .map(|date| NaiveDateTime::new(date, NaiveTime::MIN))
                .map_err(|_| e)
        })
        .map_err(|e| err(e.to_string()))?;

    // A layout with an offset but no clock, e.g. "%Y-%m-%d %z".
    if let Some(secs) = parsed.offset() {
        let offset =
            FixedOffset::east_opt(secs).ok_or_else(|| err("offset out of range".to_owned()))?;
        let fixed = offset
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| err("time out of range".to_owned()))?;
        return Ok(keep_offset(fixed, loc));
    }
    resolve_local(naive, loc).ok_or_else(|| err("time out of range".to_owned()))
}

/// `loc` when it agrees with the parsed offset at that instant, otherwise an
/// unnamed fixed zone.
fn keep_offset(fixed: DateTime<FixedOffset>, loc: Location) -> Instant {
    let in_loc = fixed.with_timezone(&loc);
    if in_loc.offset().fix() == *fixed.offset() {
        return Instant(in_loc);
    }
    Instant(fixed.with_timezone(&Location::from(*fixed.offset())))
}

// ═══════════════════════════════════════════════════════════════════════════
// Operators and conversions
// ═══════════════════════════════════════════════════════════════════════════

impl Add<Duration> for Instant {
    type Output = Self;

    /// # Panics
    ///
    /// Panics if the result is outside chrono's representable range.
    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs.to_time_delta())
    }
}

impl AddAssign<Duration> for Instant {
    #[inline]
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub<Duration> for Instant {
    type Output = Self;

    /// # Panics
    ///
    /// Panics if the result is outside chrono's representable range.
    #[inline]
    fn sub(self, rhs: Duration) -> Self::Output {
        Self(self.0 - rhs.to_time_delta())
    }
}

impl SubAssign<Duration> for Instant {
    #[inline]
    fn sub_assign(&mut self, rhs: Duration) {
        *self = *self - rhs;
    }
}

impl Sub for Instant {
    type Output = Duration;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.duration_since(rhs)
    }
}

impl PartialEq<DateTime<Utc>> for Instant {
    fn eq(&self, other: &DateTime<Utc>) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<DateTime<Utc>> for Instant {
    fn partial_cmp(&self, other: &DateTime<Utc>) -> Option<Ordering> {
        self.0.partial_cmp(other)
    }
}

impl From<DateTime<Location>> for Instant {
    fn from(dt: DateTime<Location>) -> Self {
        Self(dt)
    }
}

impl From<Instant> for DateTime<Location> {
    fn from(instant: Instant) -> Self {
        instant.0
    }
}

impl From<DateTime<Utc>> for Instant {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.with_timezone(&Location::Utc))
    }
}

impl From<Instant> for DateTime<Utc> {
    fn from(instant: Instant) -> Self {
        instant.0.with_timezone(&Utc)
    }
}

impl From<DateTime<FixedOffset>> for Instant {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self(dt.with_timezone(&Location::from(*dt.offset())))
    }
}

impl From<DateTime<Local>> for Instant {
    fn from(dt: DateTime<Local>) -> Self {
        Self(dt.with_timezone(&Location::Local))
    }
}

impl From<DateTime<chrono_tz::Tz>> for Instant {
    fn from(dt: DateTime<chrono_tz::Tz>) -> Self {
        Self(dt.with_timezone(&Location::Named(dt.timezone())))
    }
}

impl From<std::time::SystemTime> for Instant {
    fn from(t: std::time::SystemTime) -> Self {
        Self(DateTime::<Utc>::from(t).with_timezone(&Location::Local))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::{HOUR, MILLISECOND, MINUTE, NANOSECOND, SECOND};
    use crate::location::{fixed_zone, load_location};

    fn utc(y: i32, mo: Month, d: i64, h: i64, mi: i64, s: i64, ns: i64) -> Instant {
        Instant::date(y, mo, d, h, mi, s, ns, Location::Utc).expect("representable")
    }

    #[test]
    fn weekday_and_month_of_known_date() {
        let t = utc(2024, Month::March, 5, 7, 8, 9, 0);
        assert_eq!(t.weekday(), Weekday::Tue);
        assert_eq!(t.month(), Month::March);
        assert_eq!(WEEKDAY_NAMES[t.weekday().num_days_from_sunday() as usize], "Tuesday");
        assert_eq!(t.date_parts(), (2024, Month::March, 5));
        assert_eq!(t.clock(), (7, 8, 9));
        assert_eq!(t.year_day(), 65);
        assert_eq!(t.iso_week(), (2024, 10));
    }

    #[test]
    fn date_normalizes_overflowing_fields() {
        assert_eq!(
            utc(2024, Month::October, 32, 0, 0, 0, 0),
            utc(2024, Month::November, 1, 0, 0, 0, 0)
        );
        assert_eq!(
            utc(2023, Month::December, 31, 24, 0, 0, 0),
            utc(2024, Month::January, 1, 0, 0, 0, 0)
        );
        assert_eq!(
            utc(2024, Month::March, 1, 0, 0, -1, 0),
            utc(2024, Month::February, 29, 23, 59, 59, 0)
        );
        assert_eq!(
            utc(2024, Month::January, 1, 0, 0, 0, 1_500_000_000),
            utc(2024, Month::January, 1, 0, 0, 1, 500_000_000)
        );
    }

    #[test]
    fn add_date_rolls_over() {
        let t = utc(2024, Month::October, 31, 10, 0, 0, 0);
        assert_eq!(t.add_date(0, 1, 0).unwrap(), utc(2024, Month::December, 1, 10, 0, 0, 0));
        assert_eq!(t.add_date(1, -10, 1).unwrap(), utc(2025, Month::January, 1, 10, 0, 0, 0));
    }

    #[test]
    fn dst_gap_uses_offset_before_the_gap() {
        let ny = load_location("America/New_York").unwrap();
        let t = Instant::date(2024, Month::March, 10, 2, 30, 0, 0, ny).unwrap();
        assert_eq!(t.clock(), (3, 30, 0));
        assert_eq!(t.zone(), ("EDT".to_owned(), -4 * 3600));
        assert_eq!(t.utc().clock(), (7, 30, 0));
    }

    #[test]
    fn ambiguous_reading_takes_the_earlier_instant() {
        let ny = load_location("America/New_York").unwrap();
        let t = Instant::date(2024, Month::November, 3, 1, 30, 0, 0, ny).unwrap();
        assert_eq!(t.zone().1, -4 * 3600);
    }

    #[test]
    fn zone_conversion_keeps_the_instant() {
        let t = utc(2024, Month::July, 1, 12, 0, 0, 0);
        let tokyo = t.in_location(load_location("Asia/Tokyo").unwrap());
        assert_eq!(tokyo.hour(), 21);
        assert!(tokyo.equal(&t));
        assert_eq!(tokyo, t);
        assert_eq!(tokyo.location().name(), "Asia/Tokyo");
        assert_eq!(tokyo.utc().location(), Location::Utc);
    }

    #[test]
    fn arithmetic_and_comparison() {
        let a = utc(2024, Month::March, 5, 0, 0, 0, 0);
        let b = a + HOUR * 36;
        assert_eq!(b, utc(2024, Month::March, 6, 12, 0, 0, 0));
        assert_eq!(b - a, HOUR * 36);
        assert_eq!(a.duration_since(b), -(HOUR * 36));
        assert!(a.before(&b) && b.after(&a));
        assert_eq!(b - HOUR * 36, a);

        let far = utc(2500, Month::January, 1, 0, 0, 0, 0);
        let early = utc(1500, Month::January, 1, 0, 0, 0, 0);
        assert_eq!(far - early, Duration::MAX);
        assert_eq!(early - far, Duration::MIN);
    }

    #[test]
    fn truncate_and_round_on_absolute_time() {
        let t = utc(2012, Month::December, 7, 12, 15, 30, 918_273_645);
        assert_eq!(t.truncate(MINUTE), utc(2012, Month::December, 7, 12, 15, 0, 0));
        assert_eq!(t.round(HOUR), utc(2012, Month::December, 7, 12, 0, 0, 0));
        assert_eq!(t.round(SECOND), utc(2012, Month::December, 7, 12, 15, 31, 0));
        assert_eq!(t.truncate(MILLISECOND).nanosecond(), 918_000_000);
        assert_eq!(t.round(Duration::ZERO), t);
        assert_eq!(t.truncate(-SECOND), t);
        assert_eq!(t.truncate(NANOSECOND), t);
    }

    #[test]
    fn truncate_is_zone_independent() {
        let t = utc(2024, Month::March, 5, 7, 8, 9, 0);
        let est = fixed_zone("EST", -5 * 3600).unwrap();
        assert_eq!(t.in_location(est).truncate(HOUR * 24), t.truncate(HOUR * 24));
    }

    #[test]
    fn zero_value() {
        let z = Instant::default();
        assert!(z.is_zero());
        assert_eq!(z.date_parts(), (1, Month::January, 1));
        assert_eq!(z.unix_secs(), ZERO_UNIX_SECS);
        assert!(!utc(1970, Month::January, 1, 0, 0, 0, 0).is_zero());
    }

    #[test]
    fn unix_normalizes_nanoseconds() {
        let t = Instant::unix(10, -1).unwrap();
        assert_eq!(t.unix_secs(), 9);
        assert_eq!(t.nanosecond(), 999_999_999);
        assert_eq!(Instant::unix_milli(1_500).unwrap().unix_millis(), 1_500);
        assert_eq!(t.unix_nanos(), Some(9_999_999_999));
        assert_eq!(t.location(), Location::Local);
    }

    #[test]
    fn parse_without_offset_is_utc() {
        let t = parse("%Y-%m-%d %H:%M", "2024-03-05 07:08").unwrap();
        assert_eq!(t, utc(2024, Month::March, 5, 7, 8, 0, 0));
        assert_eq!(t.location(), Location::Utc);

        let d = parse("%Y-%m-%d", "2024-03-05").unwrap();
        assert_eq!(d, utc(2024, Month::March, 5, 0, 0, 0, 0));
    }

    #[test]
    fn parse_with_offset_builds_a_fixed_zone() {
        let t = parse("%Y-%m-%d %H:%M:%S %z", "2024-03-05 07:08:09 +0530").unwrap();
        assert_eq!(t.offset().local_minus_utc(), 5 * 3600 + 1800);
        assert_eq!(t.utc().clock(), (1, 38, 9));

        let z = parse("%Y-%m-%d %H:%M:%S %z", "2024-03-05 07:08:09 +0000").unwrap();
        assert_eq!(z.location(), Location::Utc);
    }

    #[test]
    fn date_only_layout_keeps_its_offset() {
        let t = parse("%Y-%m-%d %z", "2024-03-05 +0530").unwrap();
        assert_eq!(t.offset().local_minus_utc(), 5 * 3600 + 1800);
        assert_eq!(t.clock(), (0, 0, 0));
        assert_eq!(t.utc().date_parts(), (2024, Month::March, 4));
        assert_eq!(t.utc().clock(), (18, 30, 0));

        let ny = load_location("America/New_York").unwrap();
        let matched = parse_in_location("%Y-%m-%d %z", "2024-07-04 -0400", ny).unwrap();
        assert_eq!(matched.location(), ny);
        assert_eq!(matched.utc().hour(), 4);
    }

    #[test]
    fn parse_in_location_uses_the_zone() {
        let ny = load_location("America/New_York").unwrap();
        let t = parse_in_location("%Y-%m-%d %H:%M", "2024-07-04 09:00", ny).unwrap();
        assert_eq!(t.location(), ny);
        assert_eq!(t.utc().hour(), 13);

        let matched =
            parse_in_location("%Y-%m-%d %H:%M %z", "2024-07-04 09:00 -0400", ny).unwrap();
        assert_eq!(matched.location(), ny);
    }

    #[test]
    fn parse_errors_carry_context() {
        let err = parse("%Y-%m-%d", "2024-13-01").unwrap_err();
        assert_eq!(err.value, "2024-13-01");
        assert_eq!(err.layout, "%Y-%m-%d");
    }

    #[test]
    fn format_and_display() {
        let t = utc(2024, Month::March, 5, 7, 8, 9, 120_000_000);
        assert_eq!(t.format("%d/%m/%Y").as_deref(), Some("05/03/2024"));
        assert_eq!(t.format("%Q"), None);
        assert_eq!(t.to_string(), "2024-03-05 07:08:09.120 +0000 UTC");
    }

    #[test]
    fn chrono_interop() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let t = Instant::from(dt);
        assert_eq!(t, dt);
        assert_eq!(DateTime::<Utc>::from(t), dt);
        assert!(t < dt + TimeDelta::seconds(1));
    }
}
