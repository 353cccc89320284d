// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time zones.
//!
//! [`Location`] is a small `Copy` handle: named zones point into the
//! statically compiled `chrono-tz` database, so passing a location around
//! never copies a rule table. It implements [`chrono::TimeZone`], which lets
//! [`Instant`](crate::Instant) wrap a plain `DateTime<Location>` and leave
//! all DST resolution to chrono.

use crate::error::Error;
use chrono::{
    FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

/// A zone with a constant offset and a caller-chosen name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FixedZone {
    name: &'static str,
    offset: FixedOffset,
}

impl FixedZone {
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }
}

/// A rule mapping absolute instants to local wall-clock readings.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Location {
    #[default]
    Utc,
    /// The host's local zone, as chrono resolves it.
    Local,
    Fixed(FixedZone),
    /// An IANA zone from the tz database.
    Named(Tz),
}

impl Location {
    /// The zone's name: `"UTC"`, `"Local"`, the fixed zone's own name, or the
    /// IANA identifier.
    pub fn name(&self) -> &'static str {
        match self {
            Location::Utc => "UTC",
            Location::Local => "Local",
            Location::Fixed(zone) => zone.name,
            Location::Named(tz) => tz.name(),
        }
    }

    /// The offset in effect at the given UTC reading.
    pub fn offset_at(&self, utc: &NaiveDateTime) -> FixedOffset {
        match self {
            Location::Utc => Utc.fix(),
            Location::Local => Local.offset_from_utc_datetime(utc),
            Location::Fixed(zone) => zone.offset,
            Location::Named(tz) => tz.offset_from_utc_datetime(utc).fix(),
        }
    }

    /// The zone abbreviation in effect at the given UTC reading (e.g. `EST`
    /// vs `EDT`). Zones without abbreviations fall back to their name.
    pub fn abbreviation_at(&self, utc: &NaiveDateTime) -> String {
        match self {
            Location::Named(tz) => tz.offset_from_utc_datetime(utc).to_string(),
            Location::Fixed(zone) if zone.name.is_empty() => zone.offset.to_string(),
            other => other.name().to_owned(),
        }
    }
}

impl From<FixedOffset> for Location {
    /// An unnamed fixed zone, as produced when parsing a numeric offset.
    fn from(offset: FixedOffset) -> Self {
        Location::Fixed(FixedZone { name: "", offset })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        load_location(s)
    }
}

/// Looks up a zone by name.
///
/// `""` and `"UTC"` give [`Location::Utc`], `"Local"` gives
/// [`Location::Local`]; anything else must be an IANA identifier such as
/// `"America/New_York"`.
pub fn load_location(name: &str) -> Result<Location, Error> {
    match name {
        "" | "UTC" => Ok(Location::Utc),
        "Local" => Ok(Location::Local),
        _ => name
            .parse::<Tz>()
            .map(Location::Named)
            .map_err(|_| Error::UnknownTimeZone(name.to_owned())),
    }
}

/// A zone that is always `offset_secs` east of UTC.
///
/// Returns `None` if the offset is a day or more in either direction.
pub fn fixed_zone(name: &'static str, offset_secs: i32) -> Option<Location> {
    FixedOffset::east_opt(offset_secs).map(|offset| Location::Fixed(FixedZone { name, offset }))
}

// ═══════════════════════════════════════════════════════════════════════════
// chrono integration
// ═══════════════════════════════════════════════════════════════════════════

/// The offset type of [`Location`]: the resolved fixed offset, remembering
/// which location produced it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ZoneOffset {
    location: Location,
    fixed: FixedOffset,
}

impl ZoneOffset {
    #[inline]
    pub const fn location(&self) -> Location {
        self.location
    }
}

impl Offset for ZoneOffset {
    #[inline]
    fn fix(&self) -> FixedOffset {
        self.fixed
    }
}

impl fmt::Display for ZoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.fixed, f)
    }
}

impl TimeZone for Location {
    type Offset = ZoneOffset;

    fn from_offset(offset: &ZoneOffset) -> Self {
        offset.location
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<ZoneOffset> {
        self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<ZoneOffset> {
        let location = *self;
        let wrap = move |fixed: FixedOffset| ZoneOffset { location, fixed };
        match self {
            Location::Utc => LocalResult::Single(wrap(Utc.fix())),
            Location::Fixed(zone) => LocalResult::Single(wrap(zone.offset)),
            Location::Local => Local.offset_from_local_datetime(local).map(wrap),
            Location::Named(tz) => tz
                .offset_from_local_datetime(local)
                .map(|offset| wrap(offset.fix())),
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> ZoneOffset {
        self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> ZoneOffset {
        ZoneOffset {
            location: *self,
            fixed: self.offset_at(utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc_reading(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn special_names() {
        assert_eq!(load_location("").unwrap(), Location::Utc);
        assert_eq!(load_location("UTC").unwrap(), Location::Utc);
        assert_eq!(load_location("Local").unwrap(), Location::Local);
    }

    #[test]
    fn named_zone_follows_dst() {
        let ny = load_location("America/New_York").unwrap();
        assert_eq!(ny.name(), "America/New_York");
        assert_eq!(ny.offset_at(&utc_reading(2024, 1, 15)).local_minus_utc(), -5 * 3600);
        assert_eq!(ny.offset_at(&utc_reading(2024, 7, 15)).local_minus_utc(), -4 * 3600);
        assert_eq!(ny.abbreviation_at(&utc_reading(2024, 1, 15)), "EST");
        assert_eq!(ny.abbreviation_at(&utc_reading(2024, 7, 15)), "EDT");
    }

    #[test]
    fn unknown_zone_is_an_error() {
        assert_eq!(
            load_location("Mars/Olympus_Mons"),
            Err(Error::UnknownTimeZone("Mars/Olympus_Mons".into()))
        );
        assert!("Europe/Nowhere".parse::<Location>().is_err());
    }

    #[test]
    fn fixed_zone_keeps_name_and_offset() {
        let est = fixed_zone("EST", -5 * 3600).unwrap();
        assert_eq!(est.to_string(), "EST");
        assert_eq!(est.offset_at(&utc_reading(2024, 7, 1)).local_minus_utc(), -18_000);
        assert!(fixed_zone("bad", 86_400).is_none());
    }

    #[test]
    fn local_resolution_reports_gaps() {
        let ny = load_location("America/New_York").unwrap();
        // 2024-03-10 02:30 does not exist in New York.
        let gap = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert!(matches!(ny.offset_from_local_datetime(&gap), LocalResult::None));
        // 2024-11-03 01:30 happens twice.
        let fold = NaiveDate::from_ymd_opt(2024, 11, 3)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        assert!(matches!(
            ny.offset_from_local_datetime(&fold),
            LocalResult::Ambiguous(_, _)
        ));
    }
}
