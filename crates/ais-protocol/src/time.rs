//! NMEA time and date fields
//!
//! - `NmeaTime`: `HHMMSS` or `HHMMSS.SSS`
//! - `NmeaDate`: `DDMMYY` (years 00-49 are 20xx, 50-99 are 19xx)
//! - `UtcDateTime`: both together, with second arithmetic and an ISO-8601
//!   text form (`2024-06-01T12:00:00Z`)

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ParseError;

fn invalid(field: &'static str, value: &str) -> ParseError {
    ParseError::InvalidField {
        field,
        value: value.to_string(),
    }
}

fn digits(s: &str, field: &'static str) -> Result<u32, ParseError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(field, s));
    }
    s.parse().map_err(|_| invalid(field, s))
}

/// UTC time of day with millisecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NmeaTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millis: u16,
}

impl NmeaTime {
    /// Create a time, `None` if any component is out of range
    pub fn new(hour: u8, minute: u8, second: u8, millis: u16) -> Option<Self> {
        (hour < 24 && minute < 60 && second < 60 && millis < 1000).then_some(Self {
            hour,
            minute,
            second,
            millis,
        })
    }

    /// Milliseconds since midnight
    pub fn millis_of_day(&self) -> u32 {
        ((u32::from(self.hour) * 60 + u32::from(self.minute)) * 60 + u32::from(self.second))
            * 1000
            + u32::from(self.millis)
    }

    fn from_millis_of_day(ms: u32) -> Self {
        let secs = ms / 1000;
        Self {
            hour: (secs / 3600) as u8,
            minute: (secs / 60 % 60) as u8,
            second: (secs % 60) as u8,
            millis: (ms % 1000) as u16,
        }
    }

    /// Parse `HHMMSS` with an optional 1-3 digit fraction
    pub fn parse_nmea(s: &str) -> Result<Self, ParseError> {
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (s, None),
        };
        if whole.len() != 6 {
            return Err(invalid("time", s));
        }
        let hour = digits(&whole[0..2], "time")? as u8;
        let minute = digits(&whole[2..4], "time")? as u8;
        let second = digits(&whole[4..6], "time")? as u8;
        let millis = match frac {
            Some(f) if (1..=3).contains(&f.len()) => {
                let padded = format!("{f:0<3}");
                digits(&padded, "time")? as u16
            }
            Some(_) => return Err(invalid("time", s)),
            None => 0,
        };
        Self::new(hour, minute, second, millis).ok_or_else(|| invalid("time", s))
    }

    /// Render as `HHMMSS.SS` (centiseconds, the usual GPS receiver output)
    pub fn to_nmea(&self) -> String {
        format!(
            "{:02}{:02}{:02}.{:02}",
            self.hour,
            self.minute,
            self.second,
            self.millis / 10
        )
    }
}

/// Calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NmeaDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl NmeaDate {
    /// Create a date, `None` if it does not exist in the calendar
    pub fn new(year: u16, month: u8, day: u8) -> Option<Self> {
        let valid = (1..=12).contains(&month) && day >= 1 && day <= days_in_month(year, month);
        valid.then_some(Self { year, month, day })
    }

    /// Parse `DDMMYY`
    pub fn parse_nmea(s: &str) -> Result<Self, ParseError> {
        if s.len() != 6 {
            return Err(invalid("date", s));
        }
        let day = digits(&s[0..2], "date")? as u8;
        let month = digits(&s[2..4], "date")? as u8;
        let yy = digits(&s[4..6], "date")? as u16;
        let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
        Self::new(year, month, day).ok_or_else(|| invalid("date", s))
    }

    pub fn to_nmea(&self) -> String {
        format!("{:02}{:02}{:02}", self.day, self.month, self.year % 100)
    }

    fn days_since_epoch(&self) -> i64 {
        days_from_civil(i64::from(self.year), u32::from(self.month), u32::from(self.day))
    }

    fn from_days_since_epoch(days: i64) -> Self {
        let (y, m, d) = civil_from_days(days);
        Self {
            year: y as u16,
            month: m as u8,
            day: d as u8,
        }
    }
}

fn is_leap(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap(year) => 29,
        2 => 28,
        _ => 0,
    }
}

// Howard Hinnant's days_from_civil / civil_from_days
fn days_from_civil(y: i64, m: u32, d: u32) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = i64::from(m);
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + i64::from(d) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let y = yoe + era * 400 + i64::from(m <= 2);
    (y, m, d)
}

/// UTC date and time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct UtcDateTime {
    pub date: NmeaDate,
    pub time: NmeaTime,
}

impl UtcDateTime {
    pub fn new(date: NmeaDate, time: NmeaTime) -> Self {
        Self { date, time }
    }

    /// Milliseconds since 1970-01-01T00:00:00Z
    pub fn unix_millis(&self) -> i64 {
        self.date.days_since_epoch() * 86_400_000 + i64::from(self.time.millis_of_day())
    }

    /// Inverse of [`UtcDateTime::unix_millis`]
    pub fn from_unix_millis(ms: i64) -> Self {
        let days = ms.div_euclid(86_400_000);
        let rem = ms.rem_euclid(86_400_000) as u32;
        Self {
            date: NmeaDate::from_days_since_epoch(days),
            time: NmeaTime::from_millis_of_day(rem),
        }
    }

    /// Shift by a whole number of seconds, crossing day, month and year boundaries
    pub fn add_seconds(&self, seconds: i64) -> Self {
        Self::from_unix_millis(self.unix_millis() + seconds * 1000)
    }

    /// Shift forward by a duration (millisecond resolution)
    pub fn add_duration(&self, elapsed: Duration) -> Self {
        let ms = i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX / 2);
        Self::from_unix_millis(self.unix_millis().saturating_add(ms))
    }
}

impl Default for UtcDateTime {
    /// 2024-01-01T00:00:00Z
    fn default() -> Self {
        Self {
            date: NmeaDate {
                year: 2024,
                month: 1,
                day: 1,
            },
            time: NmeaTime::default(),
        }
    }
}

impl fmt::Display for UtcDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.date.year,
            self.date.month,
            self.date.day,
            self.time.hour,
            self.time.minute,
            self.time.second
        )?;
        if self.time.millis > 0 {
            write!(f, ".{:03}", self.time.millis)?;
        }
        f.write_str("Z")
    }
}

impl FromStr for UtcDateTime {
    type Err = ParseError;

    /// Parse `YYYY-MM-DDTHH:MM:SS[.sss][Z]`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || invalid("datetime", s);
        let trimmed = s.strip_suffix('Z').unwrap_or(s);
        let (date_part, time_part) = trimmed.split_once('T').ok_or_else(bad)?;

        let mut date_fields = date_part.split('-');
        let (Some(y), Some(mo), Some(d), None) = (
            date_fields.next(),
            date_fields.next(),
            date_fields.next(),
            date_fields.next(),
        ) else {
            return Err(bad());
        };

        let (hms, frac) = match time_part.split_once('.') {
            Some((hms, frac)) => (hms, Some(frac)),
            None => (time_part, None),
        };
        let mut time_fields = hms.split(':');
        let (Some(h), Some(mi), Some(sec), None) = (
            time_fields.next(),
            time_fields.next(),
            time_fields.next(),
            time_fields.next(),
        ) else {
            return Err(bad());
        };

        let millis = match frac {
            Some(f) if (1..=3).contains(&f.len()) => digits(&format!("{f:0<3}"), "datetime")?,
            Some(_) => return Err(bad()),
            None => 0,
        };

        let date = NmeaDate::new(
            digits(y, "datetime")? as u16,
            digits(mo, "datetime")? as u8,
            digits(d, "datetime")? as u8,
        )
        .ok_or_else(bad)?;
        let time = NmeaTime::new(
            digits(h, "datetime")? as u8,
            digits(mi, "datetime")? as u8,
            digits(sec, "datetime")? as u8,
            millis as u16,
        )
        .ok_or_else(bad)?;
        Ok(Self { date, time })
    }
}

impl TryFrom<String> for UtcDateTime {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<UtcDateTime> for String {
    fn from(dt: UtcDateTime) -> Self {
        dt.to_string()
    }
}
