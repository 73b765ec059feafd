//! Injected clock for the domain's reference timezone.
//!
//! Lecture start times are stored as Greek local time, so "now" must be
//! Greek local time as well. The clock is injected rather than read
//! ambiently so tests can fix it.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc, Weekday};

/// Provides the current time in the domain's reference timezone.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// System clock converted to Athens local time.
///
/// No timezone database crate is carried for a single fixed zone: Athens
/// follows the EU rule, EET (UTC+2) in winter and EEST (UTC+3) between
/// the last Sundays of March and October, switching at 01:00 UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        athens_local(Utc::now())
    }
}

/// Convert a UTC instant to Athens local time.
pub fn athens_local(utc: DateTime<Utc>) -> NaiveDateTime {
    let hours = if in_summer_time(utc) { 3 } else { 2 };
    utc.naive_utc() + Duration::hours(hours)
}

fn in_summer_time(utc: DateTime<Utc>) -> bool {
    let year = utc.year();
    match (transition(year, 3), transition(year, 10)) {
        (Some(start), Some(end)) => utc.naive_utc() >= start && utc.naive_utc() < end,
        _ => false,
    }
}

/// 01:00 UTC on the last Sunday of the given month.
fn transition(year: i32, month: u32) -> Option<NaiveDateTime> {
    let last = NaiveDate::from_ymd_opt(year, month, 31)?;
    let back = last.weekday().days_since(Weekday::Sun);
    (last - Duration::days(i64::from(back))).and_hms_opt(1, 0, 0)
}

/// Clock pinned to a fixed instant, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
