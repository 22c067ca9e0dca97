//! Calendar bucketing: start/end instants of day, week, month, and year.
//!
//! "Today" is whatever the supplied time zone says it is. Functions take the
//! zone explicitly instead of reading the process-local one, so a host can
//! pin bucketing to a user zone and tests stay deterministic. Weeks start on
//! Monday and end Sunday 23:59:59.999.
//!
//! All functions take and return epoch milliseconds and are total: an
//! instant a zone cannot represent falls back to the instant itself, which
//! keeps the `start <= t <= end` invariant without an error path.

use chrono::{Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// First instant (00:00:00.000) of the calendar day containing `instant_ms`.
pub fn start_of_day<Tz: TimeZone>(instant_ms: i64, tz: &Tz) -> i64 {
    civil_date(instant_ms, tz)
        .and_then(|date| first_instant(date, tz))
        .unwrap_or(instant_ms)
}

/// Last instant (23:59:59.999) of the calendar day containing `instant_ms`.
pub fn end_of_day<Tz: TimeZone>(instant_ms: i64, tz: &Tz) -> i64 {
    civil_date(instant_ms, tz)
        .and_then(|date| last_instant(date, tz))
        .unwrap_or(instant_ms)
}

/// First instant of the Monday-based week containing `instant_ms`.
pub fn start_of_week<Tz: TimeZone>(instant_ms: i64, tz: &Tz) -> i64 {
    civil_date(instant_ms, tz)
        .and_then(week_first_date)
        .and_then(|monday| first_instant(monday, tz))
        .unwrap_or(instant_ms)
}

/// Last instant of the Monday-based week: Sunday 23:59:59.999.
pub fn end_of_week<Tz: TimeZone>(instant_ms: i64, tz: &Tz) -> i64 {
    civil_date(instant_ms, tz)
        .and_then(week_first_date)
        .and_then(|monday| monday.checked_add_signed(Duration::days(6)))
        .and_then(|sunday| last_instant(sunday, tz))
        .unwrap_or(instant_ms)
}

/// First instant of the calendar month containing `instant_ms`.
pub fn start_of_month<Tz: TimeZone>(instant_ms: i64, tz: &Tz) -> i64 {
    civil_date(instant_ms, tz)
        .and_then(|date| date.with_day(1))
        .and_then(|first| first_instant(first, tz))
        .unwrap_or(instant_ms)
}

/// Last instant of the calendar month, correct across 28-31 day months and
/// leap years.
pub fn end_of_month<Tz: TimeZone>(instant_ms: i64, tz: &Tz) -> i64 {
    civil_date(instant_ms, tz)
        .and_then(month_last_date)
        .and_then(|last| last_instant(last, tz))
        .unwrap_or(instant_ms)
}

/// First instant of the calendar year containing `instant_ms`.
pub fn start_of_year<Tz: TimeZone>(instant_ms: i64, tz: &Tz) -> i64 {
    civil_date(instant_ms, tz)
        .and_then(|date| NaiveDate::from_ymd_opt(date.year(), 1, 1))
        .and_then(|first| first_instant(first, tz))
        .unwrap_or(instant_ms)
}

/// Last instant of the calendar year: December 31, 23:59:59.999.
pub fn end_of_year<Tz: TimeZone>(instant_ms: i64, tz: &Tz) -> i64 {
    civil_date(instant_ms, tz)
        .and_then(|date| NaiveDate::from_ymd_opt(date.year(), 12, 31))
        .and_then(|last| last_instant(last, tz))
        .unwrap_or(instant_ms)
}

/// The calendar date an instant falls on in the given zone.
pub(crate) fn civil_date<Tz: TimeZone>(instant_ms: i64, tz: &Tz) -> Option<NaiveDate> {
    Some(tz.timestamp_millis_opt(instant_ms).single()?.date_naive())
}

fn week_first_date(date: NaiveDate) -> Option<NaiveDate> {
    let days_into_week = i64::from(date.weekday().num_days_from_monday());
    date.checked_sub_signed(Duration::days(days_into_week))
}

fn month_last_date(date: NaiveDate) -> Option<NaiveDate> {
    let first_of_next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }?;
    first_of_next.checked_sub_signed(Duration::days(1))
}

fn first_instant<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<i64> {
    resolve(date.and_time(NaiveTime::MIN), tz)
}

fn last_instant<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<i64> {
    resolve(date.and_hms_milli_opt(23, 59, 59, 999)?, tz)
}

/// Map a wall-clock time to an instant. Ambiguous times (DST fall-back)
/// take the earlier offset; times skipped by a spring-forward transition
/// slide to the next existing hour.
fn resolve<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Option<i64> {
    let mut candidate = naive;
    for _ in 0..2 {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return Some(dt.timestamp_millis()),
            LocalResult::Ambiguous(earliest, _) => return Some(earliest.timestamp_millis()),
            LocalResult::None => candidate += Duration::hours(1),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    const DAY_MS: i64 = 86_400_000;

    fn shanghai() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn instant(tz: &FixedOffset, y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
        tz.with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_day_bounds_span_exactly_one_day() {
        let tz = shanghai();
        let t = instant(&tz, 2024, 1, 3, 15, 30);
        let start = start_of_day(t, &tz);
        let end = end_of_day(t, &tz);
        assert_eq!(start, instant(&tz, 2024, 1, 3, 0, 0));
        assert_eq!(end, start + DAY_MS - 1);
    }

    #[test]
    fn test_week_starts_monday() {
        let tz = shanghai();
        // 2024-01-03 was a Wednesday.
        let wednesday = instant(&tz, 2024, 1, 3, 9, 0);
        assert_eq!(start_of_week(wednesday, &tz), instant(&tz, 2024, 1, 1, 0, 0));
        assert_eq!(
            end_of_week(wednesday, &tz),
            instant(&tz, 2024, 1, 8, 0, 0) - 1
        );

        // A Monday is its own week start; a Sunday belongs to the week
        // opened six days earlier.
        let monday = instant(&tz, 2024, 1, 1, 0, 0);
        assert_eq!(start_of_week(monday, &tz), monday);
        let sunday = instant(&tz, 2024, 1, 7, 23, 59);
        assert_eq!(start_of_week(sunday, &tz), monday);
    }

    #[test]
    fn test_month_bounds_handle_leap_february() {
        let tz = shanghai();
        let t = instant(&tz, 2024, 2, 10, 12, 0);
        assert_eq!(start_of_month(t, &tz), instant(&tz, 2024, 2, 1, 0, 0));
        assert_eq!(end_of_month(t, &tz), instant(&tz, 2024, 3, 1, 0, 0) - 1);

        let t = instant(&tz, 2023, 2, 10, 12, 0);
        assert_eq!(end_of_month(t, &tz), instant(&tz, 2023, 3, 1, 0, 0) - 1);
    }

    #[test]
    fn test_year_bounds() {
        let tz = shanghai();
        let t = instant(&tz, 2024, 6, 15, 8, 45);
        assert_eq!(start_of_year(t, &tz), instant(&tz, 2024, 1, 1, 0, 0));
        assert_eq!(end_of_year(t, &tz), instant(&tz, 2025, 1, 1, 0, 0) - 1);
    }

    #[test]
    fn test_bounds_bracket_the_instant() {
        let tz = shanghai();
        for &t in &[
            instant(&tz, 2024, 1, 1, 0, 0),
            instant(&tz, 2024, 2, 29, 23, 59),
            instant(&tz, 2024, 12, 31, 12, 0),
            Utc::now().timestamp_millis(),
        ] {
            for (start, end) in [
                (start_of_day(t, &tz), end_of_day(t, &tz)),
                (start_of_week(t, &tz), end_of_week(t, &tz)),
                (start_of_month(t, &tz), end_of_month(t, &tz)),
                (start_of_year(t, &tz), end_of_year(t, &tz)),
            ] {
                assert!(start <= t && t <= end, "bounds missed instant {t}");
            }
        }
    }

    #[test]
    fn test_boundaries_are_idempotent() {
        let tz = shanghai();
        let t = instant(&tz, 2024, 5, 17, 21, 12);
        assert_eq!(start_of_day(start_of_day(t, &tz), &tz), start_of_day(t, &tz));
        assert_eq!(
            start_of_week(start_of_week(t, &tz), &tz),
            start_of_week(t, &tz)
        );
        assert_eq!(
            start_of_month(start_of_month(t, &tz), &tz),
            start_of_month(t, &tz)
        );
        assert_eq!(
            start_of_year(start_of_year(t, &tz), &tz),
            start_of_year(t, &tz)
        );
    }

    #[test]
    fn test_zones_disagree_about_today() {
        // 2024-01-01 02:00 in Shanghai is still 2023-12-31 in UTC.
        let tz = shanghai();
        let t = instant(&tz, 2024, 1, 1, 2, 0);
        assert_eq!(civil_date(t, &tz), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(civil_date(t, &Utc), NaiveDate::from_ymd_opt(2023, 12, 31));
        assert_eq!(start_of_year(t, &tz), instant(&tz, 2024, 1, 1, 0, 0));
        assert_eq!(
            start_of_year(t, &Utc),
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0)
                .unwrap()
                .timestamp_millis()
        );
    }
}
