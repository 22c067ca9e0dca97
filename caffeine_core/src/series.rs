//! Metabolism curve sampling for chart consumption.

use crate::decay::{total_at_time, MS_PER_HOUR};
use crate::{IntakeRecord, SeriesPoint};

/// Default look-back window in hours.
pub const DEFAULT_HOURS_BEFORE: f64 = 6.0;
/// Default look-ahead window in hours.
pub const DEFAULT_HOURS_AFTER: f64 = 18.0;
/// Default sampling density.
pub const DEFAULT_POINTS_PER_HOUR: u32 = 4;

/// Hard ceiling on points in one series. Anything past this is not a
/// chartable window, and the millisecond arithmetic below relies on the
/// span staying far inside `i64` range.
const MAX_SERIES_POINTS: f64 = 100_000.0;

/// Sample the aggregate decay curve at uniform intervals.
///
/// Points run from `now - hours_before` to `now + hours_after` inclusive,
/// spaced `60 / points_per_hour` minutes apart. Each sample is
/// [`total_at_time`] at that instant, rounded to one decimal for display.
/// `now_ms` must be captured once by the caller; the generator never reads
/// the clock itself.
///
/// A zero sampling density, a negative/non-finite window, a window that
/// would produce more than 100,000 points, or sub-millisecond sampling
/// yields an empty series.
pub fn metabolism_series(
    records: &[IntakeRecord],
    half_life_hours: f64,
    now_ms: i64,
    hours_before: f64,
    hours_after: f64,
    points_per_hour: u32,
) -> Vec<SeriesPoint> {
    if points_per_hour == 0 {
        return Vec::new();
    }
    if !(hours_before.is_finite() && hours_after.is_finite())
        || hours_before < 0.0
        || hours_after < 0.0
    {
        return Vec::new();
    }

    if (hours_before + hours_after) * f64::from(points_per_hour) > MAX_SERIES_POINTS {
        return Vec::new();
    }

    let interval_ms = (MS_PER_HOUR / f64::from(points_per_hour)) as i64;
    if interval_ms == 0 {
        return Vec::new();
    }
    let Some(start) = now_ms.checked_sub((hours_before * MS_PER_HOUR) as i64) else {
        return Vec::new();
    };
    let Some(end) = now_ms.checked_add((hours_after * MS_PER_HOUR) as i64) else {
        return Vec::new();
    };

    let mut points = Vec::with_capacity(((end - start) / interval_ms + 1).max(0) as usize);
    let mut time = start;
    while time <= end {
        let level = total_at_time(records, time, half_life_hours);
        points.push(SeriesPoint {
            time,
            caffeine: (level * 10.0).round() / 10.0,
        });
        time = match time.checked_add(interval_ms) {
            Some(next) => next,
            None => break,
        };
    }

    points
}
