//! Single-compartment, first-order elimination model.
//!
//! Remaining amount follows `M(t) = M0 * 0.5^(elapsed / half_life)`. This is
//! deliberately a crude average-case model: no absorption delay, no metabolic
//! saturation, no per-person enzyme variation.

use crate::IntakeRecord;

pub(crate) const MS_PER_HOUR: f64 = 3_600_000.0;

/// Remaining amount (mg) of a single intake at `at_time_ms`.
///
/// Returns exactly 0 when the query instant precedes the intake: a record
/// never contributes caffeine before it happened. Non-positive amounts and
/// half-lives also yield 0.
pub fn remaining_amount(
    initial_amount: f64,
    intake_time_ms: i64,
    at_time_ms: i64,
    half_life_hours: f64,
) -> f64 {
    if !initial_amount.is_finite() || !half_life_hours.is_finite() {
        return 0.0;
    }
    if at_time_ms < intake_time_ms || half_life_hours <= 0.0 || initial_amount <= 0.0 {
        return 0.0;
    }

    let hours_elapsed = (at_time_ms - intake_time_ms) as f64 / MS_PER_HOUR;
    let remaining = initial_amount * 0.5_f64.powf(hours_elapsed / half_life_hours);

    remaining.max(0.0)
}

/// Total body caffeine (mg) across all records at `at_time_ms`.
///
/// Invalid records contribute 0 and are skipped without error; an empty or
/// all-invalid record set totals exactly 0.
pub fn total_at_time(records: &[IntakeRecord], at_time_ms: i64, half_life_hours: f64) -> f64 {
    let total: f64 = records
        .iter()
        .filter(|r| r.is_valid())
        .map(|r| remaining_amount(r.amount, r.timestamp, at_time_ms, half_life_hours))
        .sum();
    // An empty float sum folds to -0.0, which leaks into display output.
    // `max` alone can keep -0.0 (its signed-zero result is unspecified);
    // adding +0.0 normalizes it without affecting any other value.
    total.max(0.0) + 0.0
}
