//! Calendar totals and source-distribution breakdowns over a record list.

use std::collections::HashMap;

use chrono::{Datelike, TimeZone};

use crate::{
    calendar, BucketTotal, IntakeRecord, SortBy, Source, SourceShare, MANUAL_ENTRY_KEY,
    MANUAL_ENTRY_NAME,
};

/// Summed intake (mg) of valid records with `range_start_ms <= timestamp <=
/// range_end_ms`, inclusive on both ends.
pub fn total_in_range(records: &[IntakeRecord], range_start_ms: i64, range_end_ms: i64) -> f64 {
    let total: f64 = records
        .iter()
        .filter(|r| r.is_valid() && r.timestamp >= range_start_ms && r.timestamp <= range_end_ms)
        .map(|r| r.amount)
        .sum();
    // An empty float sum folds to -0.0, which leaks into display output.
    // `max` alone can keep -0.0 (its signed-zero result is unspecified);
    // adding +0.0 normalizes it without affecting any other value.
    total.max(0.0) + 0.0
}

/// Seven per-day totals for the Monday-based week containing `anchor_ms`.
pub fn daily_totals_for_week<Tz: TimeZone>(
    records: &[IntakeRecord],
    anchor_ms: i64,
    tz: &Tz,
) -> Vec<BucketTotal> {
    let mut cursor = calendar::start_of_week(anchor_ms, tz);
    let mut totals = Vec::with_capacity(7);
    for _ in 0..7 {
        let start = calendar::start_of_day(cursor, tz);
        let end = calendar::end_of_day(cursor, tz);
        totals.push(BucketTotal {
            label: bucket_label(start, tz, "%a"),
            value: total_in_range(records, start, end),
            date: start,
        });
        cursor = end.saturating_add(1);
    }
    totals
}

/// One total per calendar day of the month containing `anchor_ms`
/// (28-31 entries).
pub fn daily_totals_for_month<Tz: TimeZone>(
    records: &[IntakeRecord],
    anchor_ms: i64,
    tz: &Tz,
) -> Vec<BucketTotal> {
    let month_end = calendar::end_of_month(anchor_ms, tz);
    let mut cursor = calendar::start_of_month(anchor_ms, tz);
    let mut totals = Vec::new();
    while cursor <= month_end && totals.len() < 31 {
        let start = calendar::start_of_day(cursor, tz);
        let end = calendar::end_of_day(cursor, tz);
        let label = calendar::civil_date(start, tz)
            .map(|date| date.day().to_string())
            .unwrap_or_default();
        totals.push(BucketTotal {
            label,
            value: total_in_range(records, start, end),
            date: start,
        });
        cursor = end.saturating_add(1);
    }
    totals
}

/// Twelve per-month totals for the calendar year containing `anchor_ms`.
pub fn monthly_totals_for_year<Tz: TimeZone>(
    records: &[IntakeRecord],
    anchor_ms: i64,
    tz: &Tz,
) -> Vec<BucketTotal> {
    let mut cursor = calendar::start_of_year(anchor_ms, tz);
    let mut totals = Vec::with_capacity(12);
    for _ in 0..12 {
        let start = calendar::start_of_month(cursor, tz);
        let end = calendar::end_of_month(cursor, tz);
        totals.push(BucketTotal {
            label: bucket_label(start, tz, "%b"),
            value: total_in_range(records, start, end),
            date: start,
        });
        cursor = end.saturating_add(1);
    }
    totals
}

fn bucket_label<Tz: TimeZone>(instant_ms: i64, tz: &Tz, format: &str) -> String {
    calendar::civil_date(instant_ms, tz)
        .map(|date| date.format(format).to_string())
        .unwrap_or_default()
}

/// Intake broken down by originating drink or label.
///
/// Records group by drink identity when they reference a drink, otherwise by
/// their free-text label (with a fixed manual-entry fallback). Percentages
/// are relative to total amount or total record count depending on
/// `sort_by`, rounded to two decimals with the rounding residual assigned to
/// the last-ranked entry so they always sum to exactly 100.
///
/// Records with a non-positive or invalid amount are excluded; an empty or
/// all-excluded record set yields an empty vector.
pub fn source_distribution(records: &[IntakeRecord], sort_by: SortBy) -> Vec<SourceShare> {
    struct Group {
        display_name: String,
        amount: f64,
        count: usize,
    }

    let mut groups: HashMap<Source, Group> = HashMap::new();
    let mut total_amount = 0.0;
    let mut total_count = 0usize;

    for record in records {
        if !record.is_valid() || record.amount <= 0.0 {
            continue;
        }
        let source = Source::resolve(record);
        let group = groups.entry(source.clone()).or_insert_with(|| Group {
            display_name: display_name(&source, record),
            amount: 0.0,
            count: 0,
        });
        group.amount += record.amount;
        group.count += 1;
        total_amount += record.amount;
        total_count += 1;
    }

    if total_amount <= 0.0 {
        return Vec::new();
    }

    let mut shares: Vec<SourceShare> = groups
        .into_iter()
        .map(|(source, group)| SourceShare {
            key: source.into_key(),
            display_name: group.display_name,
            amount: group.amount.round(),
            count: group.count,
            percentage: match sort_by {
                SortBy::Count => group.count as f64 / total_count as f64 * 100.0,
                SortBy::Amount => group.amount / total_amount * 100.0,
            },
        })
        .collect();

    match sort_by {
        SortBy::Count => {
            shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)))
        }
        SortBy::Amount => {
            shares.sort_by(|a, b| b.amount.total_cmp(&a.amount).then_with(|| a.key.cmp(&b.key)))
        }
    }

    // Round shares, handing the residual to the last-ranked entry so the
    // column sums to exactly 100.
    let last = shares.len() - 1;
    let mut accounted = 0.0;
    for (i, share) in shares.iter_mut().enumerate() {
        if i == last {
            share.percentage = round2(100.0 - accounted);
        } else {
            share.percentage = round2(share.percentage);
            accounted += share.percentage;
        }
    }

    shares
}

fn display_name(source: &Source, record: &IntakeRecord) -> String {
    let present = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    match source {
        Source::ByDrink(_) => present(&record.name)
            .or_else(|| present(&record.custom_name))
            .unwrap_or_else(|| "Unknown drink".to_string()),
        Source::ByLabel(label) if label == MANUAL_ENTRY_KEY => MANUAL_ENTRY_NAME.to_string(),
        Source::ByLabel(label) => label.clone(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
