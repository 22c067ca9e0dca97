//! Core domain types for the caffeine tracking engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Intake records and their identity
//! - User pharmacokinetic parameters
//! - Drink specifications (concentration per volume or mass)
//! - Aggregation outputs (bucket totals, source distribution shares)
//! - The host's backup/export document shape

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Grouping key assigned to records that carry neither a drink reference nor
/// any usable label.
pub const MANUAL_ENTRY_KEY: &str = "custom-manual-entry";

/// Display name for the manual-entry group.
pub const MANUAL_ENTRY_NAME: &str = "Manual entry";

// ============================================================================
// Intake Records
// ============================================================================

/// Opaque record identifier.
///
/// The host assigns ids and uses both strings and raw numbers in its export
/// JSON, so this accepts either and preserves the original form on re-export.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(serde_json::Number),
}

/// A single caffeine intake event, created by the host and consumed
/// read-only by the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRecord {
    pub id: RecordId,

    /// Milligrams of caffeine attributed to this event.
    pub amount: f64,

    /// Moment of ingestion, epoch milliseconds.
    pub timestamp: i64,

    /// Physical volume (ml) or mass (g) consumed. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,

    /// Reference to the drink this intake came from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drink_id: Option<String>,

    /// Drink name snapshot taken at record creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Free-text label for ad hoc entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
}

impl IntakeRecord {
    /// Whether this record may participate in any calculation.
    ///
    /// Records with a non-finite or negative amount are silently excluded
    /// everywhere rather than rejected with an error.
    pub fn is_valid(&self) -> bool {
        self.amount.is_finite() && self.amount >= 0.0
    }
}

// ============================================================================
// User Parameters
// ============================================================================

/// Pharmacokinetic parameters for the user, owned by host settings.
///
/// Construct through [`UserParameters::new`], which is the single validated
/// path; deserialized values coming straight from a host file should be
/// re-validated with [`UserParameters::validate`] before use.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserParameters {
    /// Body weight in kilograms.
    pub weight_kg: f64,

    /// Elimination half-life in hours. Typical range 1-24, average about 5.
    pub half_life_hours: f64,

    /// Volume of distribution in L/kg. Typical range 0.1-1.5, average 0.6.
    pub volume_of_distribution_l_per_kg: f64,

    /// Plasma concentration (mg/L) below which sleep onset is considered
    /// unaffected.
    #[serde(rename = "safeSleepThresholdConcentration")]
    pub safe_sleep_threshold_mg_l: f64,
}

impl UserParameters {
    /// Build a validated parameter set.
    ///
    /// Weight, half-life and volume of distribution must be finite and
    /// strictly positive; the sleep threshold must be finite and
    /// non-negative.
    pub fn new(
        weight_kg: f64,
        half_life_hours: f64,
        volume_of_distribution_l_per_kg: f64,
        safe_sleep_threshold_mg_l: f64,
    ) -> Result<Self> {
        let params = Self {
            weight_kg,
            half_life_hours,
            volume_of_distribution_l_per_kg,
            safe_sleep_threshold_mg_l,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the range constraints on an already-built parameter set.
    pub fn validate(&self) -> Result<()> {
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(Error::Config(format!(
                "weight must be a positive number of kilograms, got {}",
                self.weight_kg
            )));
        }
        if !(self.half_life_hours.is_finite() && self.half_life_hours > 0.0) {
            return Err(Error::Config(format!(
                "half-life must be a positive number of hours, got {}",
                self.half_life_hours
            )));
        }
        if !(self.volume_of_distribution_l_per_kg.is_finite()
            && self.volume_of_distribution_l_per_kg > 0.0)
        {
            return Err(Error::Config(format!(
                "volume of distribution must be a positive number of L/kg, got {}",
                self.volume_of_distribution_l_per_kg
            )));
        }
        if !(self.safe_sleep_threshold_mg_l.is_finite() && self.safe_sleep_threshold_mg_l >= 0.0) {
            return Err(Error::Config(format!(
                "sleep threshold must be a non-negative concentration in mg/L, got {}",
                self.safe_sleep_threshold_mg_l
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Drink Specification
// ============================================================================

/// How a drink's caffeine content is specified.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CalculationMode {
    /// Milligrams of caffeine per 100 ml of liquid.
    #[default]
    Per100ml,
    /// Milligrams of caffeine per gram of ground product.
    PerGram,
}

/// Concentration specification for a drink, owned by the host catalog.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrinkSpec {
    #[serde(default)]
    pub calculation_mode: CalculationMode,

    /// mg per 100 ml, used in [`CalculationMode::Per100ml`] mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caffeine_content: Option<f64>,

    /// mg per gram, used in [`CalculationMode::PerGram`] mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caffeine_per_gram: Option<f64>,
}

// ============================================================================
// Source Grouping
// ============================================================================

/// Resolved grouping key for the source distribution.
///
/// Records referencing a catalog drink group by drink identity; everything
/// else groups by its free-text label, with a fixed manual-entry fallback.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    ByDrink(String),
    ByLabel(String),
}

impl Source {
    /// Resolve the grouping key for a record.
    pub fn resolve(record: &IntakeRecord) -> Self {
        if let Some(drink_id) = non_empty(record.drink_id.as_deref()) {
            return Source::ByDrink(drink_id.to_string());
        }
        let label = non_empty(record.custom_name.as_deref())
            .or_else(|| non_empty(record.name.as_deref()))
            .unwrap_or(MANUAL_ENTRY_KEY);
        Source::ByLabel(label.to_string())
    }

    /// The flat string key used in distribution output.
    pub fn key(&self) -> &str {
        match self {
            Source::ByDrink(id) => id,
            Source::ByLabel(label) => label,
        }
    }

    pub fn into_key(self) -> String {
        match self {
            Source::ByDrink(id) => id,
            Source::ByLabel(label) => label,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Metric the source distribution is ranked and percentaged by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortBy {
    /// Rank by summed milligrams; percentages relative to total intake.
    Amount,
    /// Rank by record count; percentages relative to total record count.
    Count,
}

// ============================================================================
// Aggregation Outputs
// ============================================================================

/// Total intake for one calendar bucket (a day or a month).
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct BucketTotal {
    /// Short display label: weekday name, day number, or month name.
    pub label: String,

    /// Summed intake amount (mg) over the bucket's bounds.
    pub value: f64,

    /// First instant of the bucket, epoch milliseconds.
    pub date: i64,
}

/// One group in the source distribution breakdown.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceShare {
    pub key: String,
    pub display_name: String,

    /// Summed intake for the group, rounded to whole milligrams.
    pub amount: f64,

    /// Number of records in the group.
    pub count: usize,

    /// Share of the chosen metric, rounded to two decimals. Shares across
    /// all groups sum to exactly 100.
    pub percentage: f64,
}

/// One sample of the aggregate metabolism curve.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SeriesPoint {
    /// Sample instant, epoch milliseconds.
    pub time: i64,

    /// Total body caffeine at that instant (mg), rounded to one decimal.
    pub caffeine: f64,
}

// ============================================================================
// Backup Document
// ============================================================================

/// The host's backup/export JSON document.
///
/// The engine only cares that [`IntakeRecord`] round-trips through this
/// shape; the settings and drink sections are host-owned and pass through
/// as raw JSON.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    #[serde(default)]
    pub records: Vec<IntakeRecord>,

    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub user_settings: serde_json::Value,

    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub drinks: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_timestamp: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<serde_json::Value>,
}
