//! Intake amount from a drink's concentration specification.

use crate::{CalculationMode, DrinkSpec};

/// Caffeine amount (mg) for consuming `input_value` of a drink.
///
/// `input_value` is milliliters in [`CalculationMode::Per100ml`] mode and
/// grams in [`CalculationMode::PerGram`] mode. The result is rounded to the
/// nearest whole milligram, matching the granularity records are stored at.
///
/// Returns 0 for a non-positive or non-finite input, or when the mode's
/// concentration field is missing, negative, or non-finite. Never fails.
pub fn intake_amount(spec: &DrinkSpec, input_value: f64) -> f64 {
    if !input_value.is_finite() || input_value <= 0.0 {
        return 0.0;
    }

    match spec.calculation_mode {
        CalculationMode::PerGram => match spec.caffeine_per_gram {
            Some(per_gram) if per_gram.is_finite() && per_gram >= 0.0 => {
                (per_gram * input_value).round()
            }
            _ => 0.0,
        },
        CalculationMode::Per100ml => match spec.caffeine_content {
            Some(per_100ml) if per_100ml.is_finite() && per_100ml >= 0.0 => {
                (per_100ml * input_value / 100.0).round()
            }
            _ => 0.0,
        },
    }
}
