//! Amount/concentration conversion via volume of distribution.
//!
//! Estimated plasma concentration is `C = amount / (Vd * weight)`, a linear
//! proxy, not a clinical measurement. Both directions return `None` for
//! inputs where the calculation is not meaningful, which callers must treat
//! as "not computable" rather than as zero.

/// Estimated plasma concentration (mg/L) for a total body amount.
///
/// `None` for a negative amount, non-positive weight or Vd, or any
/// non-finite input.
pub fn amount_to_concentration(amount_mg: f64, weight_kg: f64, vd_l_per_kg: f64) -> Option<f64> {
    if !(amount_mg.is_finite() && weight_kg.is_finite() && vd_l_per_kg.is_finite()) {
        return None;
    }
    if amount_mg < 0.0 || weight_kg <= 0.0 || vd_l_per_kg <= 0.0 {
        return None;
    }

    let total_volume_l = vd_l_per_kg * weight_kg;
    let concentration = amount_mg / total_volume_l;

    concentration.is_finite().then_some(concentration)
}

/// Total body amount (mg) corresponding to a plasma concentration.
///
/// Exact inverse of [`amount_to_concentration`] for valid positive inputs;
/// same `None` policy.
pub fn concentration_to_amount(
    concentration_mg_l: f64,
    weight_kg: f64,
    vd_l_per_kg: f64,
) -> Option<f64> {
    if !(concentration_mg_l.is_finite() && weight_kg.is_finite() && vd_l_per_kg.is_finite()) {
        return None;
    }
    if concentration_mg_l < 0.0 || weight_kg <= 0.0 || vd_l_per_kg <= 0.0 {
        return None;
    }

    let total_volume_l = vd_l_per_kg * weight_kg;
    let amount = concentration_mg_l * total_volume_l;

    amount.is_finite().then_some(amount)
}
