//! Inverse of the decay model: time until a target level is reached.

/// Floor substituted for an exact-zero target so the log ratio stays finite.
const MIN_TARGET_MG: f64 = 0.1;

/// Hours until `current_amount` decays to `target_amount`.
///
/// `Some(0.0)` means "already at or below the target" and needs no waiting.
/// `None` means the answer is not computable: negative target, non-positive
/// half-life, a non-finite input, or a computation that does not produce a
/// finite non-negative duration.
///
/// A wall-clock estimate is the caller's job: convert a concentration
/// threshold to a target amount with
/// [`concentration_to_amount`](crate::concentration_to_amount), then add the
/// returned hours to its own "now".
pub fn hours_to_reach_target(
    current_amount: f64,
    target_amount: f64,
    half_life_hours: f64,
) -> Option<f64> {
    if !(current_amount.is_finite() && target_amount.is_finite() && half_life_hours.is_finite()) {
        return None;
    }
    if target_amount < 0.0 || half_life_hours <= 0.0 {
        return None;
    }
    if current_amount <= target_amount {
        return Some(0.0);
    }

    let effective_target = target_amount.max(MIN_TARGET_MG);
    let hours = half_life_hours * (current_amount / effective_target).log2();

    (hours.is_finite() && hours >= 0.0).then_some(hours)
}
