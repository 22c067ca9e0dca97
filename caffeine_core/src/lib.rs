#![forbid(unsafe_code)]

//! Caffeine pharmacokinetics and time-aggregation engine.
//!
//! This crate provides:
//! - First-order decay model (remaining amount, current level)
//! - Amount/concentration conversion via volume of distribution
//! - Inverse solver ("when will level X be reached")
//! - Drink-spec intake amounts
//! - Calendar bucketing and intake aggregation
//! - Metabolism curve sampling for charts
//!
//! Every function is pure: the caller captures "now" once and passes it in,
//! and invalid records degrade to sentinels instead of errors.

pub mod aggregate;
pub mod calendar;
pub mod concentration;
pub mod config;
pub mod decay;
pub mod dose;
pub mod error;
pub mod logging;
pub mod series;
pub mod solver;
pub mod types;

// Re-export commonly used items
pub use aggregate::{
    daily_totals_for_month, daily_totals_for_week, monthly_totals_for_year, source_distribution,
    total_in_range,
};
pub use concentration::{amount_to_concentration, concentration_to_amount};
pub use config::Config;
pub use decay::{remaining_amount, total_at_time};
pub use dose::intake_amount;
pub use error::{Error, Result};
pub use series::metabolism_series;
pub use solver::hours_to_reach_target;
pub use types::*;
