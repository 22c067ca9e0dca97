use caffeine_core::*;
use chrono::{Local, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

const MS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Parser)]
#[command(name = "cafftrack")]
#[command(about = "Personal caffeine intake tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current level, concentration, and earliest safe sleep time
    Status {
        /// Exported records file (backup document or bare record array)
        #[arg(long)]
        records: PathBuf,

        /// Evaluate at this instant (epoch milliseconds) instead of now
        #[arg(long)]
        at: Option<i64>,
    },

    /// Calendar totals and source distribution
    Stats {
        /// Exported records file (backup document or bare record array)
        #[arg(long)]
        records: PathBuf,

        /// Period to report: day, week, month, year
        #[arg(long, default_value = "week")]
        period: String,

        /// Anchor date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Rank sources by "amount" or "count"
        #[arg(long, default_value = "amount")]
        sort_by: String,
    },

    /// Print metabolism curve samples for charting
    Curve {
        /// Exported records file (backup document or bare record array)
        #[arg(long)]
        records: PathBuf,

        /// Center the window on this instant (epoch milliseconds)
        #[arg(long)]
        at: Option<i64>,

        /// Hours of look-back before now
        #[arg(long)]
        hours_before: Option<f64>,

        /// Hours of look-ahead after now
        #[arg(long)]
        hours_after: Option<f64>,

        /// Samples per hour
        #[arg(long)]
        points_per_hour: Option<u32>,
    },

    /// Compute the caffeine amount of one serving
    Dose {
        /// mg of caffeine per 100 ml of drink
        #[arg(long, conflicts_with = "per_gram")]
        per_100ml: Option<f64>,

        /// mg of caffeine per gram of ground product
        #[arg(long, conflicts_with = "per_100ml")]
        per_gram: Option<f64>,

        /// Serving size: ml with --per-100ml, grams with --per-gram
        #[arg(long)]
        serving: f64,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    caffeine_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Status { records, at } => cmd_status(&records, at, &config),
        Commands::Stats {
            records,
            period,
            date,
            sort_by,
        } => cmd_stats(&records, &period, date.as_deref(), &sort_by, &config),
        Commands::Curve {
            records,
            at,
            hours_before,
            hours_after,
            points_per_hour,
        } => cmd_curve(&records, at, hours_before, hours_after, points_per_hour, &config),
        Commands::Dose {
            per_100ml,
            per_gram,
            serving,
        } => cmd_dose(per_100ml, per_gram, serving),
    }
}

fn cmd_status(records_path: &Path, at: Option<i64>, config: &Config) -> Result<()> {
    let params = config.pharmacokinetics.user_parameters()?;
    let records = load_records(records_path)?;

    // Capture "now" once; every calculation below sees the same instant.
    let now = at.unwrap_or_else(|| Utc::now().timestamp_millis());

    let level = total_at_time(&records, now, params.half_life_hours);
    println!("Current caffeine: {:.1} mg", level);

    match amount_to_concentration(level, params.weight_kg, params.volume_of_distribution_l_per_kg)
    {
        Some(concentration) => {
            println!("Estimated concentration: {:.2} mg/L", concentration);
        }
        None => println!("Estimated concentration: n/a"),
    }

    let today = total_in_range(
        &records,
        calendar::start_of_day(now, &Local),
        calendar::end_of_day(now, &Local),
    );
    println!("Today's intake: {:.0} mg", today);

    // Threshold concentration -> target amount -> hours -> wall clock.
    let target_amount = concentration_to_amount(
        params.safe_sleep_threshold_mg_l,
        params.weight_kg,
        params.volume_of_distribution_l_per_kg,
    );
    match target_amount.and_then(|target| hours_to_reach_target(level, target, params.half_life_hours)) {
        Some(hours) if hours <= 0.0 => println!("Sleep: safe now"),
        Some(hours) => {
            let when = now + (hours * MS_PER_HOUR) as i64;
            println!(
                "Sleep: safe in {} (at {})",
                format_hours(hours),
                format_instant(when)
            );
        }
        None => println!("Sleep: estimate unavailable (check settings)"),
    }

    Ok(())
}

fn cmd_stats(
    records_path: &Path,
    period: &str,
    date: Option<&str>,
    sort_by: &str,
    config: &Config,
) -> Result<()> {
    // Parameters are validated even though stats only sums raw amounts, so
    // a broken config is caught uniformly across commands.
    config.pharmacokinetics.user_parameters()?;
    let records = load_records(records_path)?;

    let anchor = match date {
        Some(s) => parse_anchor_date(s)?,
        None => Utc::now().timestamp_millis(),
    };

    let sort_by = match sort_by.to_lowercase().as_str() {
        "count" => SortBy::Count,
        "amount" => SortBy::Amount,
        other => {
            eprintln!("Unknown sort key: {}. Using amount.", other);
            SortBy::Amount
        }
    };

    let tz = Local;
    let (title, start, end, buckets) = match period.to_lowercase().as_str() {
        "day" => (
            "Day",
            calendar::start_of_day(anchor, &tz),
            calendar::end_of_day(anchor, &tz),
            Vec::new(),
        ),
        "week" => (
            "Week",
            calendar::start_of_week(anchor, &tz),
            calendar::end_of_week(anchor, &tz),
            daily_totals_for_week(&records, anchor, &tz),
        ),
        "month" => (
            "Month",
            calendar::start_of_month(anchor, &tz),
            calendar::end_of_month(anchor, &tz),
            daily_totals_for_month(&records, anchor, &tz),
        ),
        "year" => (
            "Year",
            calendar::start_of_year(anchor, &tz),
            calendar::end_of_year(anchor, &tz),
            monthly_totals_for_year(&records, anchor, &tz),
        ),
        other => {
            return Err(Error::Other(format!(
                "unknown period: {} (expected day, week, month, or year)",
                other
            )))
        }
    };

    println!("{} total: {:.0} mg", title, total_in_range(&records, start, end));
    for bucket in &buckets {
        println!("  {:<4} {:>6.0} mg", bucket.label, bucket.value);
    }

    let shares = source_distribution(&records, sort_by);
    if !shares.is_empty() {
        println!("Sources:");
        for share in &shares {
            println!(
                "  {:<24} {:>6.0} mg  x{:<4} {:>6.2}%",
                share.display_name, share.amount, share.count, share.percentage
            );
        }
    }

    Ok(())
}

fn cmd_curve(
    records_path: &Path,
    at: Option<i64>,
    hours_before: Option<f64>,
    hours_after: Option<f64>,
    points_per_hour: Option<u32>,
    config: &Config,
) -> Result<()> {
    let params = config.pharmacokinetics.user_parameters()?;
    let records = load_records(records_path)?;

    let now = at.unwrap_or_else(|| Utc::now().timestamp_millis());
    let points = metabolism_series(
        &records,
        params.half_life_hours,
        now,
        hours_before.unwrap_or(config.chart.hours_before),
        hours_after.unwrap_or(config.chart.hours_after),
        points_per_hour.unwrap_or(config.chart.points_per_hour),
    );

    if points.is_empty() {
        println!("No samples (check window and sampling settings)");
        return Ok(());
    }

    for point in &points {
        println!("{}  {:>7.1} mg", format_instant(point.time), point.caffeine);
    }

    Ok(())
}

fn cmd_dose(per_100ml: Option<f64>, per_gram: Option<f64>, serving: f64) -> Result<()> {
    let spec = match (per_100ml, per_gram) {
        (Some(content), None) => DrinkSpec {
            calculation_mode: CalculationMode::Per100ml,
            caffeine_content: Some(content),
            caffeine_per_gram: None,
        },
        (None, Some(per_gram)) => DrinkSpec {
            calculation_mode: CalculationMode::PerGram,
            caffeine_content: None,
            caffeine_per_gram: Some(per_gram),
        },
        _ => {
            return Err(Error::Other(
                "specify exactly one of --per-100ml or --per-gram".into(),
            ))
        }
    };

    println!("{:.0} mg", intake_amount(&spec, serving));
    Ok(())
}

/// Load records from an exported file.
///
/// Accepts either the full backup document or a bare record array.
/// Malformed individual records are skipped with a warning rather than
/// failing the whole file.
fn load_records(path: &Path) -> Result<Vec<IntakeRecord>> {
    let contents = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&contents)?;

    let raw = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut doc) => match doc.remove("records") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(Error::Other(format!(
                    "no records array found in {}",
                    path.display()
                )))
            }
        },
        _ => {
            return Err(Error::Other(format!(
                "unsupported records format in {}",
                path.display()
            )))
        }
    };

    let mut records = Vec::with_capacity(raw.len());
    for item in raw {
        match serde_json::from_value::<IntakeRecord>(item) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("Skipping malformed record: {}", e),
        }
    }

    tracing::debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

fn parse_anchor_date(date: &str) -> Result<i64> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| Error::Other(format!("invalid date '{}': {}", date, e)))?;
    // Anchor at local noon; bucketing only cares which day it lands in.
    let noon = parsed
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| Error::Other(format!("invalid date '{}'", date)))?;
    Local
        .from_local_datetime(&noon)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| Error::Other(format!("date '{}' is not representable locally", date)))
}

fn format_instant(instant_ms: i64) -> String {
    Local
        .timestamp_millis_opt(instant_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "?".to_string())
}

fn format_hours(hours: f64) -> String {
    let whole_hours = hours.floor() as i64;
    let minutes = ((hours - whole_hours as f64) * 60.0).round() as i64;
    let (whole_hours, minutes) = if minutes == 60 {
        (whole_hours + 1, 0)
    } else {
        (whole_hours, minutes)
    };
    if whole_hours == 0 {
        format!("{}m", minutes)
    } else if minutes == 0 {
        format!("{}h", whole_hours)
    } else {
        format!("{}h {}m", whole_hours, minutes)
    }
}
