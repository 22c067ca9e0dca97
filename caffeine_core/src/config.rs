//! Configuration file support for cafftrack.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/cafftrack/config.toml`.
//! Every field has a default matching the averages the model was built
//! around, so a partial (or absent) file is fine.

use crate::{Error, Result, UserParameters};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub pharmacokinetics: PharmacokineticsConfig,

    #[serde(default)]
    pub chart: ChartConfig,
}

/// Pharmacokinetic parameters as stored on disk.
///
/// These are raw file values; [`PharmacokineticsConfig::user_parameters`]
/// is the validated path into the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PharmacokineticsConfig {
    /// Body weight in kilograms.
    #[serde(default = "default_weight_kg")]
    pub weight_kg: f64,

    /// Caffeine elimination half-life in hours.
    #[serde(default = "default_half_life_hours")]
    pub half_life_hours: f64,

    /// Volume of distribution in L/kg.
    #[serde(default = "default_volume_of_distribution")]
    pub volume_of_distribution_l_per_kg: f64,

    /// Safe pre-sleep plasma concentration in mg/L.
    #[serde(default = "default_sleep_threshold")]
    pub safe_sleep_threshold_mg_l: f64,
}

impl Default for PharmacokineticsConfig {
    fn default() -> Self {
        Self {
            weight_kg: default_weight_kg(),
            half_life_hours: default_half_life_hours(),
            volume_of_distribution_l_per_kg: default_volume_of_distribution(),
            safe_sleep_threshold_mg_l: default_sleep_threshold(),
        }
    }
}

impl PharmacokineticsConfig {
    /// Validate the file values into engine parameters.
    pub fn user_parameters(&self) -> Result<UserParameters> {
        UserParameters::new(
            self.weight_kg,
            self.half_life_hours,
            self.volume_of_distribution_l_per_kg,
            self.safe_sleep_threshold_mg_l,
        )
    }
}

/// Metabolism chart window configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_hours_before")]
    pub hours_before: f64,

    #[serde(default = "default_hours_after")]
    pub hours_after: f64,

    #[serde(default = "default_points_per_hour")]
    pub points_per_hour: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            hours_before: default_hours_before(),
            hours_after: default_hours_after(),
            points_per_hour: default_points_per_hour(),
        }
    }
}

// Default value functions
fn default_weight_kg() -> f64 {
    60.0
}

fn default_half_life_hours() -> f64 {
    4.0
}

fn default_volume_of_distribution() -> f64 {
    0.6
}

fn default_sleep_threshold() -> f64 {
    1.5
}

fn default_hours_before() -> f64 {
    crate::series::DEFAULT_HOURS_BEFORE
}

fn default_hours_after() -> f64 {
    crate::series::DEFAULT_HOURS_AFTER
}

fn default_points_per_hour() -> u32 {
    crate::series::DEFAULT_POINTS_PER_HOUR
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME")
                .expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("cafftrack").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pharmacokinetics.weight_kg, 60.0);
        assert_eq!(config.pharmacokinetics.half_life_hours, 4.0);
        assert_eq!(config.chart.points_per_hour, 4);
        assert!(config.pharmacokinetics.user_parameters().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(
            config.pharmacokinetics.half_life_hours,
            parsed.pharmacokinetics.half_life_hours
        );
        assert_eq!(config.chart.hours_after, parsed.chart.hours_after);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[pharmacokinetics]
half_life_hours = 5.5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.pharmacokinetics.half_life_hours, 5.5);
        assert_eq!(config.pharmacokinetics.weight_kg, 60.0); // default
        assert_eq!(config.chart.hours_before, 6.0); // default
    }

    #[test]
    fn test_invalid_file_values_fail_validation() {
        let toml_str = r#"
[pharmacokinetics]
weight_kg = -70.0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.pharmacokinetics.user_parameters().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.pharmacokinetics.weight_kg = 72.5;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.pharmacokinetics.weight_kg, 72.5);
    }
}
