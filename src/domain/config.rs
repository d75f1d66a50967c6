use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    metrics::{COMPARISON_WINDOW, TREND_WINDOW},
    storage::DEFAULT_CAPACITY,
};

/// Configuration for the calculator.
///
/// This struct holds settings that control how much history is kept, which
/// schedule is assumed when none is given, and how reports are presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The maximum number of calculations kept in the history.
    history_capacity: usize,

    /// Working hours per day used when neither the command line nor the
    /// history provide one.
    ///
    /// Stored as a string, like every calculation input.
    default_hours_per_day: String,

    /// Working days per week used when neither the command line nor the
    /// history provide one.
    default_days_per_week: String,

    /// Symbol printed in front of amounts of money.
    pub currency_symbol: String,

    /// How many recent calculations the comparison report covers.
    comparison_window: usize,

    /// How many recent calculations the hourly rate trend covers.
    trend_window: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            default_hours_per_day: default_hours_per_day(),
            default_days_per_week: default_days_per_week(),
            currency_symbol: default_currency_symbol(),
            comparison_window: default_comparison_window(),
            trend_window: default_trend_window(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the maximum number of history entries.
    ///
    /// Between 1 and 10.
    #[must_use]
    pub const fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    /// Sets the maximum number of history entries.
    ///
    /// The capacity is clamped to `1..=10`.
    pub fn set_history_capacity(&mut self, capacity: usize) {
        self.history_capacity = clamp_capacity(capacity);
    }

    /// Returns the fallback number of working hours per day.
    #[must_use]
    pub fn default_hours_per_day(&self) -> &str {
        &self.default_hours_per_day
    }

    /// Returns the fallback number of working days per week.
    #[must_use]
    pub fn default_days_per_week(&self) -> &str {
        &self.default_days_per_week
    }

    /// Returns the number of entries shown in the comparison report.
    #[must_use]
    pub const fn comparison_window(&self) -> usize {
        self.comparison_window
    }

    /// Returns the number of entries shown in the trend report.
    #[must_use]
    pub const fn trend_window(&self) -> usize {
        self.trend_window
    }
}

fn clamp_capacity(capacity: usize) -> usize {
    capacity.clamp(1, DEFAULT_CAPACITY)
}

const fn default_history_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_hours_per_day() -> String {
    "8".to_string()
}

fn default_days_per_week() -> String {
    "5".to_string()
}

fn default_currency_symbol() -> String {
    "€".to_string()
}

const fn default_comparison_window() -> usize {
    COMPARISON_WINDOW
}

const fn default_trend_window() -> usize {
    TREND_WINDOW
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_history_capacity")]
        history_capacity: usize,

        #[serde(default = "default_hours_per_day")]
        default_hours_per_day: String,

        #[serde(default = "default_days_per_week")]
        default_days_per_week: String,

        #[serde(default = "default_currency_symbol")]
        currency_symbol: String,

        #[serde(default = "default_comparison_window")]
        comparison_window: usize,

        #[serde(default = "default_trend_window")]
        trend_window: usize,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                history_capacity,
                default_hours_per_day,
                default_days_per_week,
                currency_symbol,
                comparison_window,
                trend_window,
            } => Self {
                history_capacity: clamp_capacity(history_capacity),
                default_hours_per_day,
                default_days_per_week,
                currency_symbol,
                comparison_window,
                trend_window,
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            history_capacity: config.history_capacity,
            default_hours_per_day: config.default_hours_per_day,
            default_days_per_week: config.default_days_per_week,
            currency_symbol: config.currency_symbol,
            comparison_window: config.comparison_window,
            trend_window: config.trend_window,
        }
    }
}
