use crate::error::ConfigError;
use chrono::NaiveDate;
use core_types::{Frequency, FrequencySpec};
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub universe: Universe,
    pub data: Data,
    #[serde(default)] // Use default values if the [analysis] section is missing
    pub analysis: Analysis,
    #[serde(default)]
    pub logging: Logging,
}

/// The symbols to evaluate and the benchmark they are measured against.
#[derive(Debug, Clone, Deserialize)]
pub struct Universe {
    /// Asset symbols (e.g., "ITC.NS").
    pub symbols: Vec<String>,
    /// The benchmark symbol (e.g., "^NSEI").
    pub benchmark: String,
}

/// Where price histories are read from and which window of them is used.
#[derive(Debug, Clone, Deserialize)]
pub struct Data {
    /// Directory holding one `<symbol>.csv` file per symbol.
    pub directory: PathBuf,
    /// First day (inclusive) of the common date range.
    pub start_date: Option<NaiveDate>,
    /// Last day (inclusive) of the common date range.
    pub end_date: Option<NaiveDate>,
}

/// Contains parameters for the metrics pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Analysis {
    #[serde(default = "default_frequencies")]
    pub frequencies: Vec<Frequency>,
    /// Per-frequency overrides of the periods-per-year factor.
    #[serde(default)]
    pub annualization: Annualization,
    /// Worker threads for the pipeline; defaults to one per CPU core.
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Annualization {
    pub daily: Option<f64>,
    pub monthly: Option<f64>,
    pub intraday: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    /// An `EnvFilter` directive such as "info" or "riskboard=debug,pipeline=info".
    #[serde(default = "default_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---

fn default_frequencies() -> Vec<Frequency> {
    Frequency::ALL.to_vec()
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            frequencies: default_frequencies(),
            annualization: Annualization::default(),
            threads: None,
        }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: None,
        }
    }
}

impl Annualization {
    pub fn factor_for(&self, frequency: Frequency) -> Option<f64> {
        match frequency {
            Frequency::Daily => self.daily,
            Frequency::Monthly => self.monthly,
            Frequency::Intraday => self.intraday,
        }
    }
}

impl Config {
    /// Checks the cross-field rules that deserialization alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.universe.symbols.is_empty() {
            return Err(ConfigError::ValidationError(
                "universe.symbols must list at least one symbol".to_string(),
            ));
        }
        if let Some(blank) = self.universe.symbols.iter().position(|s| s.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "universe.symbols[{blank}] is empty"
            )));
        }
        if self.universe.benchmark.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "universe.benchmark must not be empty".to_string(),
            ));
        }
        if self.universe.symbols.contains(&self.universe.benchmark) {
            return Err(ConfigError::ValidationError(format!(
                "benchmark '{}' must not also be listed in universe.symbols",
                self.universe.benchmark
            )));
        }
        if self.analysis.frequencies.is_empty() {
            return Err(ConfigError::ValidationError(
                "analysis.frequencies must list at least one frequency".to_string(),
            ));
        }
        if self.analysis.threads == Some(0) {
            return Err(ConfigError::ValidationError(
                "analysis.threads must be at least 1".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (self.data.start_date, self.data.end_date) {
            if start > end {
                return Err(ConfigError::ValidationError(format!(
                    "data.start_date {start} is after data.end_date {end}"
                )));
            }
        }
        // Surfaces invalid annualization overrides.
        self.frequency_specs()?;
        Ok(())
    }

    /// Builds the specs for the configured frequencies, applying any annualization overrides.
    pub fn frequency_specs(&self) -> Result<Vec<FrequencySpec>, ConfigError> {
        self.analysis
            .frequencies
            .iter()
            .map(|&frequency| self.frequency_spec(frequency))
            .collect()
    }

    /// Builds the `FrequencySpec` for one frequency, whether or not it is listed in `analysis.frequencies`.
    pub fn frequency_spec(&self, frequency: Frequency) -> Result<FrequencySpec, ConfigError> {
        let spec = FrequencySpec::new(frequency);
        match self.analysis.annualization.factor_for(frequency) {
            Some(factor) => spec
                .with_annualization_factor(factor)
                .map_err(|e| ConfigError::ValidationError(e.to_string())),
            None => Ok(spec),
        }
    }
}
