use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Analysis, Annualization, Config, Data, Logging, Universe};

/// Prefix of environment variables that override file values,
/// e.g. `RISKBOARD__UNIVERSE__BENCHMARK=^NSEI`.
pub const ENV_PREFIX: &str = "RISKBOARD";

/// Loads the application configuration from a TOML file, layered with environment overrides.
///
/// This function is the primary entry point for this crate. It reads the configuration file,
/// deserializes it into our strongly-typed `Config` struct, validates it, and returns it.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .add_source(environment())
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), symbols = config.universe.symbols.len(), "Configuration loaded");
    Ok(config)
}

/// Parses and validates a configuration from TOML text, without environment overrides.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("universe.symbols")
        .with_list_parse_key("analysis.frequencies")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Frequency;
    use std::io::Write;

    const MINIMAL: &str = r#"
        [universe]
        symbols = ["ITC.NS", "TCS.NS", "WIPRO.NS"]
        benchmark = "^NSEI"

        [data]
        directory = "data"
    "#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.universe.symbols.len(), 3);
        assert_eq!(config.analysis.frequencies, Frequency::ALL.to_vec());
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.directory.is_none());
        assert!(config.data.start_date.is_none());

        let specs = config.frequency_specs().unwrap();
        let factors: Vec<f64> = specs.iter().map(|s| s.annualization_factor).collect();
        assert_eq!(factors, vec![252.0, 12.0, 98_280.0]);
    }

    #[test]
    fn full_config_with_overrides() {
        let config = parse_config(
            r#"
            [universe]
            symbols = ["ITC.NS"]
            benchmark = "^NSEI"

            [data]
            directory = "prices"
            start_date = "2015-01-01"
            end_date = "2024-12-01"

            [analysis]
            frequencies = ["monthly", "1d"]
            threads = 4

            [analysis.annualization]
            monthly = 252.0

            [logging]
            level = "debug"
            directory = "logs"
            "#,
        )
        .unwrap();

        assert_eq!(config.analysis.frequencies, vec![Frequency::Monthly, Frequency::Daily]);
        assert_eq!(config.analysis.threads, Some(4));
        assert_eq!(config.data.start_date.unwrap().to_string(), "2015-01-01");
        let specs = config.frequency_specs().unwrap();
        assert_eq!(specs[0].annualization_factor, 252.0);
        assert_eq!(specs[1].annualization_factor, 252.0);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn benchmark_cannot_be_an_asset() {
        let err = parse_config(
            r#"
            [universe]
            symbols = ["^NSEI"]
            benchmark = "^NSEI"
            [data]
            directory = "data"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn rejects_inverted_date_range() {
        let err = parse_config(&format!(
            "{MINIMAL}\nstart_date = \"2024-01-01\"\nend_date = \"2023-01-01\"\n"
        ))
        .unwrap_err();
        assert!(err.to_string().contains("start_date"));
    }

    #[test]
    fn rejects_non_positive_annualization() {
        let err = parse_config(&format!("{MINIMAL}\n[analysis.annualization]\ndaily = -1.0\n")).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn rejects_unknown_frequency() {
        let err = parse_config(&format!("{MINIMAL}\n[analysis]\nfrequencies = [\"weekly\"]\n")).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }

    #[test]
    fn rejects_empty_universe() {
        let err = parse_config(
            r#"
            [universe]
            symbols = []
            benchmark = "^NSEI"
            [data]
            directory = "data"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("at least one symbol"));
    }

    #[test]
    fn loads_from_a_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.universe.benchmark, "^NSEI");
        assert!(load_config(Path::new("does/not/exist.toml")).is_err());
    }
}
