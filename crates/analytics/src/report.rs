use crate::error::AnalyticsError;
use core_types::Frequency;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The metrics reported for every (symbol, frequency) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Alpha,
    Beta,
    #[cfg_attr(feature = "clap", value(alias = "vol"))]
    Volatility,
    #[cfg_attr(feature = "clap", value(alias = "sharpe"))]
    SharpeRatio,
    #[cfg_attr(feature = "clap", value(alias = "drawdown"))]
    MaxDrawdown,
    #[cfg_attr(feature = "clap", value(alias = "r2"))]
    RSquared,
    #[cfg_attr(feature = "clap", value(alias = "downside"))]
    DownsideDeviation,
    #[cfg_attr(feature = "clap", value(alias = "var"))]
    Var95,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Alpha,
        Metric::Beta,
        Metric::Volatility,
        Metric::SharpeRatio,
        Metric::MaxDrawdown,
        Metric::RSquared,
        Metric::DownsideDeviation,
        Metric::Var95,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Alpha => "Alpha",
            Metric::Beta => "Beta",
            Metric::Volatility => "Volatility",
            Metric::SharpeRatio => "Sharpe Ratio",
            Metric::MaxDrawdown => "Max Drawdown",
            Metric::RSquared => "R-Squared",
            Metric::DownsideDeviation => "Downside Deviation",
            Metric::Var95 => "VaR (95%)",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Risk and performance metrics of one symbol at one frequency.
///
/// Produced by the `MetricsEngine` and never modified afterwards. Statistics
/// that can be undefined for a valid input are `None` rather than zero:
/// the Sharpe ratio when returns do not vary, R-squared when the asset's
/// returns do not vary, and downside deviation when fewer than two returns
/// are negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub(crate) symbol: String,
    pub(crate) frequency: Frequency,
    /// Number of paired returns the metrics were computed from.
    pub(crate) observations: usize,

    // I. Benchmark-relative
    pub(crate) alpha: f64, // per period, not annualized
    pub(crate) beta: f64,
    pub(crate) r_squared: Option<f64>,

    // II. Dispersion and reward
    pub(crate) volatility: f64, // annualized
    pub(crate) sharpe_ratio: Option<f64>,
    pub(crate) downside_deviation: Option<f64>,

    // III. Tail and path risk
    pub(crate) max_drawdown: f64,
    pub(crate) var_95: f64,
}

impl MetricsResult {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn observations(&self) -> usize {
        self.observations
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn sharpe_ratio(&self) -> Option<f64> {
        self.sharpe_ratio
    }

    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }

    pub fn r_squared(&self) -> Option<f64> {
        self.r_squared
    }

    pub fn downside_deviation(&self) -> Option<f64> {
        self.downside_deviation
    }

    pub fn var_95(&self) -> f64 {
        self.var_95
    }

    /// Looks up a metric by name, `None` when it is undefined for this series.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Alpha => Some(self.alpha),
            Metric::Beta => Some(self.beta),
            Metric::Volatility => Some(self.volatility),
            Metric::SharpeRatio => self.sharpe_ratio,
            Metric::MaxDrawdown => Some(self.max_drawdown),
            Metric::RSquared => self.r_squared,
            Metric::DownsideDeviation => self.downside_deviation,
            Metric::Var95 => Some(self.var_95),
        }
    }

    /// Like [`MetricsResult::get`], but an undefined metric is an `UndefinedStatistic` error.
    pub fn value(&self, metric: Metric) -> Result<f64, AnalyticsError> {
        self.get(metric)
            .ok_or(AnalyticsError::UndefinedStatistic { metric })
    }
}
