use crate::report::Metric;
use core_types::{CoreError, Frequency};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error(
        "Not enough history for {symbol} at {frequency}: {periods} period(s) after resampling, at least 2 required"
    )]
    InsufficientHistory {
        symbol: String,
        frequency: Frequency,
        periods: usize,
    },

    #[error(
        "Return series of {symbol} at {frequency} has {asset} entries but the benchmark has {benchmark}"
    )]
    LengthMismatch {
        symbol: String,
        frequency: Frequency,
        asset: usize,
        benchmark: usize,
    },

    #[error("Benchmark variance is zero or undefined for {symbol} at {frequency}; beta cannot be computed")]
    DegenerateVariance { symbol: String, frequency: Frequency },

    #[error("Statistic '{metric}' is undefined for this series")]
    UndefinedStatistic { metric: Metric },

    #[error("Resampling error: {0}")]
    Core(#[from] CoreError),
}
