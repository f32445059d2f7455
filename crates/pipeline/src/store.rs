use analytics::{AnalyticsError, Metric, MetricsResult};
use core_types::Frequency;
use serde::ser::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// The outcome recorded for one (symbol, frequency) pair.
pub type PairOutcome = Result<MetricsResult, AnalyticsError>;

/// Identifies a slot in the [`ResultStore`]. Orders by symbol, then frequency.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    pub symbol: String,
    pub frequency: Frequency,
}

impl PairKey {
    pub fn new(symbol: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            symbol: symbol.into(),
            frequency,
        }
    }
}

/// A single value in a cross-symbol projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricCell<'a> {
    Value(f64),
    /// The pair was computed but this statistic is undefined for it.
    NotApplicable,
    /// The pair itself failed.
    Failed(&'a AnalyticsError),
}

impl MetricCell<'_> {
    pub fn value(&self) -> Option<f64> {
        match self {
            MetricCell::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// Metrics (or the failure that prevented them) for every evaluated pair.
///
/// Populated once by the `PipelineOrchestrator` and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    entries: BTreeMap<PairKey, PairOutcome>,
}

impl ResultStore {
    /// Records a pair's outcome. The first outcome written for a key is kept.
    pub(crate) fn insert(&mut self, key: PairKey, outcome: PairOutcome) {
        self.entries.entry(key).or_insert(outcome);
    }

    /// `None` only when the pair was never requested.
    pub fn get(&self, symbol: &str, frequency: Frequency) -> Option<&PairOutcome> {
        self.entries.get(&PairKey::new(symbol, frequency))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &PairOutcome)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn symbols(&self) -> Vec<&str> {
        let unique: BTreeSet<&str> = self.entries.keys().map(|k| k.symbol.as_str()).collect();
        unique.into_iter().collect()
    }

    pub fn frequencies(&self) -> Vec<Frequency> {
        let unique: BTreeSet<Frequency> = self.entries.keys().map(|k| k.frequency).collect();
        unique.into_iter().collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&PairKey, &AnalyticsError)> {
        self.entries
            .iter()
            .filter_map(|(key, outcome)| outcome.as_ref().err().map(|e| (key, e)))
    }

    /// Projects one metric across all symbols evaluated at `frequency`, ordered by symbol.
    pub fn metric_by_symbol(&self, frequency: Frequency, metric: Metric) -> Vec<(&str, MetricCell<'_>)> {
        self.entries
            .iter()
            .filter(|(key, _)| key.frequency == frequency)
            .map(|(key, outcome)| {
                let cell = match outcome {
                    Ok(result) => result
                        .get(metric)
                        .map_or(MetricCell::NotApplicable, MetricCell::Value),
                    Err(e) => MetricCell::Failed(e),
                };
                (key.symbol.as_str(), cell)
            })
            .collect()
    }

    pub fn volatilities(&self, frequency: Frequency) -> Vec<(&str, MetricCell<'_>)> {
        self.metric_by_symbol(frequency, Metric::Volatility)
    }

    pub fn sharpe_ratios(&self, frequency: Frequency) -> Vec<(&str, MetricCell<'_>)> {
        self.metric_by_symbol(frequency, Metric::SharpeRatio)
    }

    pub fn var_95s(&self, frequency: Frequency) -> Vec<(&str, MetricCell<'_>)> {
        self.metric_by_symbol(frequency, Metric::Var95)
    }
}

#[derive(serde::Serialize)]
struct Record<'a> {
    symbol: &'a str,
    frequency: Frequency,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<&'a MetricsResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Serializes as a list of `{symbol, frequency, status, metrics | error}` records.
impl Serialize for ResultStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter().map(|(key, outcome)| Record {
            symbol: &key.symbol,
            frequency: key.frequency,
            status: if outcome.is_ok() { "ok" } else { "failed" },
            metrics: outcome.as_ref().ok(),
            error: outcome.as_ref().err().map(ToString::to_string),
        }))
    }
}
