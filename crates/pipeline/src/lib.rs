use analytics::{AnalyticsError, MetricsEngine, resample};
use core_types::{FrequencySpec, PriceSeries, ReturnSeries};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::collections::BTreeMap;

pub mod store;

pub use store::{MetricCell, PairKey, PairOutcome, ResultStore};

/// Runs the resample-then-measure pipeline for every (symbol, frequency) pair.
///
/// Pairs are independent: each one's failure is recorded in its own slot of the
/// returned store and never stops the rest of the batch.
#[derive(Debug)]
pub struct PipelineOrchestrator {
    frequencies: Vec<FrequencySpec>,
    engine: MetricsEngine,
}

impl PipelineOrchestrator {
    /// Creates an orchestrator for the given frequencies.
    /// A frequency listed twice is evaluated once, with its first spec.
    pub fn new(frequencies: Vec<FrequencySpec>) -> Self {
        let mut unique: Vec<FrequencySpec> = Vec::with_capacity(frequencies.len());
        for spec in frequencies {
            if !unique.iter().any(|s| s.frequency == spec.frequency) {
                unique.push(spec);
            }
        }
        Self {
            frequencies: unique,
            engine: MetricsEngine::new(),
        }
    }

    pub fn frequencies(&self) -> &[FrequencySpec] {
        &self.frequencies
    }

    pub fn run_all(&self, assets: &BTreeMap<String, PriceSeries>, benchmark: &PriceSeries) -> ResultStore {
        self.run_all_with_progress(assets, benchmark, &ProgressBar::hidden())
    }

    /// Same as [`PipelineOrchestrator::run_all`], advancing `progress` once per finished pair.
    pub fn run_all_with_progress(
        &self,
        assets: &BTreeMap<String, PriceSeries>,
        benchmark: &PriceSeries,
        progress: &ProgressBar,
    ) -> ResultStore {
        let total_pairs = assets.len() * self.frequencies.len();
        tracing::info!(
            assets = assets.len(),
            frequencies = self.frequencies.len(),
            benchmark = benchmark.symbol(),
            threads = rayon::current_num_threads(),
            "Starting metrics run over {} pairs",
            total_pairs
        );

        // The benchmark only depends on the frequency, so resample it once per frequency.
        let benchmarks: Vec<(FrequencySpec, Result<ReturnSeries, AnalyticsError>)> = self
            .frequencies
            .par_iter()
            .map(|spec| (*spec, resample(benchmark, spec)))
            .collect();

        let pairs: Vec<(&String, &PriceSeries, &FrequencySpec, &Result<ReturnSeries, AnalyticsError>)> = assets
            .iter()
            .flat_map(|(symbol, prices)| {
                benchmarks
                    .iter()
                    .map(move |(spec, bench)| (symbol, prices, spec, bench))
            })
            .collect();

        progress.set_length(pairs.len() as u64);

        let outcomes: Vec<(PairKey, PairOutcome)> = pairs
            .into_par_iter()
            .map(|(symbol, prices, spec, bench)| {
                let outcome = self.evaluate_pair(prices, spec, bench);
                progress.inc(1);
                (PairKey::new(symbol.as_str(), spec.frequency), outcome)
            })
            .collect();

        let mut store = ResultStore::default();
        for (key, outcome) in outcomes {
            if let Err(e) = &outcome {
                tracing::warn!(symbol = %key.symbol, frequency = %key.frequency, error = %e, "Pair failed");
            }
            store.insert(key, outcome);
        }

        tracing::info!(
            pairs = store.len(),
            failed = store.failures().count(),
            "Metrics run complete"
        );
        store
    }

    fn evaluate_pair(
        &self,
        prices: &PriceSeries,
        spec: &FrequencySpec,
        benchmark: &Result<ReturnSeries, AnalyticsError>,
    ) -> PairOutcome {
        let returns = resample(prices, spec)?;
        let benchmark = benchmark.as_ref().map_err(Clone::clone)?;
        self.engine.compute(&returns, benchmark, spec)
    }
}
