use crate::error::AnalyticsError;
use crate::report::MetricsResult;
use crate::stats;
use core_types::{FrequencySpec, ReturnSeries};

/// Confidence level of the reported Value-at-Risk, as a percentile of returns.
const VAR_PERCENTILE: f64 = 5.0;

/// A stateless calculator for deriving risk metrics from a return series and its benchmark.
#[derive(Debug, Default)]
pub struct MetricsEngine {}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating metrics.
    ///
    /// # Arguments
    ///
    /// * `returns` - The asset's return series.
    /// * `benchmark` - The benchmark's return series at the same frequency, aligned
    ///   period for period with `returns`.
    /// * `spec` - The frequency both series were resampled at; supplies the
    ///   annualization factor.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `MetricsResult` or an `AnalyticsError`.
    pub fn compute(
        &self,
        returns: &ReturnSeries,
        benchmark: &ReturnSeries,
        spec: &FrequencySpec,
    ) -> Result<MetricsResult, AnalyticsError> {
        if returns.len() != benchmark.len() {
            return Err(AnalyticsError::LengthMismatch {
                symbol: returns.symbol().to_string(),
                frequency: spec.frequency,
                asset: returns.len(),
                benchmark: benchmark.len(),
            });
        }

        let asset = returns.values();
        let bench = benchmark.values();

        let (alpha, beta, r_squared) = self.calculate_regression(returns, &asset, &bench, spec)?;
        let (volatility, sharpe_ratio, downside_deviation) = self.calculate_dispersion(&asset, spec);
        let max_drawdown = stats::max_drawdown(&asset);
        let var_95 = stats::percentile(&asset, VAR_PERCENTILE).ok_or_else(|| AnalyticsError::InsufficientHistory {
            symbol: returns.symbol().to_string(),
            frequency: spec.frequency,
            periods: asset.len(),
        })?;

        tracing::debug!(
            symbol = returns.symbol(),
            frequency = %spec.frequency,
            observations = asset.len(),
            beta,
            volatility,
            "computed metrics"
        );

        Ok(MetricsResult {
            symbol: returns.symbol().to_string(),
            frequency: spec.frequency,
            observations: asset.len(),
            alpha,
            beta,
            r_squared,
            volatility,
            sharpe_ratio,
            downside_deviation,
            max_drawdown,
            var_95,
        })
    }

    /// Calculates beta, per-period alpha and R-squared against the benchmark.
    fn calculate_regression(
        &self,
        returns: &ReturnSeries,
        asset: &[f64],
        bench: &[f64],
        spec: &FrequencySpec,
    ) -> Result<(f64, f64, Option<f64>), AnalyticsError> {
        let degenerate = || AnalyticsError::DegenerateVariance {
            symbol: returns.symbol().to_string(),
            frequency: spec.frequency,
        };

        let bench_variance = stats::variance(bench).ok_or_else(degenerate)?;
        if stats::is_degenerate(bench, bench_variance) {
            return Err(degenerate());
        }
        let covariance = stats::covariance(asset, bench).ok_or_else(degenerate)?;
        let beta = covariance / bench_variance;

        let mean_asset = stats::mean(asset).ok_or_else(degenerate)?;
        let mean_bench = stats::mean(bench).ok_or_else(degenerate)?;
        let alpha = mean_asset - beta * mean_bench;

        // Squared Pearson correlation; undefined when the asset itself never moves.
        let r_squared = stats::variance(asset)
            .filter(|v| !stats::is_degenerate(asset, *v))
            .map(|asset_variance| {
                let r2 = (covariance * covariance) / (asset_variance * bench_variance);
                r2.clamp(0.0, 1.0)
            });

        Ok((alpha, beta, r_squared))
    }

    /// Calculates annualized volatility, the Sharpe ratio and downside deviation.
    fn calculate_dispersion(&self, asset: &[f64], spec: &FrequencySpec) -> (f64, Option<f64>, Option<f64>) {
        let variance = stats::variance(asset).unwrap_or_default();
        let std_dev = variance.sqrt();
        let volatility = std_dev * spec.annualization_factor.sqrt();

        // Risk-free rate is taken as zero.
        let sharpe_ratio = if stats::is_degenerate(asset, variance) {
            None
        } else {
            stats::mean(asset).map(|m| m / std_dev)
        };

        let losses: Vec<f64> = asset.iter().copied().filter(|r| *r < 0.0).collect();
        let downside_deviation = stats::std_dev(&losses);

        (volatility, sharpe_ratio, downside_deviation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use crate::report::Metric;
    use chrono::{DateTime, TimeZone, Utc};
    use core_types::Frequency;

    const EPS: f64 = 1e-9;

    fn series(symbol: &str, values: &[f64]) -> ReturnSeries {
        let points: Vec<(DateTime<Utc>, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &r)| (Utc.timestamp_opt(86_400 * (i as i64 + 1), 0).unwrap(), r))
            .collect();
        ReturnSeries::new(symbol, Frequency::Daily, points)
    }

    fn daily() -> FrequencySpec {
        FrequencySpec::new(Frequency::Daily)
    }

    #[test]
    fn worked_example() {
        let engine = MetricsEngine::new();
        let asset = series("ITC.NS", &[0.10, 0.10, -0.10]);
        let bench = series("^NSEI", &[0.02, 0.01, -0.03]);
        let result = engine.compute(&asset, &bench, &daily()).unwrap();

        assert_eq!(result.symbol(), "ITC.NS");
        assert_eq!(result.observations(), 3);
        assert!((result.sharpe_ratio().unwrap() - 0.288_675_134_594_812_9).abs() < EPS);
        assert!((result.max_drawdown() + 0.10).abs() < EPS);
        let expected_vol = 0.115_470_053_837_925_15 * 252f64.sqrt();
        assert!((result.volatility() - expected_vol).abs() < EPS);
        // A single negative return cannot define a sample deviation.
        assert_eq!(result.downside_deviation(), None);
    }

    #[test]
    fn benchmark_against_itself() {
        let engine = MetricsEngine::new();
        let bench = series("^NSEI", &[0.012, -0.004, 0.007, -0.015, 0.003, 0.009]);
        let result = engine.compute(&bench, &bench, &daily()).unwrap();

        assert_eq!(result.beta(), 1.0);
        assert_eq!(result.alpha(), 0.0);
        assert_eq!(result.r_squared(), Some(1.0));
    }

    #[test]
    fn beta_and_alpha_of_a_leveraged_asset() {
        let engine = MetricsEngine::new();
        let bench_values = [0.01, -0.02, 0.015, 0.005, -0.01];
        let asset_values: Vec<f64> = bench_values.iter().map(|b| 2.0 * b + 0.001).collect();
        let result = engine
            .compute(&series("A", &asset_values), &series("B", &bench_values), &daily())
            .unwrap();

        assert!((result.beta() - 2.0).abs() < EPS);
        assert!((result.alpha() - 0.001).abs() < EPS);
        assert!((result.r_squared().unwrap() - 1.0).abs() < EPS);
    }

    #[test]
    fn constant_asset_has_undefined_ratios() {
        let engine = MetricsEngine::new();
        let asset = series("FLAT", &[0.0, 0.0, 0.0, 0.0]);
        let bench = series("B", &[0.01, -0.01, 0.02, 0.0]);
        let result = engine.compute(&asset, &bench, &daily()).unwrap();

        assert_eq!(result.volatility(), 0.0);
        assert_eq!(result.max_drawdown(), 0.0);
        assert_eq!(result.beta(), 0.0);
        assert_eq!(result.sharpe_ratio(), None);
        assert_eq!(result.r_squared(), None);
        assert_eq!(
            result.value(Metric::SharpeRatio),
            Err(AnalyticsError::UndefinedStatistic { metric: Metric::SharpeRatio })
        );
        assert_eq!(result.value(Metric::Volatility), Ok(0.0));
    }

    #[test]
    fn constant_benchmark_is_degenerate() {
        let engine = MetricsEngine::new();
        let asset = series("A", &[0.01, 0.02, -0.01]);
        let bench = series("B", &[0.0, 0.0, 0.0]);
        let err = engine.compute(&asset, &bench, &daily()).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::DegenerateVariance {
                symbol: "A".to_string(),
                frequency: Frequency::Daily,
            }
        );
    }

    #[test]
    fn small_but_real_benchmark_spread_defines_beta() {
        let engine = MetricsEngine::new();
        let tiny = [5e-8, -5e-8, 1e-7, -1e-7, 0.0];
        let asset: Vec<f64> = tiny.iter().map(|b| 3.0 * b).collect();
        let result = engine
            .compute(&series("A", &asset), &series("B", &tiny), &daily())
            .unwrap();
        assert!((result.beta() - 3.0).abs() < EPS);

        // Sharpe and R-squared share one zero test, so both are defined here.
        let result = engine.compute(&series("B", &tiny), &series("B", &tiny), &daily()).unwrap();
        assert_eq!(result.sharpe_ratio(), Some(0.0));
        assert_eq!(result.r_squared(), Some(1.0));
    }

    #[test]
    fn repeated_nonzero_returns_have_undefined_sharpe() {
        let engine = MetricsEngine::new();
        let asset = series("A", &[0.1 + 0.2, 0.3, 0.1 + 0.2, 0.3]);
        let bench = series("B", &[0.01, -0.01, 0.02, 0.0]);
        let result = engine.compute(&asset, &bench, &daily()).unwrap();
        assert_eq!(result.sharpe_ratio(), None);
        assert_eq!(result.r_squared(), None);
    }

    #[test]
    fn single_pair_is_degenerate() {
        let engine = MetricsEngine::new();
        let err = engine
            .compute(&series("A", &[0.01]), &series("B", &[0.02]), &daily())
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::DegenerateVariance { .. }));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let engine = MetricsEngine::new();
        let err = engine
            .compute(&series("A", &[0.01, 0.02]), &series("B", &[0.01, 0.02, 0.03]), &daily())
            .unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::LengthMismatch {
                symbol: "A".to_string(),
                frequency: Frequency::Daily,
                asset: 2,
                benchmark: 3,
            }
        );
    }

    #[test]
    fn downside_deviation_uses_only_losses() {
        let engine = MetricsEngine::new();
        let asset = series("A", &[0.05, -0.02, 0.03, -0.04, 0.01]);
        let bench = series("B", &[0.01, -0.01, 0.02, -0.02, 0.0]);
        let result = engine.compute(&asset, &bench, &daily()).unwrap();

        // Sample deviation of [-0.02, -0.04].
        let expected = (2.0f64 * 0.01f64.powi(2)).sqrt();
        assert!((result.downside_deviation().unwrap() - expected).abs() < EPS);
    }

    #[test]
    fn var_is_the_interpolated_fifth_percentile() {
        let engine = MetricsEngine::new();
        let values: Vec<f64> = (0..21).map(|i| (i as f64 - 10.0) / 100.0).collect();
        let bench: Vec<f64> = values.iter().rev().copied().collect();
        let result = engine
            .compute(&series("A", &values), &series("B", &bench), &daily())
            .unwrap();

        // rank 0.05 * 20 = 1.0 lands exactly on the second smallest return
        assert!((result.var_95() + 0.09).abs() < EPS);
        let below = values.iter().filter(|r| **r < result.var_95()).count();
        assert!(below as f64 <= 0.05 * values.len() as f64 + 1.0);
    }

    #[test]
    fn volatility_uses_the_spec_factor() {
        let engine = MetricsEngine::new();
        let asset = series("A", &[0.01, -0.02, 0.03]);
        let bench = series("B", &[0.02, -0.01, 0.01]);
        let monthly = FrequencySpec::new(Frequency::Monthly);
        let legacy = monthly.with_annualization_factor(252.0).unwrap();

        let a = engine.compute(&asset, &bench, &monthly).unwrap();
        let b = engine.compute(&asset, &bench, &legacy).unwrap();
        assert!((b.volatility() / a.volatility() - (252.0f64 / 12.0).sqrt()).abs() < EPS);
        assert_eq!(a.frequency(), Frequency::Monthly);
    }
}
