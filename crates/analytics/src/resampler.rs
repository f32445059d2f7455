use crate::error::AnalyticsError;
use chrono::{DateTime, Utc};
use core_types::{FrequencySpec, PriceSeries, ResampleRule, ReturnSeries};

/// Buckets raw observations into contiguous periods and forward-fills the gaps.
///
/// Each period is stamped with its start instant and closes on the last
/// observation inside it. A period with no observation repeats the previous
/// period's price. The grid spans from the first observed period to the last.
pub fn resample_prices(
    prices: &PriceSeries,
    rule: &ResampleRule,
) -> Result<Vec<(DateTime<Utc>, f64)>, AnalyticsError> {
    let mut grid: Vec<(DateTime<Utc>, f64)> = Vec::with_capacity(prices.len());

    for &(ts, price) in prices.points() {
        let start = rule.period_start(ts)?;

        match grid.last().copied() {
            Some((last_start, _)) if last_start == start => {
                let idx = grid.len() - 1;
                grid[idx].1 = price;
            }
            Some((last_start, carried)) => {
                let mut next = rule.next_period_start(last_start)?;
                while next < start {
                    grid.push((next, carried));
                    next = rule.next_period_start(next)?;
                }
                grid.push((start, price));
            }
            None => grid.push((start, price)),
        }
    }

    Ok(grid)
}

/// Converts a price history into simple returns at the requested frequency.
///
/// The first period has no predecessor, so the output holds one entry per
/// period after the first. Fails with `InsufficientHistory` when fewer than
/// two periods remain after resampling.
pub fn resample(prices: &PriceSeries, spec: &FrequencySpec) -> Result<ReturnSeries, AnalyticsError> {
    let grid = resample_prices(prices, &spec.rule)?;

    if grid.len() < 2 {
        return Err(AnalyticsError::InsufficientHistory {
            symbol: prices.symbol().to_string(),
            frequency: spec.frequency,
            periods: grid.len(),
        });
    }

    let points: Vec<(DateTime<Utc>, f64)> = grid
        .windows(2)
        .map(|w| (w[1].0, w[1].1 / w[0].1 - 1.0))
        .collect();

    tracing::debug!(
        symbol = prices.symbol(),
        frequency = %spec.frequency,
        observations = prices.len(),
        periods = grid.len(),
        "resampled price series"
    );

    Ok(ReturnSeries::new(prices.symbol(), spec.frequency, points))
}
