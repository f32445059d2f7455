//! Sample statistics over return sequences.
//!
//! Dispersion estimators use the `n - 1` denominator. Every function returns
//! `None` when its input cannot define the statistic, so callers decide how
//! an undefined value is reported.

/// Variance at or below this fraction of the series' mean square is treated as zero.
///
/// Rounding residue left by a constant series stays many orders of magnitude
/// below it, while any real spread, however small in absolute terms, is far above.
pub const RELATIVE_TOLERANCE: f64 = 1e-20;

pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Sample covariance. Requires two equally long sequences of at least two points.
pub fn covariance(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mean_x = mean(xs)?;
    let mean_y = mean(ys)?;
    let sum: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    Some(sum / (xs.len() - 1) as f64)
}

/// Sample variance, computed as the covariance of the series with itself.
pub fn variance(xs: &[f64]) -> Option<f64> {
    covariance(xs, xs)
}

pub fn std_dev(xs: &[f64]) -> Option<f64> {
    variance(xs).map(f64::sqrt)
}

/// Mean of the squared values.
pub fn mean_square(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().map(|x| x * x).sum::<f64>() / xs.len() as f64)
}

/// Returns true when `variance`, the sample variance of `xs`, should be treated as zero.
///
/// The cutoff scales with the data, so a series that never moves is degenerate
/// at any price level and a tiny but genuine spread is not.
pub fn is_degenerate(xs: &[f64], variance: f64) -> bool {
    let scale = mean_square(xs).unwrap_or_default();
    variance <= RELATIVE_TOLERANCE * scale
}

/// The `q`-th percentile (0 to 100) with linear interpolation between closest ranks.
///
/// For sorted values `x` the rank is `h = q / 100 * (n - 1)` and the result is
/// `x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)])`.
pub fn percentile(xs: &[f64], q: f64) -> Option<f64> {
    if xs.is_empty() || !(0.0..=100.0).contains(&q) {
        return None;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let weight = rank - lower as f64;
    Some(sorted[lower] + weight * (sorted[upper] - sorted[lower]))
}

/// Largest peak-to-trough decline of the wealth curve compounded from `returns`.
///
/// Wealth starts at 1.0, so a loss in the very first period already counts as
/// a drawdown. The result lies in `[-1, 0]`.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut wealth = 1.0;
    let mut peak = 1.0;
    let mut max_drawdown: f64 = 0.0;

    for r in returns {
        wealth *= 1.0 + r;
        if wealth > peak {
            peak = wealth;
        }
        let drawdown = (wealth - peak) / peak;
        if drawdown < max_drawdown {
            max_drawdown = drawdown;
        }
    }

    max_drawdown.max(-1.0)
}
