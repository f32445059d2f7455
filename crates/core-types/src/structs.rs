use crate::enums::{Frequency, ResampleRule};
use crate::error::CoreError;
use chrono::{DateTime, Utc};

/// A frequency together with the parameters used to evaluate it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencySpec {
    pub frequency: Frequency,
    pub rule: ResampleRule,
    /// Periods per year; volatility is scaled by its square root.
    pub annualization_factor: f64,
}

impl FrequencySpec {
    /// Uses the frequency's default rule and annualization factor.
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            rule: frequency.resample_rule(),
            annualization_factor: frequency.default_annualization_factor(),
        }
    }

    /// Replaces the annualization factor, rejecting non-positive or non-finite values.
    pub fn with_annualization_factor(mut self, factor: f64) -> Result<Self, CoreError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(CoreError::InvalidInput(
                "annualization_factor".to_string(),
                format!("must be a positive number, got {factor}"),
            ));
        }
        self.annualization_factor = factor;
        Ok(self)
    }
}

impl From<Frequency> for FrequencySpec {
    fn from(frequency: Frequency) -> Self {
        Self::new(frequency)
    }
}

/// A raw price history for one symbol.
///
/// Timestamps are strictly increasing and every price is finite and positive.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<(DateTime<Utc>, f64)>,
}

impl PriceSeries {
    pub fn new(
        symbol: impl Into<String>,
        points: Vec<(DateTime<Utc>, f64)>,
    ) -> Result<Self, CoreError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "symbol".to_string(),
                "must not be empty".to_string(),
            ));
        }

        for (i, &(ts, price)) in points.iter().enumerate() {
            if !price.is_finite() || price <= 0.0 {
                return Err(CoreError::InvalidInput(
                    symbol,
                    format!("price at {ts} must be positive, got {price}"),
                ));
            }
            if i > 0 && points[i - 1].0 >= ts {
                return Err(CoreError::InvalidInput(
                    symbol,
                    format!("timestamps must be strictly increasing, {ts} follows {}", points[i - 1].0),
                ));
            }
        }

        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[(DateTime<Utc>, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Simple returns of one symbol at one frequency.
///
/// Each entry is stamped with the start of the period whose closing price it
/// ends on. The undefined return of the very first period is never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    symbol: String,
    frequency: Frequency,
    points: Vec<(DateTime<Utc>, f64)>,
}

impl ReturnSeries {
    pub fn new(
        symbol: impl Into<String>,
        frequency: Frequency,
        points: Vec<(DateTime<Utc>, f64)>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            frequency,
            points,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn points(&self) -> &[(DateTime<Utc>, f64)] {
        &self.points
    }

    /// The return values without their timestamps, in order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|&(_, r)| r).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
