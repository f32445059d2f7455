use crate::error::CoreError;
use chrono::{DateTime, Datelike, DurationRound, Months, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The sampling frequencies at which return series can be evaluated.
///
/// The derived ordering (`Daily < Monthly < Intraday`) is the order in which
/// frequencies are listed in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[serde(alias = "1d", alias = "d", alias = "Daily")]
    Daily,
    #[serde(alias = "m", alias = "1mo", alias = "Monthly")]
    Monthly,
    #[serde(alias = "minute", alias = "t", alias = "1m", alias = "Intraday")]
    Intraday,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Daily, Frequency::Monthly, Frequency::Intraday];

    /// Returns how raw observations are bucketed into periods at this frequency.
    pub fn resample_rule(&self) -> ResampleRule {
        match self {
            Frequency::Daily => ResampleRule::Fixed(TimeDelta::days(1)),
            Frequency::Monthly => ResampleRule::CalendarMonth,
            Frequency::Intraday => ResampleRule::Fixed(TimeDelta::minutes(1)),
        }
    }

    /// Periods per year used to annualize volatility.
    ///
    /// Intraday assumes 390 trading minutes per session and 252 sessions per year.
    pub fn default_annualization_factor(&self) -> f64 {
        match self {
            Frequency::Daily => 252.0,
            Frequency::Monthly => 12.0,
            Frequency::Intraday => 252.0 * 390.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Monthly => "Monthly",
            Frequency::Intraday => "Intraday",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    /// Accepts the frequency names as well as the short codes used by
    /// common dataframe libraries ("1d", "M", "T").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "1d" | "d" => Ok(Frequency::Daily),
            "monthly" | "m" | "1mo" => Ok(Frequency::Monthly),
            "intraday" | "minute" | "t" | "1m" => Ok(Frequency::Intraday),
            other => Err(CoreError::InvalidInput(
                "frequency".to_string(),
                format!("unknown frequency '{other}'"),
            )),
        }
    }
}

/// Describes the period boundaries of a frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleRule {
    /// Fixed-width periods aligned to the Unix epoch (UTC).
    Fixed(TimeDelta),
    /// Calendar months of the timestamps as stored.
    CalendarMonth,
}

impl ResampleRule {
    /// Returns the start instant of the period containing `ts`.
    pub fn period_start(&self, ts: DateTime<Utc>) -> Result<DateTime<Utc>, CoreError> {
        match self {
            ResampleRule::Fixed(width) => ts
                .duration_trunc(*width)
                .map_err(|e| CoreError::Calculation(format!("cannot truncate {ts}: {e}"))),
            ResampleRule::CalendarMonth => Utc
                .with_ymd_and_hms(ts.year(), ts.month(), 1, 0, 0, 0)
                .single()
                .ok_or_else(|| CoreError::Calculation(format!("no month start for {ts}"))),
        }
    }

    /// Returns the start instant of the period following the one starting at `start`.
    pub fn next_period_start(&self, start: DateTime<Utc>) -> Result<DateTime<Utc>, CoreError> {
        let next = match self {
            ResampleRule::Fixed(width) => start.checked_add_signed(*width),
            ResampleRule::CalendarMonth => start.checked_add_months(Months::new(1)),
        };
        next.ok_or_else(|| CoreError::Calculation(format!("period after {start} is out of range")))
    }
}
