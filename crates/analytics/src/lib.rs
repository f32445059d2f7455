//! # Riskboard Analytics Engine
//!
//! This crate turns price histories into return series and return series into
//! risk and performance metrics measured against a benchmark.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `MetricsEngine` is a stateless calculator. It takes
//!   two aligned return series as input and produces a `MetricsResult` as output.
//!
//! ## Public API
//!
//! - `resample`: builds a forward-filled `ReturnSeries` at a given frequency.
//! - `MetricsEngine`: the struct that contains the metric formulas.
//! - `MetricsResult`: the immutable record of one symbol's metrics at one frequency.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;
pub mod resampler;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use engine::MetricsEngine;
pub use error::AnalyticsError;
pub use report::{Metric, MetricsResult};
pub use resampler::{resample, resample_prices};
