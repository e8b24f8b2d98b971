//! Indicator library: pure functions over ordered price/volume slices.
//!
//! Every function fails with [`IndicatorError::InsufficientData`] when the
//! history is shorter than its lookback; none of them substitutes a neutral
//! default.

pub mod error;

pub mod momentum;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use error::IndicatorError;
