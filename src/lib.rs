//! perpscan: multi-timeframe signal engine for perpetual futures.

pub mod common;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod models;
pub mod reporting;
pub mod services;
pub mod signals;
