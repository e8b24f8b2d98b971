//! Scanner configuration
//!
//! Everything the engine, ranking and runtime read is collected in one
//! immutable [`ScannerConfig`], built once at startup from defaults, an
//! optional JSON file (`SCANNER_CONFIG`) and environment overrides.

use crate::core::scheduler::interval_is_exact;
use crate::models::indicators::Timeframe;
use crate::models::signal::Strategy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Get the current environment (production, sandbox, ...)
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// Lookback periods for every indicator in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub ema_fast: u32,
    pub ema_slow: u32,
    pub sma_mid: u32,
    pub sma_slow: u32,
    pub rsi_period: u32,
    pub macd_fast: u32,
    pub macd_slow: u32,
    pub macd_signal: u32,
    pub bollinger_period: u32,
    pub bollinger_std_dev: f64,
    pub atr_period: u32,
    pub atr_zscore_period: u32,
    pub volume_avg_period: u32,
    /// Bars required before any indicator is attempted.
    pub min_bars: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_slow: 21,
            sma_mid: 20,
            sma_slow: 50,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            atr_period: 14,
            atr_zscore_period: 20,
            volume_avg_period: 20,
            min_bars: 50,
        }
    }
}

/// How abstaining timeframes are treated by the confirmation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationMode {
    /// Any abstain vetoes the symbol.
    #[default]
    Strict,
    /// Abstains are ignored; the remaining votes must still agree.
    Lenient,
}

/// Gates applied to the dominant snapshot after confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreTradeFilters {
    pub min_volume: Option<f64>,
    /// Minimum ATR / close.
    pub min_atr_pct: Option<f64>,
    /// RSI must lie strictly inside this range.
    pub rsi_zone: Option<(f64, f64)>,
}

impl Default for PreTradeFilters {
    fn default() -> Self {
        Self {
            min_volume: None,
            min_atr_pct: Some(0.001),
            rsi_zone: Some((20.0, 80.0)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPolicy {
    LastClose,
    /// Nearest of SMA(mid), EMA(fast), EMA(slow) to the last close.
    #[default]
    ClosestLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum StopPolicy {
    /// `entry * (1 -/+ stop_loss_pct)`
    #[default]
    Fixed,
    /// Distance `max(atr * multiplier, entry * min_distance_pct)`
    Atr {
        multiplier: f64,
        min_distance_pct: f64,
    },
}

impl StopPolicy {
    pub fn atr_default() -> Self {
        StopPolicy::Atr {
            multiplier: 1.5,
            min_distance_pct: 0.002,
        }
    }
}

/// Account and instrument parameters read by the sizing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParameters {
    pub account_balance: f64,
    pub risk_fraction: f64,
    pub leverage: f64,
    pub take_profit_pct: f64,
    pub stop_loss_pct: f64,
    pub entry_buffer_pct: f64,
    pub contract_size: f64,
    pub margin_utilization_cap: f64,
    pub min_position_size: f64,
    pub max_position_size: Option<f64>,
    /// Sizes are floored to a multiple of this step when set.
    pub size_step: Option<f64>,
    pub entry_policy: EntryPolicy,
    pub stop_policy: StopPolicy,
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            account_balance: 100.0,
            risk_fraction: 0.015,
            leverage: 20.0,
            take_profit_pct: 0.015,
            stop_loss_pct: 0.015,
            entry_buffer_pct: 0.002,
            contract_size: 1.0,
            margin_utilization_cap: 0.9,
            min_position_size: 0.0,
            max_position_size: None,
            size_step: None,
            entry_policy: EntryPolicy::default(),
            stop_policy: StopPolicy::default(),
        }
    }
}

/// Points awarded per scoring category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub trend_all: f64,
    pub trend_majority: f64,
    pub rsi_band: f64,
    pub rsi_extreme_penalty: f64,
    pub macd_alignment: f64,
    pub bollinger_breakout: f64,
    pub bollinger_inside: f64,
    pub volume_spike: f64,
    pub atr_spike: f64,
    pub order_book: f64,
    pub rr_high: f64,
    pub rr_mid: f64,
    pub confidence_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            trend_all: 20.0,
            trend_majority: 10.0,
            rsi_band: 10.0,
            rsi_extreme_penalty: 10.0,
            macd_alignment: 10.0,
            bollinger_breakout: 5.0,
            bollinger_inside: 0.0,
            volume_spike: 10.0,
            atr_spike: 10.0,
            order_book: 10.0,
            rr_high: 10.0,
            rr_mid: 5.0,
            confidence_weight: 0.3,
        }
    }
}

/// Base confidence (0-100) attached to each strategy family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfidence {
    pub trend_following: f64,
    pub mean_reversion: f64,
    pub scalp_breakout: f64,
}

impl StrategyConfidence {
    pub fn for_strategy(&self, strategy: Strategy) -> f64 {
        match strategy {
            Strategy::TrendFollowing => self.trend_following,
            Strategy::MeanReversion => self.mean_reversion,
            Strategy::ScalpBreakout => self.scalp_breakout,
        }
    }
}

impl Default for StrategyConfidence {
    fn default() -> Self {
        Self {
            trend_following: 90.0,
            mean_reversion: 85.0,
            scalp_breakout: 80.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub indicators: IndicatorSettings,
    pub timeframes: Vec<Timeframe>,
    /// Feeds regime, filters, sizing and scoring.
    pub dominant_timeframe: Timeframe,
    pub confirmation: ConfirmationMode,
    pub filters: PreTradeFilters,
    pub risk: RiskParameters,
    pub weights: ScoringWeights,
    pub confidence: StrategyConfidence,
    pub require_volume_spike_for_scalp: bool,
    pub volume_spike_multiplier: f64,
    pub atr_spike_zscore: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            indicators: IndicatorSettings::default(),
            timeframes: vec![Timeframe::M15, Timeframe::H1, Timeframe::H4],
            dominant_timeframe: Timeframe::H1,
            confirmation: ConfirmationMode::default(),
            filters: PreTradeFilters::default(),
            risk: RiskParameters::default(),
            weights: ScoringWeights::default(),
            confidence: StrategyConfidence::default(),
            require_volume_spike_for_scalp: true,
            volume_spike_multiplier: 1.5,
            atr_spike_zscore: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupKey {
    #[default]
    Symbol,
    SymbolStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub top_n: usize,
    pub dedup: DedupKey,
    pub min_score: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            dedup: DedupKey::default(),
            min_score: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub interval_seconds: u64,
    pub concurrency: usize,
    /// Candles requested per timeframe.
    pub lookback: usize,
    pub max_symbols: usize,
    pub symbol_timeout_seconds: u64,
    /// Fixed universe; empty means ask the exchange.
    pub symbols: Vec<String>,
    pub use_order_book: bool,
    pub bybit_base_url: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
            concurrency: 8,
            lookback: 200,
            max_symbols: 100,
            symbol_timeout_seconds: 30,
            symbols: Vec::new(),
            use_order_book: true,
            bybit_base_url: "https://api.bybit.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub engine: EngineConfig,
    pub ranking: RankingConfig,
    pub runtime: RuntimeConfig,
}

impl ScannerConfig {
    /// Load configuration: `.env`, then the optional `SCANNER_CONFIG` JSON
    /// file, then individual environment variable overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = match env::var("SCANNER_CONFIG") {
            Ok(path) => Self::from_file(PathBuf::from(path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: PathBuf) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Override fields from a key lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let risk = &mut self.engine.risk;
        set_parsed(&lookup, "RISK_FRACTION", &mut risk.risk_fraction)?;
        set_parsed(&lookup, "ACCOUNT_BALANCE", &mut risk.account_balance)?;
        set_parsed(&lookup, "LEVERAGE", &mut risk.leverage)?;
        set_parsed(&lookup, "TP_PCT", &mut risk.take_profit_pct)?;
        set_parsed(&lookup, "SL_PCT", &mut risk.stop_loss_pct)?;
        set_parsed(&lookup, "ENTRY_BUFFER_PCT", &mut risk.entry_buffer_pct)?;
        set_parsed(&lookup, "CONTRACT_SIZE", &mut risk.contract_size)?;

        if let Some(raw) = lookup("TIMEFRAMES") {
            self.engine.timeframes = raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| parse_value("TIMEFRAMES", s.trim()))
                .collect::<Result<_, _>>()?;
        }
        set_parsed(&lookup, "DOMINANT_TIMEFRAME", &mut self.engine.dominant_timeframe)?;
        if let Some(raw) = lookup("CONFIRMATION_MODE") {
            self.engine.confirmation = match raw.trim().to_ascii_lowercase().as_str() {
                "strict" => ConfirmationMode::Strict,
                "lenient" => ConfirmationMode::Lenient,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "CONFIRMATION_MODE".to_string(),
                        value: raw,
                    })
                }
            };
        }

        set_parsed(&lookup, "TOP_N", &mut self.ranking.top_n)?;
        set_parsed(&lookup, "MIN_SCORE", &mut self.ranking.min_score)?;

        let runtime = &mut self.runtime;
        set_parsed(&lookup, "SCAN_INTERVAL_SECONDS", &mut runtime.interval_seconds)?;
        set_parsed(&lookup, "WORKER_CONCURRENCY", &mut runtime.concurrency)?;
        set_parsed(&lookup, "LOOKBACK", &mut runtime.lookback)?;
        set_parsed(&lookup, "MAX_SYMBOLS", &mut runtime.max_symbols)?;
        set_parsed(&lookup, "SYMBOL_TIMEOUT_SECONDS", &mut runtime.symbol_timeout_seconds)?;
        set_parsed(&lookup, "USE_ORDER_BOOK", &mut runtime.use_order_book)?;
        if let Some(raw) = lookup("SYMBOLS") {
            runtime.symbols = raw
                .split(',')
                .map(|s| s.trim().to_ascii_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(url) = lookup("BYBIT_BASE_URL") {
            runtime.bybit_base_url = url;
        }

        Ok(())
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let engine = &self.engine;
        let risk = &engine.risk;

        if engine.timeframes.is_empty() {
            return Err(ConfigError::Invalid("at least one timeframe is required".into()));
        }
        if !engine.timeframes.contains(&engine.dominant_timeframe) {
            return Err(ConfigError::Invalid(format!(
                "dominant timeframe {} is not in the configured timeframes",
                engine.dominant_timeframe
            )));
        }
        if !(risk.leverage > 0.0) {
            return Err(ConfigError::Invalid("leverage must be positive".into()));
        }
        if !(risk.risk_fraction > 0.0 && risk.risk_fraction <= 1.0) {
            return Err(ConfigError::Invalid("risk fraction must be in (0, 1]".into()));
        }
        if !(risk.account_balance > 0.0) {
            return Err(ConfigError::Invalid("account balance must be positive".into()));
        }
        if !(risk.take_profit_pct > 0.0) || !(risk.stop_loss_pct > 0.0) {
            return Err(ConfigError::Invalid(
                "take-profit and stop-loss percentages must be positive".into(),
            ));
        }
        if matches!(risk.stop_policy, StopPolicy::Fixed)
            && risk.stop_loss_pct >= 1.0 / risk.leverage
        {
            return Err(ConfigError::Invalid(format!(
                "stop loss {} is at or beyond liquidation at {}x leverage",
                risk.stop_loss_pct, risk.leverage
            )));
        }
        if !(risk.contract_size > 0.0) {
            return Err(ConfigError::Invalid("contract size must be positive".into()));
        }
        let interval = self.runtime.interval_seconds;
        if interval > 0 && !interval_is_exact(interval) {
            return Err(ConfigError::Invalid(format!(
                "scan interval {}s must divide evenly into a minute, an hour or a day",
                interval
            )));
        }
        if self.runtime.concurrency == 0 {
            return Err(ConfigError::Invalid("worker concurrency must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

fn set_parsed<T, F>(lookup: &F, key: &str, target: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *target = parse_value(key, &raw)?;
    }
    Ok(())
}
