//! Configuration, layered from `config.toml` and `HEDGER_*` environment
//! variables (with `.env` support).

use anyhow::{ensure, Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::time::Duration;

use crate::hedge::HedgeParams;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub hedge: HedgeConfig,
    #[serde(default)]
    pub sim: SimConfig,
}

/// Hedge-session parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct HedgeConfig {
    /// Coin symbol to monitor ("BTC", not "BTC-PERP").
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Net exposure at or above which an offsetting order is placed.
    #[serde(default = "default_exposure_threshold")]
    pub exposure_threshold: Decimal,
    /// How long to wait for a submitted hedge to fill before giving up on it.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    /// Pause between order-form writes, letting the page re-render.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

/// Simulated-market parameters (the binary runs against mock surfaces).
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    /// Starting long on the Lighter side.
    #[serde(default = "default_start_lighter_size")]
    pub start_lighter_size: Decimal,
    /// Size added to the Lighter position on every drift.
    #[serde(default = "default_drift_step")]
    pub drift_step: Decimal,
    #[serde(default = "default_drift_every_secs")]
    pub drift_every_secs: u64,
    /// Delay between a submitted order and its simulated fill.
    #[serde(default = "default_fill_delay_ms")]
    pub fill_delay_ms: u64,
    /// How often the simulated pages re-render.
    #[serde(default = "default_update_ms")]
    pub update_ms: u64,
}

fn default_symbol() -> String {
    "BTC".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_exposure_threshold() -> Decimal {
    dec!(0.01)
}

fn default_lock_timeout_ms() -> u64 {
    10_000
}

fn default_settle_delay_ms() -> u64 {
    200
}

fn default_start_lighter_size() -> Decimal {
    dec!(2.0)
}

fn default_drift_step() -> Decimal {
    dec!(0.5)
}

fn default_drift_every_secs() -> u64 {
    30
}

fn default_fill_delay_ms() -> u64 {
    1_500
}

fn default_update_ms() -> u64 {
    250
}

impl Default for HedgeConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            poll_interval_ms: default_poll_interval_ms(),
            exposure_threshold: default_exposure_threshold(),
            lock_timeout_ms: default_lock_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_lighter_size: default_start_lighter_size(),
            drift_step: default_drift_step(),
            drift_every_secs: default_drift_every_secs(),
            fill_delay_ms: default_fill_delay_ms(),
            update_ms: default_update_ms(),
        }
    }
}

impl Config {
    /// Load from `config.toml` (optional) and `HEDGER_*` environment
    /// variables, e.g. `HEDGER_HEDGE__SYMBOL=ETH`.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::default().separator("__").prefix("HEDGER"))
            .build()
            .context("failed to build configuration")?;

        let config: Config = config
            .try_deserialize()
            .context("failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.hedge.symbol.trim().is_empty(),
            "hedge.symbol must not be empty"
        );
        ensure!(
            self.hedge.poll_interval_ms > 0,
            "hedge.poll_interval_ms must be positive"
        );
        ensure!(
            self.hedge.lock_timeout_ms > 0,
            "hedge.lock_timeout_ms must be positive"
        );
        ensure!(
            self.hedge.exposure_threshold >= Decimal::ZERO,
            "hedge.exposure_threshold must not be negative"
        );
        ensure!(self.sim.update_ms > 0, "sim.update_ms must be positive");
        Ok(())
    }
}

impl HedgeConfig {
    pub fn params(&self) -> HedgeParams {
        HedgeParams {
            symbol: self.symbol.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            exposure_threshold: self.exposure_threshold,
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config {
            hedge: HedgeConfig::default(),
            sim: SimConfig::default(),
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.hedge.symbol, "BTC");
        assert_eq!(config.hedge.exposure_threshold, dec!(0.01));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config {
            hedge: HedgeConfig::default(),
            sim: SimConfig::default(),
        };
        config.hedge.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_params_conversion() {
        let hedge = HedgeConfig::default();
        let params = hedge.params();
        assert_eq!(params.symbol, "BTC");
        assert_eq!(params.poll_interval, Duration::from_secs(1));
        assert_eq!(params.lock_timeout, Duration::from_secs(10));
    }
}
