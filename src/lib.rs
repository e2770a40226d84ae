//! # Cross-Venue Hedger
//!
//! Automates delta hedging across two perpetuals venues (Lighter and
//! Variational) by reading open positions from their rendered trading pages
//! and driving the Variational order form to neutralize net exposure.
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `hedge`: The auto-hedge control loop (controller, session, exposure, status)
//! - `surface`: Rendered-page adapters (position readers, order actuators, locator)
//! - `persistence`: SQLite-based storage for last-used hedge settings
//! - `utils`: Shared utilities for parsing scraped page text

pub mod config;
pub mod hedge;
pub mod persistence;
pub mod surface;
pub mod utils;

pub use config::Config;
