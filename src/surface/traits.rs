//! Site-agnostic traits for reading and driving rendered trading pages.
//!
//! Provides a common interface over the per-site scraping adapters so the
//! hedge controller never touches page markup directly:
//! - `PositionReader` for pure reads
//! - `OrderActuator` for fire-and-forget order-form writes
//! - `SurfaceLocator` for resolving the open page pair

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::types::{Direction, PositionReading, Site, SurfaceError};

/// A handle onto one rendered trading page.
///
/// Scrapes return raw cell text for the per-site parsers to interpret.
/// `Ok(false)` / empty results mean the element is not on the page right now
/// (recoverable); `Err` means the surface itself cannot be reached (fatal for
/// the tick that observes it).
#[async_trait]
pub trait SurfaceHandle: Send + Sync {
    fn site(&self) -> Site;

    /// Cell texts for every row matching `marker`. Empty when none rendered.
    async fn scrape_rows(&self, marker: &str) -> Result<Vec<Vec<String>>, SurfaceError>;

    /// Text of the first element matching `marker`, or None.
    async fn scrape_text(&self, marker: &str) -> Result<Option<String>, SurfaceError>;

    /// Set an input's value. Returns false when the control is missing.
    async fn set_input(&self, marker: &str, value: &str) -> Result<bool, SurfaceError>;

    /// Click a control. Returns false when the control is missing.
    async fn click(&self, marker: &str) -> Result<bool, SurfaceError>;
}

/// Reads positions from one site's rendered page. Pure read, no mutation.
#[async_trait]
pub trait PositionReader: Send + Sync {
    fn site(&self) -> Site;

    /// The current position for `symbol`, or None when the page shows none.
    ///
    /// "Not found" is never an error; only an unreachable surface is.
    async fn read(&self, symbol: &str) -> Result<Option<PositionReading>, SurfaceError>;

    /// Portfolio value rendered on the page, when the page shows one.
    async fn portfolio_value(&self) -> Result<Option<Decimal>, SurfaceError>;
}

/// Drives order-entry controls on one site's rendered page.
///
/// Each operation is fire-and-forget: the page applies writes asynchronously
/// to its own rendering and offers no acknowledgment, so success here means
/// "the control was driven", not "the order happened". A missing control is
/// logged and swallowed; only an unreachable surface is an error.
#[async_trait]
pub trait OrderActuator: Send + Sync {
    fn site(&self) -> Site;

    async fn set_quantity(&self, quantity: &str) -> Result<(), SurfaceError>;

    async fn select_direction(&self, direction: Direction) -> Result<(), SurfaceError>;

    async fn submit(&self) -> Result<(), SurfaceError>;
}

/// The pair of surfaces one hedge session works against.
///
/// Positions are read from both sites; offsetting orders go to Variational.
#[derive(Clone)]
pub struct SurfacePair {
    pub lighter: Arc<dyn PositionReader>,
    pub variational: Arc<dyn PositionReader>,
    pub actuator: Arc<dyn OrderActuator>,
}

/// Resolves the two rendered surfaces for a symbol.
///
/// Returns `Ok(None)` when either page is not currently open; the hedge
/// controller treats that as fatal for the session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SurfaceLocator: Send + Sync {
    async fn locate(&self, symbol: &str) -> Result<Option<SurfacePair>, SurfaceError>;
}
