//! In-memory trading surface for tests and the simulation harness.
//!
//! `MockSurface` plays the role of a rendered page: rows and texts are keyed
//! by the same markers the real adapters scrape, and every order-form write
//! is recorded so callers can assert on (or, in simulation, react to) what
//! the actuators did.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::lighter::LighterReader;
use super::traits::{SurfaceHandle, SurfaceLocator, SurfacePair};
use super::types::{Site, SurfaceError};
use super::variational::{VariationalActuator, VariationalReader};

/// One recorded order-form write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceAction {
    Input { marker: String, value: String },
    Click { marker: String },
}

#[derive(Default)]
struct MockSurfaceState {
    rows: HashMap<String, Vec<Vec<String>>>,
    texts: HashMap<String, String>,
    actions: Vec<SurfaceAction>,
    missing_controls: HashSet<String>,
    unreachable: bool,
}

/// A fake rendered page with settable content and recorded actions.
pub struct MockSurface {
    site: Site,
    state: RwLock<MockSurfaceState>,
}

impl MockSurface {
    pub fn new(site: Site) -> Self {
        Self {
            site,
            state: RwLock::new(MockSurfaceState::default()),
        }
    }

    /// Replace the rows rendered under `marker`.
    pub async fn set_rows(&self, marker: &str, rows: Vec<Vec<String>>) {
        let mut state = self.state.write().await;
        state.rows.insert(marker.to_string(), rows);
    }

    /// Replace the text rendered under `marker`.
    pub async fn set_text(&self, marker: &str, text: &str) {
        let mut state = self.state.write().await;
        state.texts.insert(marker.to_string(), text.to_string());
    }

    /// Toggle whether the page can be reached at all.
    pub async fn set_reachable(&self, reachable: bool) {
        self.state.write().await.unreachable = !reachable;
    }

    /// Make a control disappear from the page.
    pub async fn remove_control(&self, marker: &str) {
        let mut state = self.state.write().await;
        state.missing_controls.insert(marker.to_string());
    }

    /// Drain and return every action recorded so far, oldest first.
    pub async fn take_actions(&self) -> Vec<SurfaceAction> {
        std::mem::take(&mut self.state.write().await.actions)
    }

    fn unreachable_error(&self) -> SurfaceError {
        SurfaceError::Unreachable {
            site: self.site,
            reason: "page not rendered".to_string(),
        }
    }
}

#[async_trait]
impl SurfaceHandle for MockSurface {
    fn site(&self) -> Site {
        self.site
    }

    async fn scrape_rows(&self, marker: &str) -> Result<Vec<Vec<String>>, SurfaceError> {
        let state = self.state.read().await;
        if state.unreachable {
            return Err(self.unreachable_error());
        }
        Ok(state.rows.get(marker).cloned().unwrap_or_default())
    }

    async fn scrape_text(&self, marker: &str) -> Result<Option<String>, SurfaceError> {
        let state = self.state.read().await;
        if state.unreachable {
            return Err(self.unreachable_error());
        }
        Ok(state.texts.get(marker).cloned())
    }

    async fn set_input(&self, marker: &str, value: &str) -> Result<bool, SurfaceError> {
        let mut state = self.state.write().await;
        if state.unreachable {
            return Err(self.unreachable_error());
        }
        if state.missing_controls.contains(marker) {
            return Ok(false);
        }
        state.actions.push(SurfaceAction::Input {
            marker: marker.to_string(),
            value: value.to_string(),
        });
        Ok(true)
    }

    async fn click(&self, marker: &str) -> Result<bool, SurfaceError> {
        let mut state = self.state.write().await;
        if state.unreachable {
            return Err(self.unreachable_error());
        }
        if state.missing_controls.contains(marker) {
            return Ok(false);
        }
        state.actions.push(SurfaceAction::Click {
            marker: marker.to_string(),
        });
        Ok(true)
    }
}

/// Locator over a fixed pair of mock surfaces.
///
/// `set_present(false)` simulates the pages being closed, which the hedge
/// controller treats as fatal.
pub struct StaticSurfaceLocator {
    pair: SurfacePair,
    present: AtomicBool,
}

impl StaticSurfaceLocator {
    pub fn new(lighter: Arc<MockSurface>, variational: Arc<MockSurface>) -> Self {
        let pair = SurfacePair {
            lighter: Arc::new(LighterReader::new(lighter)),
            variational: Arc::new(VariationalReader::new(variational.clone())),
            actuator: Arc::new(VariationalActuator::new(variational)),
        };
        Self {
            pair,
            present: AtomicBool::new(true),
        }
    }

    pub fn set_present(&self, present: bool) {
        self.present.store(present, Ordering::SeqCst);
    }
}

#[async_trait]
impl SurfaceLocator for StaticSurfaceLocator {
    async fn locate(&self, _symbol: &str) -> Result<Option<SurfacePair>, SurfaceError> {
        if self.present.load(Ordering::SeqCst) {
            Ok(Some(self.pair.clone()))
        } else {
            Ok(None)
        }
    }
}

fn fmt_currency(value: Decimal) -> String {
    if value.is_sign_negative() {
        format!("-${}", value.abs())
    } else {
        format!("${}", value)
    }
}

/// Build a Lighter-shaped position row: direction and coin in the first
/// cell, unsigned size in the second, PnL in the seventh, funding in the
/// ninth.
pub fn lighter_position_row(
    symbol: &str,
    signed_size: Decimal,
    pnl: Decimal,
    funding: Decimal,
) -> Vec<String> {
    let direction = if signed_size.is_sign_negative() {
        "short"
    } else {
        "long"
    };
    vec![
        format!("{direction} {symbol}"),
        signed_size.abs().to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        fmt_currency(pnl),
        String::new(),
        fmt_currency(funding),
    ]
}

/// Build a Variational position row in the current (svelte) layout: the
/// perp contract name in the first cell, signed size in the second, funding
/// in the seventh, PnL in the eighth.
pub fn variational_position_row(
    symbol: &str,
    signed_size: Decimal,
    pnl: Decimal,
    funding: Decimal,
) -> Vec<String> {
    vec![
        format!("{symbol}-PERP"),
        signed_size.to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        fmt_currency(funding),
        fmt_currency(pnl),
        String::new(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_builders_match_adapter_shapes() {
        let row = lighter_position_row("BTC", dec!(-2.0), dec!(-4.03), dec!(1.20));
        assert_eq!(row[0], "short BTC");
        assert_eq!(row[1], "2.0");
        assert_eq!(row[6], "-$4.03");
        assert_eq!(row[8], "$1.20");

        let row = variational_position_row("BTC", dec!(-2.0), dec!(-4.03), dec!(0.55));
        assert_eq!(row[0], "BTC-PERP");
        assert_eq!(row[1], "-2.0");
        assert_eq!(row[6], "$0.55");
        assert_eq!(row[7], "-$4.03");
    }

    #[tokio::test]
    async fn test_actions_are_recorded_and_drained() {
        let surface = MockSurface::new(Site::Variational);
        assert!(surface.set_input("qty", "1.5").await.unwrap());
        assert!(surface.click("submit").await.unwrap());

        let actions = surface.take_actions().await;
        assert_eq!(actions.len(), 2);
        assert!(surface.take_actions().await.is_empty());
    }

    #[tokio::test]
    async fn test_locator_present_toggle() {
        let lighter = Arc::new(MockSurface::new(Site::Lighter));
        let variational = Arc::new(MockSurface::new(Site::Variational));
        let locator = StaticSurfaceLocator::new(lighter, variational);

        assert!(locator.locate("BTC").await.unwrap().is_some());
        locator.set_present(false);
        assert!(locator.locate("BTC").await.unwrap().is_none());
    }
}
