//! Variational page adapter (omni.variational.io/perpetual/<coin>).
//!
//! The site has shipped three position-list layouts; the reader probes for
//! each layout's marker and parses the first one that yields rows, instead
//! of branching on any version signal the page does not expose.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

use super::traits::{OrderActuator, PositionReader, SurfaceHandle};
use super::types::{Direction, PositionReading, Site, SurfaceError};
use crate::utils::scrape::{parse_currency, parse_signed_size};

/// Page markers the adapter drives and scrapes. Public so the simulation
/// harness can interpret recorded actions.
pub mod markers {
    pub const SVELTE_ROWS: &str = r#"div[data-testid="positions-table-row"]"#;
    pub const TABLE_ROWS: &str = r#"tbody tr[data-testid^="row-"]"#;
    pub const DIV_ROWS: &str = r#"div[data-index]"#;
    pub const QUANTITY_INPUT: &str = r#"[data-testid="quantity-input"]"#;
    pub const SUBMIT_BUTTON: &str = r#"[data-testid="submit-button"]"#;
    pub const BUY_SWITCH: &str = r#"[role="switch"] button:buy"#;
    pub const SELL_SWITCH: &str = r#"[role="switch"] button:sell"#;
    pub const PORTFOLIO_VALUE: &str = r#"[data-testid="portfolio-summary"]"#;
}

/// Minimum cells a position row must carry before we trust its shape.
const MIN_ROW_CELLS: usize = 9;

/// The layout variants the positions list has rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// Current site: one div per row, signed size, funding before PnL.
    Svelte,
    /// Older site, wide viewport: classic table, Lighter-shaped columns.
    Table,
    /// Older site, narrow viewport: indexed divs, svelte-shaped columns.
    Div,
}

impl Layout {
    fn marker(&self) -> &'static str {
        match self {
            Layout::Svelte => markers::SVELTE_ROWS,
            Layout::Table => markers::TABLE_ROWS,
            Layout::Div => markers::DIV_ROWS,
        }
    }

    /// Column indices: (size, funding, pnl).
    fn columns(&self) -> (usize, usize, usize) {
        match self {
            Layout::Svelte | Layout::Div => (1, 6, 7),
            Layout::Table => (1, 8, 6),
        }
    }
}

/// Reads positions and portfolio value from a Variational page.
pub struct VariationalReader {
    surface: Arc<dyn SurfaceHandle>,
}

impl VariationalReader {
    pub fn new(surface: Arc<dyn SurfaceHandle>) -> Self {
        Self { surface }
    }

    /// Probe layout markers in order of likelihood; first hit wins.
    async fn probe_rows(&self) -> Result<Option<(Layout, Vec<Vec<String>>)>, SurfaceError> {
        for layout in [Layout::Svelte, Layout::Table, Layout::Div] {
            let rows = self.surface.scrape_rows(layout.marker()).await?;
            if !rows.is_empty() {
                debug!(?layout, rows = rows.len(), "Variational layout detected");
                return Ok(Some((layout, rows)));
            }
        }
        Ok(None)
    }

    fn parse_row(layout: Layout, index: usize, cells: &[String]) -> Option<PositionReading> {
        if cells.len() < MIN_ROW_CELLS {
            warn!(
                row = index,
                ?layout,
                cells = cells.len(),
                "unexpected Variational row shape"
            );
            return None;
        }

        // The coin cell renders the perp contract name ("BTC-PERP").
        let symbol = cells[0]
            .trim()
            .strip_suffix("-PERP")
            .unwrap_or(cells[0].trim())
            .to_string();
        if symbol.is_empty() {
            warn!(row = index, ?layout, "missing coin name");
            return None;
        }

        let (size_col, funding_col, pnl_col) = layout.columns();
        let signed_size = parse_signed_size(&cells[size_col])?;
        let funding = parse_currency(&cells[funding_col]).unwrap_or(Decimal::ZERO);
        let unrealized_pnl = parse_currency(&cells[pnl_col]).unwrap_or(Decimal::ZERO);

        Some(PositionReading {
            symbol,
            signed_size,
            unrealized_pnl,
            funding,
        })
    }
}

#[async_trait]
impl PositionReader for VariationalReader {
    fn site(&self) -> Site {
        Site::Variational
    }

    async fn read(&self, symbol: &str) -> Result<Option<PositionReading>, SurfaceError> {
        let Some((layout, rows)) = self.probe_rows().await? else {
            debug!("no Variational position rows rendered");
            return Ok(None);
        };

        let reading = rows
            .iter()
            .enumerate()
            .filter_map(|(i, cells)| Self::parse_row(layout, i, cells))
            .find(|r| r.symbol.eq_ignore_ascii_case(symbol));

        Ok(reading)
    }

    async fn portfolio_value(&self) -> Result<Option<Decimal>, SurfaceError> {
        let text = self.surface.scrape_text(markers::PORTFOLIO_VALUE).await?;
        Ok(text.as_deref().and_then(parse_currency))
    }
}

/// Drives the Variational order form (quantity input, buy/sell switch,
/// submit button). This is the actuator the hedge controller uses.
pub struct VariationalActuator {
    surface: Arc<dyn SurfaceHandle>,
}

impl VariationalActuator {
    pub fn new(surface: Arc<dyn SurfaceHandle>) -> Self {
        Self { surface }
    }
}

#[async_trait]
impl OrderActuator for VariationalActuator {
    fn site(&self) -> Site {
        Site::Variational
    }

    async fn set_quantity(&self, quantity: &str) -> Result<(), SurfaceError> {
        if self
            .surface
            .set_input(markers::QUANTITY_INPUT, quantity)
            .await?
        {
            debug!(%quantity, "Variational quantity input set");
        } else {
            warn!("Variational quantity input not found");
        }
        Ok(())
    }

    async fn select_direction(&self, direction: Direction) -> Result<(), SurfaceError> {
        let marker = match direction {
            Direction::Buy => markers::BUY_SWITCH,
            Direction::Sell => markers::SELL_SWITCH,
        };
        if self.surface.click(marker).await? {
            debug!(%direction, "Variational direction switch clicked");
        } else {
            warn!(%direction, "Variational direction switch not found");
        }
        Ok(())
    }

    async fn submit(&self) -> Result<(), SurfaceError> {
        if self.surface.click(markers::SUBMIT_BUTTON).await? {
            debug!("Variational submit button clicked");
        } else {
            warn!("Variational submit button not found");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::mock::{variational_position_row, MockSurface, SurfaceAction};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_read_svelte_layout() {
        let surface = Arc::new(MockSurface::new(Site::Variational));
        surface
            .set_rows(
                markers::SVELTE_ROWS,
                vec![variational_position_row(
                    "BTC",
                    dec!(-2.0),
                    dec!(-4.03),
                    dec!(0.55),
                )],
            )
            .await;
        let reader = VariationalReader::new(surface);

        let reading = reader.read("BTC").await.unwrap().unwrap();
        assert_eq!(reading.symbol, "BTC");
        assert_eq!(reading.signed_size, dec!(-2.0));
        assert_eq!(reading.unrealized_pnl, dec!(-4.03));
        assert_eq!(reading.funding, dec!(0.55));
    }

    #[tokio::test]
    async fn test_probe_falls_back_to_table_layout() {
        let surface = Arc::new(MockSurface::new(Site::Variational));
        // Table layout shares the Lighter column shape: funding in cell 8,
        // PnL in cell 6, but with a signed size and a -PERP coin cell.
        let row: Vec<String> = vec![
            "ETH-PERP".into(),
            "0.5".into(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            "$12.00".into(),
            String::new(),
            "-$0.40".into(),
        ];
        surface.set_rows(markers::TABLE_ROWS, vec![row]).await;
        let reader = VariationalReader::new(surface);

        let reading = reader.read("ETH").await.unwrap().unwrap();
        assert_eq!(reading.signed_size, dec!(0.5));
        assert_eq!(reading.unrealized_pnl, dec!(12.00));
        assert_eq!(reading.funding, dec!(-0.40));
    }

    #[tokio::test]
    async fn test_read_no_layout_returns_none() {
        let surface = Arc::new(MockSurface::new(Site::Variational));
        let reader = VariationalReader::new(surface);
        assert!(reader.read("BTC").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_unreachable_surface_errors() {
        let surface = Arc::new(MockSurface::new(Site::Variational));
        surface.set_reachable(false).await;
        let reader = VariationalReader::new(surface);
        assert!(reader.read("BTC").await.is_err());
    }

    #[tokio::test]
    async fn test_actuator_order_form_sequence() {
        let surface = Arc::new(MockSurface::new(Site::Variational));
        let actuator = VariationalActuator::new(surface.clone());

        actuator.set_quantity("2.00000").await.unwrap();
        actuator.select_direction(Direction::Sell).await.unwrap();
        actuator.submit().await.unwrap();

        let actions = surface.take_actions().await;
        assert_eq!(
            actions,
            vec![
                SurfaceAction::Input {
                    marker: markers::QUANTITY_INPUT.to_string(),
                    value: "2.00000".to_string(),
                },
                SurfaceAction::Click {
                    marker: markers::SELL_SWITCH.to_string(),
                },
                SurfaceAction::Click {
                    marker: markers::SUBMIT_BUTTON.to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_actuator_tolerates_missing_switch() {
        let surface = Arc::new(MockSurface::new(Site::Variational));
        surface.remove_control(markers::BUY_SWITCH).await;
        let actuator = VariationalActuator::new(surface.clone());

        actuator.select_direction(Direction::Buy).await.unwrap();
        assert!(surface.take_actions().await.is_empty());
    }
}
