//! Lighter page adapter (app.lighter.xyz/trade/<coin>).
//!
//! The positions table renders one `tr` per position with at least nine
//! cells: direction + coin in the first, size in the second, unrealized PnL
//! in the seventh and funding in the ninth.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

use super::traits::{OrderActuator, PositionReader, SurfaceHandle};
use super::types::{Direction, PositionReading, Site, SurfaceError};
use crate::utils::scrape::{parse_currency, parse_signed_size};

/// Page markers the adapter drives and scrapes. Public so the simulation
/// harness can render matching content.
pub mod markers {
    pub const POSITION_ROWS: &str = r#"tr[data-testid^="row-"]"#;
    pub const QUANTITY_INPUT: &str =
        r#"[data-testid="quantity-input"], [data-testid="place-order-size-input"]"#;
    pub const SUBMIT_BUTTON: &str =
        r#"[data-testid="submit-button"], [data-testid="place-order-button"]"#;
    pub const BUY_BUTTON: &str = "button:Buy / Long";
    pub const SELL_BUTTON: &str = "button:Sell / Short";
    pub const PORTFOLIO_VALUE: &str = "p:Trading Equity:";
}

/// Minimum cells a position row must carry before we trust its shape.
const MIN_ROW_CELLS: usize = 9;

/// Reads positions and portfolio value from a Lighter page.
pub struct LighterReader {
    surface: Arc<dyn SurfaceHandle>,
}

impl LighterReader {
    pub fn new(surface: Arc<dyn SurfaceHandle>) -> Self {
        Self { surface }
    }

    /// Parse one table row into a reading, or None when the row does not
    /// look like a position (short rows, unknown direction marker).
    fn parse_row(index: usize, cells: &[String]) -> Option<PositionReading> {
        if cells.len() < MIN_ROW_CELLS {
            warn!(row = index, cells = cells.len(), "unexpected Lighter row shape");
            return None;
        }

        let mut head = cells[0].split_whitespace();
        let is_long = match head.next() {
            Some("long") => true,
            Some("short") => false,
            other => {
                warn!(row = index, marker = ?other, "missing direction marker");
                return None;
            }
        };
        let symbol = head.next()?.to_string();

        let size = parse_signed_size(&cells[1])?;
        let signed_size = if is_long { size } else { -size };

        // Absent PnL/funding cells read as zero, not as a failed row.
        let unrealized_pnl = parse_currency(&cells[6]).unwrap_or(Decimal::ZERO);
        let funding = parse_currency(&cells[8]).unwrap_or(Decimal::ZERO);

        Some(PositionReading {
            symbol,
            signed_size,
            unrealized_pnl,
            funding,
        })
    }
}

#[async_trait]
impl PositionReader for LighterReader {
    fn site(&self) -> Site {
        Site::Lighter
    }

    async fn read(&self, symbol: &str) -> Result<Option<PositionReading>, SurfaceError> {
        let rows = self.surface.scrape_rows(markers::POSITION_ROWS).await?;
        if rows.is_empty() {
            debug!("no Lighter position rows rendered");
            return Ok(None);
        }

        let reading = rows
            .iter()
            .enumerate()
            .filter_map(|(i, cells)| Self::parse_row(i, cells))
            .find(|r| r.symbol.eq_ignore_ascii_case(symbol));

        Ok(reading)
    }

    async fn portfolio_value(&self) -> Result<Option<Decimal>, SurfaceError> {
        let text = self.surface.scrape_text(markers::PORTFOLIO_VALUE).await?;
        Ok(text.as_deref().and_then(parse_currency))
    }
}

/// Drives the Lighter order form.
pub struct LighterActuator {
    surface: Arc<dyn SurfaceHandle>,
}

impl LighterActuator {
    pub fn new(surface: Arc<dyn SurfaceHandle>) -> Self {
        Self { surface }
    }
}

#[async_trait]
impl OrderActuator for LighterActuator {
    fn site(&self) -> Site {
        Site::Lighter
    }

    async fn set_quantity(&self, quantity: &str) -> Result<(), SurfaceError> {
        if self.surface.set_input(markers::QUANTITY_INPUT, quantity).await? {
            debug!(%quantity, "Lighter quantity input set");
        } else {
            warn!("Lighter quantity input not found");
        }
        Ok(())
    }

    async fn select_direction(&self, direction: Direction) -> Result<(), SurfaceError> {
        let marker = match direction {
            Direction::Buy => markers::BUY_BUTTON,
            Direction::Sell => markers::SELL_BUTTON,
        };
        if self.surface.click(marker).await? {
            debug!(%direction, "Lighter direction button clicked");
        } else {
            warn!(%direction, "Lighter direction button not found");
        }
        Ok(())
    }

    async fn submit(&self) -> Result<(), SurfaceError> {
        if self.surface.click(markers::SUBMIT_BUTTON).await? {
            debug!("Lighter submit button clicked");
        } else {
            warn!("Lighter submit button not found");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::mock::{lighter_position_row, MockSurface, SurfaceAction};
    use rust_decimal_macros::dec;

    async fn reader_with_rows(rows: Vec<Vec<String>>) -> (LighterReader, Arc<MockSurface>) {
        let surface = Arc::new(MockSurface::new(Site::Lighter));
        surface.set_rows(markers::POSITION_ROWS, rows).await;
        (LighterReader::new(surface.clone()), surface)
    }

    #[tokio::test]
    async fn test_read_long_position() {
        let (reader, _) = reader_with_rows(vec![lighter_position_row(
            "BTC",
            dec!(2.0),
            dec!(101.50),
            dec!(1.20),
        )])
        .await;

        let reading = reader.read("BTC").await.unwrap().unwrap();
        assert_eq!(reading.symbol, "BTC");
        assert_eq!(reading.signed_size, dec!(2.0));
        assert_eq!(reading.unrealized_pnl, dec!(101.50));
        assert_eq!(reading.funding, dec!(1.20));
    }

    #[tokio::test]
    async fn test_read_short_position_is_negative() {
        let (reader, _) = reader_with_rows(vec![lighter_position_row(
            "ETH",
            dec!(-0.25),
            dec!(-4.03),
            dec!(0),
        )])
        .await;

        let reading = reader.read("eth").await.unwrap().unwrap();
        assert_eq!(reading.signed_size, dec!(-0.25));
        assert_eq!(reading.unrealized_pnl, dec!(-4.03));
    }

    #[tokio::test]
    async fn test_read_missing_symbol_returns_none() {
        let (reader, _) = reader_with_rows(vec![lighter_position_row(
            "BTC",
            dec!(2.0),
            dec!(0),
            dec!(0),
        )])
        .await;

        assert!(reader.read("SOL").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_no_rows_returns_none() {
        let (reader, _) = reader_with_rows(vec![]).await;
        assert!(reader.read("BTC").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_row_is_skipped() {
        let mut rows = vec![vec!["long BTC".to_string(), "2.0".to_string()]]; // too few cells
        rows.push(lighter_position_row("BTC", dec!(1.5), dec!(0), dec!(0)));
        let (reader, _) = reader_with_rows(rows).await;

        let reading = reader.read("BTC").await.unwrap().unwrap();
        assert_eq!(reading.signed_size, dec!(1.5));
    }

    #[tokio::test]
    async fn test_read_unreachable_surface_errors() {
        let surface = Arc::new(MockSurface::new(Site::Lighter));
        surface.set_reachable(false).await;
        let reader = LighterReader::new(surface);

        assert!(reader.read("BTC").await.is_err());
    }

    #[tokio::test]
    async fn test_portfolio_value() {
        let surface = Arc::new(MockSurface::new(Site::Lighter));
        surface.set_text(markers::PORTFOLIO_VALUE, "$12,019.10").await;
        let reader = LighterReader::new(surface);

        assert_eq!(
            reader.portfolio_value().await.unwrap(),
            Some(dec!(12019.10))
        );
    }

    #[tokio::test]
    async fn test_actuator_tolerates_missing_controls() {
        let surface = Arc::new(MockSurface::new(Site::Lighter));
        surface.remove_control(markers::QUANTITY_INPUT).await;
        surface.remove_control(markers::SUBMIT_BUTTON).await;
        let actuator = LighterActuator::new(surface.clone());

        actuator.set_quantity("1.00000").await.unwrap();
        actuator.submit().await.unwrap();
        assert!(surface.take_actions().await.is_empty());
    }

    #[tokio::test]
    async fn test_actuator_records_direction_click() {
        let surface = Arc::new(MockSurface::new(Site::Lighter));
        let actuator = LighterActuator::new(surface.clone());

        actuator.select_direction(Direction::Sell).await.unwrap();
        let actions = surface.take_actions().await;
        assert_eq!(
            actions,
            vec![SurfaceAction::Click {
                marker: markers::SELL_BUTTON.to_string()
            }]
        );
    }
}
