//! The order-form actuation sequence.
//!
//! Driving a rendered order form is not atomic: the page re-renders between
//! writes, so each write is followed by a settle delay before the next one.
//! The delay is a strategy so tests can run the sequence without sleeping.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::surface::{Direction, OrderActuator, SurfaceError};

/// Settle delay applied after each order-form write.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(200);

/// Which write the form just absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleStage {
    AfterQuantity,
    AfterDirection,
}

/// How long to wait for the page to settle after a write.
#[async_trait]
pub trait DelayStrategy: Send + Sync {
    async fn settle(&self, stage: SettleStage);
}

/// Real-page pacing: a fixed pause after every write.
pub struct FixedDelays {
    delay: Duration,
}

impl FixedDelays {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FixedDelays {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE)
    }
}

#[async_trait]
impl DelayStrategy for FixedDelays {
    async fn settle(&self, _stage: SettleStage) {
        tokio::time::sleep(self.delay).await;
    }
}

/// No pacing at all, for tests.
pub struct NoDelays;

#[async_trait]
impl DelayStrategy for NoDelays {
    async fn settle(&self, _stage: SettleStage) {}
}

/// Drive one offsetting order into the form: quantity (when it changed),
/// then direction, then submit, settling between writes.
pub async fn run_order_sequence(
    actuator: &dyn OrderActuator,
    delays: &dyn DelayStrategy,
    quantity: Option<&str>,
    direction: Direction,
) -> Result<(), SurfaceError> {
    if let Some(quantity) = quantity {
        actuator.set_quantity(quantity).await?;
        delays.settle(SettleStage::AfterQuantity).await;
    } else {
        debug!("quantity input already holds the target value");
    }

    actuator.select_direction(direction).await?;
    delays.settle(SettleStage::AfterDirection).await;

    actuator.submit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::mock::{MockSurface, SurfaceAction};
    use crate::surface::variational::{markers, VariationalActuator};
    use crate::surface::Site;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_full_sequence_order() {
        let surface = Arc::new(MockSurface::new(Site::Variational));
        let actuator = VariationalActuator::new(surface.clone());

        run_order_sequence(&actuator, &NoDelays, Some("2.00000"), Direction::Sell)
            .await
            .unwrap();

        assert_eq!(
            surface.take_actions().await,
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
    async fn test_unchanged_quantity_skips_the_input() {
        let surface = Arc::new(MockSurface::new(Site::Variational));
        let actuator = VariationalActuator::new(surface.clone());

        run_order_sequence(&actuator, &NoDelays, None, Direction::Buy)
            .await
            .unwrap();

        assert_eq!(
            surface.take_actions().await,
            vec![
                SurfaceAction::Click {
                    marker: markers::BUY_SWITCH.to_string(),
                },
                SurfaceAction::Click {
                    marker: markers::SUBMIT_BUTTON.to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_unreachable_surface_aborts_sequence() {
        let surface = Arc::new(MockSurface::new(Site::Variational));
        surface.set_reachable(false).await;
        let actuator = VariationalActuator::new(surface.clone());

        let result =
            run_order_sequence(&actuator, &NoDelays, Some("1.00000"), Direction::Sell).await;
        assert!(result.is_err());
        assert!(surface.take_actions().await.is_empty());
    }
}
