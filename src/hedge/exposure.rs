//! Net exposure across the two venues.

use rust_decimal::Decimal;

use crate::surface::{Direction, PositionReading};

/// Quantity decimals driven into the order form.
const QUANTITY_DECIMALS: u32 = 5;

/// Signed position sizes read off both pages in one tick.
///
/// A venue showing no position for the symbol counts as zero, so a one-sided
/// position reads as fully unhedged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetExposure {
    pub lighter_size: Decimal,
    pub variational_size: Decimal,
}

impl NetExposure {
    pub fn from_readings(
        lighter: Option<&PositionReading>,
        variational: Option<&PositionReading>,
    ) -> Self {
        Self {
            lighter_size: lighter.map(|r| r.signed_size).unwrap_or(Decimal::ZERO),
            variational_size: variational.map(|r| r.signed_size).unwrap_or(Decimal::ZERO),
        }
    }

    /// Combined signed exposure. Zero means fully hedged.
    pub fn net(&self) -> Decimal {
        self.lighter_size + self.variational_size
    }

    pub fn abs(&self) -> Decimal {
        self.net().abs()
    }

    /// The side of the offsetting order: sell down a net long, buy back a
    /// net short.
    pub fn hedge_direction(&self) -> Direction {
        if self.net() > Decimal::ZERO {
            Direction::Sell
        } else {
            Direction::Buy
        }
    }

    /// Unsigned quantity of the offsetting order, at order-form precision.
    pub fn hedge_quantity(&self) -> Decimal {
        self.abs().round_dp(QUANTITY_DECIMALS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reading(size: Decimal) -> PositionReading {
        PositionReading {
            symbol: "BTC".to_string(),
            signed_size: size,
            unrealized_pnl: Decimal::ZERO,
            funding: Decimal::ZERO,
        }
    }

    #[test]
    fn test_one_sided_long_needs_full_sell() {
        let exposure = NetExposure::from_readings(Some(&reading(dec!(2.0))), None);
        assert_eq!(exposure.net(), dec!(2.0));
        assert_eq!(exposure.hedge_direction(), Direction::Sell);
        assert_eq!(exposure.hedge_quantity(), dec!(2.0));
    }

    #[test]
    fn test_net_short_hedges_with_buy() {
        let exposure =
            NetExposure::from_readings(Some(&reading(dec!(-1.5))), Some(&reading(dec!(0.5))));
        assert_eq!(exposure.net(), dec!(-1.0));
        assert_eq!(exposure.hedge_direction(), Direction::Buy);
        assert_eq!(exposure.hedge_quantity(), dec!(1.0));
    }

    #[test]
    fn test_near_flat_book() {
        let exposure =
            NetExposure::from_readings(Some(&reading(dec!(0.3))), Some(&reading(dec!(-0.25))));
        assert_eq!(exposure.net(), dec!(0.05));
        assert_eq!(exposure.abs(), dec!(0.05));
    }

    #[test]
    fn test_both_absent_is_flat() {
        let exposure = NetExposure::from_readings(None, None);
        assert_eq!(exposure.net(), Decimal::ZERO);
        // Flat book defaults to the buy side, though nothing actuates at zero.
        assert_eq!(exposure.hedge_direction(), Direction::Buy);
    }

    #[test]
    fn test_quantity_rounds_to_order_form_precision() {
        let exposure = NetExposure::from_readings(Some(&reading(dec!(0.123456789))), None);
        assert_eq!(exposure.hedge_quantity(), dec!(0.12346));
    }
}
