//! Core types shared by the surface adapters.

use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// One of the two trading sites whose rendered page we scrape and drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    Lighter,
    Variational,
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Site::Lighter => write!(f, "Lighter"),
            Site::Variational => write!(f, "Variational"),
        }
    }
}

impl Site {
    /// Short code for status lines (single char).
    pub fn short_code(&self) -> &'static str {
        match self {
            Site::Lighter => "L",
            Site::Variational => "V",
        }
    }
}

/// Direction of a hedge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "buy"),
            Direction::Sell => write!(f, "sell"),
        }
    }
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Buy => Direction::Sell,
            Direction::Sell => Direction::Buy,
        }
    }
}

/// A position scraped from a rendered page.
///
/// Produced fresh on every read; no identity beyond the symbol and never
/// persisted. `signed_size` is negative for shorts.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReading {
    pub symbol: String,
    pub signed_size: Decimal,
    pub unrealized_pnl: Decimal,
    pub funding: Decimal,
}

/// Errors raised by the surface layer.
///
/// All of these are fatal for the hedge tick that observes them. A position
/// that is simply absent from the page is `Ok(None)`, not an error.
#[derive(Debug, Clone, Error)]
pub enum SurfaceError {
    /// Neither page (or one of the two) could be resolved for the symbol.
    #[error("trading surfaces not found")]
    SurfacesNotFound,

    /// The page handle exists but the underlying surface cannot be driven.
    #[error("{site} surface unreachable: {reason}")]
    Unreachable { site: Site, reason: String },

    /// Scraping the page failed in a way that is not "nothing rendered".
    #[error("{site} read failed: {reason}")]
    ReadFailed { site: Site, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_display() {
        assert_eq!(Site::Lighter.to_string(), "Lighter");
        assert_eq!(Site::Variational.short_code(), "V");
        assert_eq!(Site::Lighter.short_code(), "L");
    }

    #[test]
    fn test_direction_display_and_opposite() {
        assert_eq!(Direction::Buy.to_string(), "buy");
        assert_eq!(Direction::Sell.to_string(), "sell");
        assert_eq!(Direction::Buy.opposite(), Direction::Sell);
    }

    #[test]
    fn test_surface_error_messages() {
        assert_eq!(
            SurfaceError::SurfacesNotFound.to_string(),
            "trading surfaces not found"
        );
        let err = SurfaceError::Unreachable {
            site: Site::Variational,
            reason: "page not rendered".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Variational surface unreachable: page not rendered"
        );
    }
}
