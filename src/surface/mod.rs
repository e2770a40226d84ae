//! Rendered-surface adapters for the two tracked trading sites.
//!
//! ## Lighter
//! Table-layout position scraping and order-form actuation.
//!
//! ## Variational
//! Position scraping across three layout variants (selected by capability
//! probing) plus the order form the hedge controller drives.
//!
//! Reads are pure; writes are fire-and-forget against controls that apply
//! changes asynchronously to their own rendering.

pub mod lighter;
mod traits;
mod types;
pub mod mock;
pub mod variational;

pub use lighter::{LighterActuator, LighterReader};
pub use mock::{MockSurface, StaticSurfaceLocator, SurfaceAction};
pub use traits::{
    OrderActuator, PositionReader, SurfaceHandle, SurfaceLocator, SurfacePair,
};
#[cfg(test)]
pub use traits::MockSurfaceLocator;
pub use types::{Direction, PositionReading, Site, SurfaceError};
pub use variational::{VariationalActuator, VariationalReader};
