//! Hedge engine: session state, exposure math, the order-form actuation
//! sequence and the polling controller that ties them together.

mod actuation;
mod controller;
mod exposure;
mod session;
mod status;

pub use actuation::{run_order_sequence, DelayStrategy, FixedDelays, NoDelays, SettleStage};
pub use controller::{HedgeController, HedgeParams};
pub use exposure::NetExposure;
pub use session::HedgeSession;
pub use status::{HedgeStatus, StatusFeed, StatusPublisher};
