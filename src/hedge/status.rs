//! Session status line, published over a watch channel.
//!
//! Only the most recent status matters to a consumer (it renders a single
//! line), so last-write-wins semantics fit and a slow consumer never blocks
//! the poll loop.

use rust_decimal::Decimal;
use std::fmt;
use tokio::sync::watch;
use tracing::debug;

use crate::surface::Direction;

/// What the hedge session is doing right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HedgeStatus {
    Idle,
    MonitoringStarted,
    Monitoring {
        lighter: Decimal,
        variational: Decimal,
        net: Decimal,
    },
    Hedging {
        quantity: Decimal,
        direction: Direction,
    },
    WaitingForHedge {
        elapsed_secs: u64,
    },
    LockTimedOut,
    Error(String),
}

impl fmt::Display for HedgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HedgeStatus::Idle => write!(f, "Idle"),
            HedgeStatus::MonitoringStarted => write!(f, "Monitoring started..."),
            HedgeStatus::Monitoring {
                lighter,
                variational,
                net,
            } => write!(
                f,
                "Monitoring... L:{lighter:.4} V:{variational:.4} Net:{net:.4}"
            ),
            HedgeStatus::Hedging {
                quantity,
                direction,
            } => write!(f, "Hedging {quantity:.4} on {direction}..."),
            HedgeStatus::WaitingForHedge { elapsed_secs } => {
                write!(f, "Waiting for hedge... ({elapsed_secs}s)")
            }
            HedgeStatus::LockTimedOut => write!(f, "Lock timed out, re-monitoring..."),
            HedgeStatus::Error(message) => write!(f, "Error: {message}"),
        }
    }
}

/// Producer side of the status line.
pub struct StatusPublisher {
    tx: watch::Sender<HedgeStatus>,
}

impl StatusPublisher {
    pub fn new() -> (Self, StatusFeed) {
        let (tx, rx) = watch::channel(HedgeStatus::Idle);
        (Self { tx }, StatusFeed { rx })
    }

    pub fn publish(&self, status: HedgeStatus) {
        debug!(%status, "status");
        self.tx.send_replace(status);
    }

    pub fn current(&self) -> HedgeStatus {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> StatusFeed {
        StatusFeed {
            rx: self.tx.subscribe(),
        }
    }
}

/// Consumer side of the status line.
#[derive(Clone)]
pub struct StatusFeed {
    rx: watch::Receiver<HedgeStatus>,
}

impl StatusFeed {
    /// Wait for the next status change. None once the publisher is gone.
    pub async fn next(&mut self) -> Option<HedgeStatus> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// The most recently published status, without waiting.
    pub fn latest(&mut self) -> HedgeStatus {
        self.rx.borrow_and_update().clone()
    }
}
