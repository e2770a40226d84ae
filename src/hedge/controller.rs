//! Polling hedge controller.
//!
//! One controller owns one session. `start` arms the session and spawns a
//! poll task; every tick reads both surfaces, recomputes net exposure and
//! actuates an offsetting order when the book is unhedged past the
//! threshold. A lock gates actuation until the order is observed filled or
//! the lock times out.

use anyhow::ensure;
use futures_util::future;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use super::actuation::{run_order_sequence, DelayStrategy};
use super::exposure::NetExposure;
use super::session::HedgeSession;
use super::status::{HedgeStatus, StatusFeed, StatusPublisher};
use crate::surface::{SurfaceError, SurfaceLocator};

/// Parameters for one monitoring run.
#[derive(Debug, Clone)]
pub struct HedgeParams {
    pub symbol: String,
    pub poll_interval: Duration,
    pub exposure_threshold: Decimal,
    pub lock_timeout: Duration,
}

impl HedgeParams {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.symbol.trim().is_empty(), "symbol must not be empty");
        ensure!(
            self.poll_interval > Duration::ZERO,
            "poll interval must be positive"
        );
        ensure!(
            self.lock_timeout > Duration::ZERO,
            "lock timeout must be positive"
        );
        ensure!(
            self.exposure_threshold >= Decimal::ZERO,
            "exposure threshold must not be negative"
        );
        Ok(())
    }
}

/// Start/stop surface over the polling session.
pub struct HedgeController {
    locator: Arc<dyn SurfaceLocator>,
    delays: Arc<dyn DelayStrategy>,
    status: Arc<StatusPublisher>,
    session: Arc<Mutex<HedgeSession>>,
}

impl HedgeController {
    pub fn new(
        locator: Arc<dyn SurfaceLocator>,
        delays: Arc<dyn DelayStrategy>,
    ) -> (Self, StatusFeed) {
        let (status, feed) = StatusPublisher::new();
        (
            Self {
                locator,
                delays,
                status: Arc::new(status),
                session: Arc::new(Mutex::new(HedgeSession::new())),
            },
            feed,
        )
    }

    /// Arm the session and spawn the poll task. A second start while running
    /// is a no-op.
    pub async fn start(&self, params: HedgeParams) -> anyhow::Result<()> {
        params.validate()?;

        let mut session = self.session.lock().await;
        if session.running {
            warn!("monitoring already running, ignoring start");
            return Ok(());
        }
        session.arm(&params);
        let epoch = session.epoch();
        drop(session);

        info!(symbol = %params.symbol, interval = ?params.poll_interval, "hedge monitoring started");
        self.status.publish(HedgeStatus::MonitoringStarted);

        tokio::spawn(Self::poll_loop(
            Arc::clone(&self.session),
            Arc::clone(&self.locator),
            Arc::clone(&self.delays),
            Arc::clone(&self.status),
            epoch,
            params.poll_interval,
        ));
        Ok(())
    }

    /// Stop monitoring and clear the session. A stop while idle is a no-op.
    pub async fn stop(&self) {
        let mut session = self.session.lock().await;
        if !session.running {
            return;
        }
        session.reset();
        self.status.publish(HedgeStatus::Idle);
        info!("hedge monitoring stopped");
    }

    pub fn status(&self) -> HedgeStatus {
        self.status.current()
    }

    pub fn subscribe(&self) -> StatusFeed {
        self.status.subscribe()
    }

    async fn poll_loop(
        session: Arc<Mutex<HedgeSession>>,
        locator: Arc<dyn SurfaceLocator>,
        delays: Arc<dyn DelayStrategy>,
        status: Arc<StatusPublisher>,
        epoch: u64,
        poll_interval: Duration,
    ) {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The interval fires immediately; the first poll should come one
        // period after start.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let mut session = session.lock().await;
            // A stop or restart supersedes this task.
            if !session.running || session.epoch() != epoch {
                break;
            }

            if let Err(error) =
                run_tick(&mut session, locator.as_ref(), delays.as_ref(), &status).await
            {
                error!(%error, "hedge tick failed, stopping session");
                session.reset();
                status.publish(HedgeStatus::Error(error.to_string()));
                break;
            }
        }
    }
}

/// One poll tick: read both surfaces, settle the lock, actuate when needed.
async fn run_tick(
    session: &mut HedgeSession,
    locator: &dyn SurfaceLocator,
    delays: &dyn DelayStrategy,
    status: &StatusPublisher,
) -> Result<(), SurfaceError> {
    let pair = locator
        .locate(&session.target_symbol)
        .await?
        .ok_or(SurfaceError::SurfacesNotFound)?;

    let (lighter, variational) = future::join(
        pair.lighter.read(&session.target_symbol),
        pair.variational.read(&session.target_symbol),
    )
    .await;
    let exposure = NetExposure::from_readings(lighter?.as_ref(), variational?.as_ref());

    // Positions are read even while locked, so a fill releases the lock on
    // the tick that observes it.
    if session.locked() && exposure.abs() < session.exposure_threshold {
        info!(net = %exposure.net(), "hedge filled, lock released");
        session.unlock();
    }

    if session.locked() {
        let elapsed = session.lock_elapsed().unwrap_or_default();
        if elapsed > session.lock_timeout {
            warn!(?elapsed, "hedge lock timed out, releasing");
            session.unlock();
            status.publish(HedgeStatus::LockTimedOut);
        } else {
            let elapsed_secs = ((elapsed.as_millis() + 500) / 1000) as u64;
            status.publish(HedgeStatus::WaitingForHedge { elapsed_secs });
        }
        return Ok(());
    }

    status.publish(HedgeStatus::Monitoring {
        lighter: exposure.lighter_size,
        variational: exposure.variational_size,
        net: exposure.net(),
    });

    if exposure.abs() >= session.exposure_threshold {
        let direction = exposure.hedge_direction();
        let quantity = exposure.hedge_quantity();

        // Rewriting the input with the value it already holds can clear a
        // half-applied form, so an unchanged quantity is skipped.
        let quantity_text = if session.last_submitted_quantity == Some(quantity) {
            None
        } else {
            Some(format!("{quantity:.5}"))
        };

        session.lock();
        session.last_submitted_quantity = Some(quantity);
        info!(%quantity, %direction, "net exposure over threshold, hedging");

        run_order_sequence(pair.actuator.as_ref(), delays, quantity_text.as_deref(), direction)
            .await?;

        status.publish(HedgeStatus::Hedging {
            quantity,
            direction,
        });
    }

    Ok(())
}
