//! Mutable state of one hedge-monitoring session.

use rust_decimal::Decimal;
use std::time::Duration;
use tokio::time::Instant;

use super::controller::HedgeParams;

/// State shared between the control surface (start/stop) and the poll task.
///
/// The lock fields gate actuation: once an offsetting order is submitted the
/// session stays locked until exposure drops under the threshold or the lock
/// times out, so a slow fill is not hedged twice.
#[derive(Debug)]
pub struct HedgeSession {
    pub running: bool,
    pub target_symbol: String,
    pub exposure_threshold: Decimal,
    pub lock_timeout: Duration,
    /// Last quantity driven into the order form, to skip rewriting an input
    /// that already holds the value.
    pub last_submitted_quantity: Option<Decimal>,
    locked: bool,
    lock_acquired_at: Option<Instant>,
    /// Bumped on every arm; a poll task whose epoch no longer matches was
    /// superseded by a restart and must exit instead of mutating state.
    epoch: u64,
}

impl HedgeSession {
    pub fn new() -> Self {
        Self {
            running: false,
            target_symbol: String::new(),
            exposure_threshold: Decimal::ZERO,
            lock_timeout: Duration::ZERO,
            last_submitted_quantity: None,
            locked: false,
            lock_acquired_at: None,
            epoch: 0,
        }
    }

    /// Arm the session for a new monitoring run.
    pub fn arm(&mut self, params: &HedgeParams) {
        self.running = true;
        self.target_symbol = params.symbol.clone();
        self.exposure_threshold = params.exposure_threshold;
        self.lock_timeout = params.lock_timeout;
        self.last_submitted_quantity = None;
        self.locked = false;
        self.lock_acquired_at = None;
        self.epoch += 1;
    }

    /// Clear everything but the epoch, so stale poll tasks still see their
    /// epoch as superseded after a stop/start cycle.
    pub fn reset(&mut self) {
        self.running = false;
        self.target_symbol.clear();
        self.exposure_threshold = Decimal::ZERO;
        self.lock_timeout = Duration::ZERO;
        self.last_submitted_quantity = None;
        self.locked = false;
        self.lock_acquired_at = None;
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
        self.lock_acquired_at = Some(Instant::now());
    }

    pub fn unlock(&mut self) {
        self.locked = false;
        self.lock_acquired_at = None;
    }

    /// Time since the lock was acquired, while locked.
    pub fn lock_elapsed(&self) -> Option<Duration> {
        self.lock_acquired_at.map(|at| at.elapsed())
    }
}

impl Default for HedgeSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params() -> HedgeParams {
        HedgeParams {
            symbol: "BTC".to_string(),
            poll_interval: Duration::from_secs(1),
            exposure_threshold: dec!(0.01),
            lock_timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn test_arm_bumps_epoch_and_clears_lock() {
        let mut session = HedgeSession::new();
        session.lock();
        session.last_submitted_quantity = Some(dec!(2.0));

        session.arm(&params());
        assert!(session.running);
        assert_eq!(session.target_symbol, "BTC");
        assert_eq!(session.epoch(), 1);
        assert!(!session.locked());
        assert!(session.last_submitted_quantity.is_none());

        session.arm(&params());
        assert_eq!(session.epoch(), 2);
    }

    #[test]
    fn test_reset_keeps_epoch() {
        let mut session = HedgeSession::new();
        session.arm(&params());
        session.lock();

        session.reset();
        assert!(!session.running);
        assert!(!session.locked());
        assert!(session.target_symbol.is_empty());
        assert_eq!(session.epoch(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_elapsed_tracks_time() {
        let mut session = HedgeSession::new();
        assert!(session.lock_elapsed().is_none());

        session.lock();
        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(session.lock_elapsed(), Some(Duration::from_secs(3)));

        session.unlock();
        assert!(session.lock_elapsed().is_none());
    }
}
