//! Periodic price refresh
//!
//! One coordinator runs per loaded config entry. Each tick walks the update
//! cycle `Idle -> Fetching -> {Updated, Failed}` and publishes the outcome
//! through a watch channel. A failed cycle keeps the previous price; the next
//! tick is the retry.

use crate::api::PriceSource;
use crate::error::{PorssisahkoError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::pricing;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};

pub mod types;

pub use types::{PriceSnapshot, UpdatePhase};

/// Shared publisher; survives reloads so readers keep one receiver
pub type SnapshotSender = Arc<watch::Sender<Arc<PriceSnapshot>>>;
pub type SnapshotReceiver = watch::Receiver<Arc<PriceSnapshot>>;

/// Create the snapshot channel seeded with an idle state
pub fn snapshot_channel(transfer_fee: f64) -> (SnapshotSender, SnapshotReceiver) {
    let (tx, rx) = watch::channel(Arc::new(PriceSnapshot::initial(transfer_fee)));
    (Arc::new(tx), rx)
}

/// Drives the update cycle for one config entry
pub struct PriceCoordinator {
    source: Arc<dyn PriceSource>,
    transfer_fee: f64,
    update_interval: Duration,
    state_tx: SnapshotSender,
    logger: StructuredLogger,
}

impl PriceCoordinator {
    pub fn new(
        source: Arc<dyn PriceSource>,
        transfer_fee: f64,
        update_interval: Duration,
        state_tx: SnapshotSender,
        entry_id: &str,
    ) -> Self {
        let logger = get_logger_with_context(
            LogContext::new("coordinator").with_entry_id(entry_id),
        );
        Self {
            source,
            transfer_fee,
            update_interval,
            state_tx,
            logger,
        }
    }

    pub const fn transfer_fee(&self) -> f64 {
        self.transfer_fee
    }

    pub const fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<PriceSnapshot> {
        self.state_tx.borrow().clone()
    }

    /// Run one cycle against the wall clock
    pub async fn refresh(&self) -> Result<Option<f64>> {
        self.refresh_at(Utc::now()).await
    }

    /// Run one cycle as if the current time were `now`.
    ///
    /// Returns the new total price (`None` when no bucket covers `now`).
    /// On error the previous price stays published and the error is returned.
    pub async fn refresh_at(&self, now: DateTime<Utc>) -> Result<Option<f64>> {
        self.publish(|s| s.phase = UpdatePhase::Fetching);
        self.logger.debug("Fetching latest prices from API");

        let records = match self.source.latest_prices().await {
            Ok(records) => records,
            Err(e) => {
                self.logger
                    .error(&format!("Error communicating with API: {e}"));
                let message = e.to_string();
                self.publish(|s| {
                    s.phase = UpdatePhase::Failed;
                    s.last_update_success = false;
                    s.last_error = Some(message);
                });
                return Err(e);
            }
        };

        self.logger
            .trace(&format!("Received {} price records", records.len()));

        let fee = self.transfer_fee;
        let current = pricing::select_current(&records, now);
        let (total, energy, start) = match current {
            Some(record) => {
                let energy = pricing::energy_price(record.price_cents_per_kwh);
                let total = pricing::total_price(record.price_cents_per_kwh, fee);
                self.logger.debug(&format!(
                    "Updated price: {total} (Energy: {energy}, Transfer: {fee})"
                ));
                (Some(total), Some(energy), Some(record.start_time))
            }
            None => {
                self.logger.warn(&format!(
                    "No current price found in the data ({} records)",
                    records.len()
                ));
                (None, None, None)
            }
        };

        self.publish(|s| {
            s.total_price = total;
            s.energy_price = energy;
            s.transfer_fee = fee;
            s.price_start = start;
            s.phase = UpdatePhase::Updated;
            s.last_update_success = true;
            s.last_updated = Some(now);
            s.last_error = None;
        });
        Ok(total)
    }

    /// Setup-time refresh; transient failures turn into "not ready"
    pub async fn first_refresh(&self) -> Result<()> {
        match self.refresh().await {
            Ok(_) => Ok(()),
            Err(e) if e.is_transient() => Err(PorssisahkoError::not_ready(e.to_string())),
            Err(e) => Err(e),
        }
    }

    /// Tick until `shutdown` fires or its sender is dropped.
    ///
    /// The first tick comes one interval from now; setup already refreshed.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let mut ticker = interval_at(Instant::now() + self.update_interval, self.update_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.logger.info(&format!(
            "Polling every {}s with transfer fee {}",
            self.update_interval.as_secs(),
            self.transfer_fee
        ));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Failures are logged and published by refresh_at
                    let _ = self.refresh().await;
                }
                _ = &mut shutdown => {
                    self.logger.debug("Coordinator stopped");
                    break;
                }
            }
        }
    }

    fn publish(&self, update: impl FnOnce(&mut PriceSnapshot)) {
        self.state_tx.send_modify(|current| {
            let mut next = (**current).clone();
            update(&mut next);
            *current = Arc::new(next);
        });
    }
}
