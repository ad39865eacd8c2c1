//! Setup and teardown of a loaded config entry
//!
//! Setup builds a coordinator with the entry's transfer fee, performs the
//! first refresh and spawns the polling task. Unload stops future ticks.

use crate::api::PriceSource;
use crate::config::Config;
use crate::coordinator::{PriceCoordinator, SnapshotSender};
use crate::error::{PorssisahkoError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::persistence::ConfigEntry;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// A config entry whose coordinator is running
pub struct LoadedEntry {
    entry: ConfigEntry,
    transfer_fee: f64,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    logger: StructuredLogger,
}

impl LoadedEntry {
    /// Set up the entry. A failing first refresh yields `NotReady`.
    pub async fn setup(
        config: &Config,
        entry: ConfigEntry,
        source: Arc<dyn PriceSource>,
        state_tx: SnapshotSender,
    ) -> Result<Self> {
        let logger =
            get_logger_with_context(LogContext::new("entry").with_entry_id(&entry.entry_id));
        logger.debug("Setting up price sensor");

        let transfer_fee = entry.transfer_fee();
        let coordinator = PriceCoordinator::new(
            source,
            transfer_fee,
            Duration::from_secs(config.poll_interval_seconds),
            state_tx,
            &entry.entry_id,
        );

        if let Err(e) = coordinator.first_refresh().await {
            logger.error(&format!("Error setting up price sensor: {e}"));
            return Err(e);
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(coordinator.run(shutdown_rx));

        logger.debug(&format!(
            "Price sensor set up with transfer fee {transfer_fee}"
        ));
        Ok(Self {
            entry,
            transfer_fee,
            shutdown_tx: Some(shutdown_tx),
            task,
            logger,
        })
    }

    pub const fn entry(&self) -> &ConfigEntry {
        &self.entry
    }

    /// Fee the running coordinator was built with
    pub const fn transfer_fee(&self) -> f64 {
        self.transfer_fee
    }

    /// Stop polling and wait for the task to finish
    pub async fn unload(mut self) -> Result<()> {
        self.logger.debug("Unloading price sensor");
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        (&mut self.task)
            .await
            .map_err(|e| PorssisahkoError::generic(format!("Polling task failed: {e}")))
    }
}

impl Drop for LoadedEntry {
    fn drop(&mut self) {
        // Dropping without unload must not leave a poller behind
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
