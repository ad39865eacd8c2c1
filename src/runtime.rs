//! Entry supervisor
//!
//! Owns the entry store and the currently loaded entry. Commands from the
//! HTTP surface arrive over an mpsc channel; option changes are persisted and
//! followed by a full reload. Setups that are not ready are retried after
//! `setup_retry_seconds`.

use crate::api::PriceSource;
use crate::config::Config;
use crate::coordinator::{SnapshotReceiver, SnapshotSender, snapshot_channel};
use crate::entry::LoadedEntry;
use crate::error::{PorssisahkoError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::persistence::{ConfigEntry, EntryOptions, EntryStore};
use crate::sensor::PriceSensor;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Duration, Instant};

/// Title given to the single entry
pub const ENTRY_TITLE: &str = "Porssisahko Price";

/// Commands accepted by the supervisor from external components (web, etc.)
#[derive(Debug)]
pub enum EntryCommand {
    GetEntry {
        reply: oneshot::Sender<Option<ConfigEntry>>,
    },
    Install {
        options: EntryOptions,
        reply: oneshot::Sender<Result<ConfigEntry>>,
    },
    UpdateOptions {
        options: EntryOptions,
        reply: oneshot::Sender<Result<()>>,
    },
    Reload {
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Cloneable front end to a running [`Supervisor`]
#[derive(Clone)]
pub struct SupervisorHandle {
    commands_tx: mpsc::UnboundedSender<EntryCommand>,
    shutdown_tx: mpsc::UnboundedSender<()>,
    sensor_rx: watch::Receiver<Option<PriceSensor>>,
    state_rx: SnapshotReceiver,
}

fn stopped() -> PorssisahkoError {
    PorssisahkoError::generic("Supervisor is not running")
}

impl SupervisorHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> EntryCommand,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.commands_tx.send(make(reply)).map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())
    }

    /// Current config entry, if installed
    pub async fn entry(&self) -> Result<Option<ConfigEntry>> {
        self.request(|reply| EntryCommand::GetEntry { reply }).await
    }

    /// Install step; fails with `AlreadyConfigured` when an entry exists
    pub async fn install(&self, options: EntryOptions) -> Result<ConfigEntry> {
        self.request(|reply| EntryCommand::Install { options, reply })
            .await?
    }

    /// Options step; the reload runs after this returns
    pub async fn update_options(&self, options: EntryOptions) -> Result<()> {
        self.request(|reply| EntryCommand::UpdateOptions { options, reply })
            .await?
    }

    pub async fn reload(&self) -> Result<()> {
        self.request(|reply| EntryCommand::Reload { reply }).await?
    }

    /// The registered sensor; `None` while the entry is not set up
    pub fn sensor(&self) -> Option<PriceSensor> {
        self.sensor_rx.borrow().clone()
    }

    /// Fires whenever the sensor is registered or removed
    pub fn subscribe_sensor(&self) -> watch::Receiver<Option<PriceSensor>> {
        self.sensor_rx.clone()
    }

    /// Snapshot receiver that survives reloads
    pub fn subscribe_state(&self) -> SnapshotReceiver {
        self.state_rx.clone()
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending::<()>().await,
    }
}

pub struct Supervisor {
    config: Arc<Config>,
    store: EntryStore,
    source: Arc<dyn PriceSource>,
    state_tx: SnapshotSender,
    sensor_tx: watch::Sender<Option<PriceSensor>>,
    loaded: Option<LoadedEntry>,
    retry_at: Option<Instant>,
    commands_rx: mpsc::UnboundedReceiver<EntryCommand>,
    shutdown_rx: mpsc::UnboundedReceiver<()>,
    handle: SupervisorHandle,
    logger: StructuredLogger,
}

impl Supervisor {
    /// Load (or auto-install) the entry; nothing polls until [`Supervisor::run`]
    pub fn new(config: Arc<Config>, source: Arc<dyn PriceSource>) -> Result<Self> {
        let logger = get_logger("supervisor");
        let mut store = EntryStore::new(&config.entry_file);

        let existing = store.load()?.cloned();
        let entry = match existing {
            Some(entry) => Some(entry),
            None if config.auto_install => {
                let data = EntryOptions {
                    transfer_fee: config.transfer_fee,
                };
                Some(store.create_entry(ENTRY_TITLE, data)?.clone())
            }
            None => {
                logger.info("No config entry; waiting for the install step");
                None
            }
        };

        let initial_fee = entry
            .as_ref()
            .map_or(config.transfer_fee, ConfigEntry::transfer_fee);
        let (state_tx, state_rx) = snapshot_channel(initial_fee);
        let (sensor_tx, sensor_rx) = watch::channel(None);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();

        let handle = SupervisorHandle {
            commands_tx,
            shutdown_tx,
            sensor_rx,
            state_rx,
        };

        Ok(Self {
            config,
            store,
            source,
            state_tx,
            sensor_tx,
            loaded: None,
            retry_at: None,
            commands_rx,
            shutdown_rx,
            handle,
            logger,
        })
    }

    pub fn handle(&self) -> SupervisorHandle {
        self.handle.clone()
    }

    /// Set up the entry and serve commands until shutdown
    pub async fn run(mut self) -> Result<()> {
        self.setup_current().await;

        loop {
            tokio::select! {
                () = wait_until(self.retry_at) => {
                    self.retry_at = None;
                    self.logger.info("Retrying entry setup");
                    self.setup_current().await;
                }
                Some(cmd) = self.commands_rx.recv() => {
                    self.handle_command(cmd).await;
                }
                _ = self.shutdown_rx.recv() => {
                    self.logger.info("Shutdown signal received");
                    break;
                }
            }
        }

        self.unload_current().await
    }

    async fn handle_command(&mut self, cmd: EntryCommand) {
        match cmd {
            EntryCommand::GetEntry { reply } => {
                let _ = reply.send(self.store.entry().cloned());
            }
            EntryCommand::Install { options, reply } => {
                let created = self.store.create_entry(ENTRY_TITLE, options).cloned();
                let ok = created.is_ok();
                let _ = reply.send(created);
                if ok {
                    self.setup_current().await;
                }
            }
            EntryCommand::UpdateOptions { options, reply } => {
                self.logger.debug("Handling options update");
                let saved = self.store.update_options(options).map(|_| ());
                let ok = saved.is_ok();
                let _ = reply.send(saved);
                if ok {
                    self.reload().await;
                }
            }
            EntryCommand::Reload { reply } => {
                let _ = reply.send(Ok(()));
                self.reload().await;
            }
        }
    }

    async fn reload(&mut self) {
        self.logger.info("Reloading config entry");
        if let Err(e) = self.unload_current().await {
            self.logger.error(&format!("Unload failed: {e}"));
        }
        self.setup_current().await;
    }

    /// Set up the stored entry, scheduling a retry when it is not ready
    async fn setup_current(&mut self) {
        let Some(entry) = self.store.entry().cloned() else {
            return;
        };
        let entry_id = entry.entry_id.clone();
        let result = LoadedEntry::setup(
            &self.config,
            entry,
            self.source.clone(),
            self.state_tx.clone(),
        )
        .await;

        match result {
            Ok(loaded) => {
                self.retry_at = None;
                self.loaded = Some(loaded);
                self.sensor_tx.send_replace(Some(PriceSensor::new(
                    &entry_id,
                    self.config.sensor.clone(),
                    self.config.tz(),
                    self.handle.state_rx.clone(),
                )));
                self.logger
                    .info(&format!("Registered sensor {entry_id}_current_price"));
            }
            Err(e) if e.is_transient() => {
                let delay = Duration::from_secs(self.config.setup_retry_seconds);
                self.logger.warn(&format!(
                    "Entry not ready ({e}); retrying in {}s",
                    delay.as_secs()
                ));
                self.retry_at = Some(Instant::now() + delay);
            }
            Err(e) => {
                self.logger
                    .error(&format!("Entry setup failed permanently: {e}"));
            }
        }
    }

    async fn unload_current(&mut self) -> Result<()> {
        self.retry_at = None;
        self.sensor_tx.send_replace(None);
        match self.loaded.take() {
            Some(loaded) => loaded.unload().await,
            None => Ok(()),
        }
    }
}
