//! Config entry persistence
//!
//! The daemon manages a single config entry. Its install-time values live in
//! `data`, later edits in `options`; both are written to one JSON file.

use crate::error::{PorssisahkoError, Result};
use crate::logging::get_logger;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current on-disk entry version
pub const ENTRY_VERSION: u32 = 1;

/// User-editable values of an entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryOptions {
    /// Flat surcharge per kWh added to the spot price
    pub transfer_fee: f64,
}

impl Default for EntryOptions {
    fn default() -> Self {
        Self { transfer_fee: 0.0 }
    }
}

/// Persisted config entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: String,
    pub version: u32,
    pub title: String,
    /// Values captured by the install step
    pub data: EntryOptions,
    /// Values set through the options step, if any
    #[serde(default)]
    pub options: Option<EntryOptions>,
}

impl ConfigEntry {
    /// New entry with a random id
    pub fn new(title: &str, data: EntryOptions) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().simple().to_string(),
            version: ENTRY_VERSION,
            title: title.to_string(),
            data,
            options: None,
        }
    }

    /// Options first, then install data
    pub fn effective_options(&self) -> EntryOptions {
        self.options.unwrap_or(self.data)
    }

    pub fn transfer_fee(&self) -> f64 {
        self.effective_options().transfer_fee
    }
}

/// Loads and saves the single config entry
pub struct EntryStore {
    file_path: String,
    entry: Option<ConfigEntry>,
    logger: crate::logging::StructuredLogger,
}

impl EntryStore {
    pub fn new(file_path: &str) -> Self {
        Self {
            file_path: file_path.to_string(),
            entry: None,
            logger: get_logger("persistence"),
        }
    }

    /// Load the entry from disk; a missing file means "not configured"
    pub fn load(&mut self) -> Result<Option<&ConfigEntry>> {
        let path = Path::new(&self.file_path);

        if !path.exists() {
            self.logger.info("No config entry found");
            self.entry = None;
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)?;
        let entry: ConfigEntry = serde_json::from_str(&contents)?;
        if entry.version > ENTRY_VERSION {
            return Err(PorssisahkoError::config(format!(
                "Config entry version {} is newer than supported {}",
                entry.version, ENTRY_VERSION
            )));
        }
        self.logger
            .info(&format!("Loaded config entry {}", entry.entry_id));
        self.entry = Some(entry);
        Ok(self.entry.as_ref())
    }

    /// Write the current entry to disk
    pub fn save(&self) -> Result<()> {
        match self.entry.as_ref() {
            Some(entry) => self.write(entry),
            None => Ok(()),
        }
    }

    fn write(&self, entry: &ConfigEntry) -> Result<()> {
        if let Some(parent) = Path::new(&self.file_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entry)?;
        std::fs::write(&self.file_path, contents)?;
        self.logger.debug("Saved config entry to disk");
        Ok(())
    }

    pub const fn entry(&self) -> Option<&ConfigEntry> {
        self.entry.as_ref()
    }

    /// Install step: create and persist the only entry.
    ///
    /// Nothing is kept in memory unless the write succeeds.
    pub fn create_entry(&mut self, title: &str, data: EntryOptions) -> Result<&ConfigEntry> {
        if self.entry.is_some() {
            self.logger
                .warn("Refusing second config entry: single_instance_allowed");
            return Err(PorssisahkoError::AlreadyConfigured);
        }
        let entry = ConfigEntry::new(title, data);
        self.write(&entry)?;
        self.logger
            .info(&format!("Created config entry {}", entry.entry_id));
        Ok(&*self.entry.insert(entry))
    }

    /// Options step: replace the options and persist.
    ///
    /// The in-memory entry only changes once the write succeeds.
    pub fn update_options(&mut self, options: EntryOptions) -> Result<&ConfigEntry> {
        let Some(current) = self.entry.as_ref() else {
            return Err(PorssisahkoError::config("No config entry to update"));
        };
        let mut updated = current.clone();
        updated.options = Some(options);
        self.write(&updated)?;
        Ok(&*self.entry.insert(updated))
    }

    /// Load the entry, creating it from `data` when none exists yet
    pub fn load_or_create(&mut self, title: &str, data: EntryOptions) -> Result<ConfigEntry> {
        if let Some(entry) = self.load()? {
            return Ok(entry.clone());
        }
        self.create_entry(title, data).cloned()
    }
}
