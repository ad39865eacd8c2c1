//! # Porssisahko - spot electricity price sensor
//!
//! Polls the porssisahko.net latest-prices endpoint, picks the hourly bucket
//! covering "now", adds a flat transfer fee and exposes the total as a single
//! sensor value over HTTP.
//!
//! ## Architecture
//!
//! - `api`: price API client and the `PriceSource` seam
//! - `pricing`: current-hour selection and the fee transform
//! - `coordinator`: periodic update cycle publishing snapshots
//! - `sensor`: read-only state view (value + transfer fee attribute)
//! - `options`: install/options dialogs for the transfer fee
//! - `persistence`: the stored config entry
//! - `entry`: setup/unload of one entry
//! - `runtime`: supervisor handling reloads and setup retries
//! - `web`: HTTP API and server-sent events
//! - `config`, `logging`, `error`: ambient plumbing

pub mod api;
pub mod config;
pub mod coordinator;
pub mod entry;
pub mod error;
pub mod logging;
pub mod options;
pub mod persistence;
pub mod pricing;
pub mod runtime;
pub mod sensor;
pub mod web;


// Re-export commonly used types
pub use config::Config;
pub use error::{PorssisahkoError, Result};
pub use runtime::{Supervisor, SupervisorHandle};

/// Version string stamped at build time
pub const APP_VERSION: &str = env!("APP_VERSION");
