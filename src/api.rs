//! Client for the porssisahko.net spot price API
//!
//! The endpoint returns about 48 hourly records covering the past day, the
//! current hour and the next day. [`PriceSource`] is the seam the update cycle
//! depends on; [`PorssisahkoClient`] is the HTTP implementation.

pub mod client;
pub mod types;

pub use client::{PorssisahkoClient, PriceSource};
pub use types::{LatestPricesResponse, PriceRecord};
