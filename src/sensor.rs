//! The exposed price sensor
//!
//! Read-only view over the coordinator's snapshot channel: one numeric state
//! (total price) plus the transfer fee as an attribute.

use crate::config::SensorConfig;
use crate::coordinator::{PriceSnapshot, SnapshotReceiver};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;

/// Rendered when the total price is not known
pub const STATE_UNKNOWN: &str = "unknown";

/// Extra attributes published alongside the state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorAttributes {
    pub transfer_fee: f64,
    pub energy_price: Option<f64>,
    pub price_start: Option<String>,
    pub unit_of_measurement: String,
    pub device_class: String,
    pub state_class: String,
    pub friendly_name: String,
}

/// Full state as served to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    pub unique_id: String,
    /// Total price formatted as text, or `unknown`
    pub state: String,
    pub native_value: Option<f64>,
    pub available: bool,
    pub phase: &'static str,
    pub attributes: SensorAttributes,
    pub last_updated: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Clone)]
pub struct PriceSensor {
    unique_id: String,
    presentation: SensorConfig,
    tz: Tz,
    rx: SnapshotReceiver,
}

impl PriceSensor {
    pub fn new(entry_id: &str, presentation: SensorConfig, tz: Tz, rx: SnapshotReceiver) -> Self {
        Self {
            unique_id: format!("{entry_id}_current_price"),
            presentation,
            tz,
            rx,
        }
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.presentation.name
    }

    /// Current snapshot without holding the channel lock
    pub fn snapshot(&self) -> Arc<PriceSnapshot> {
        self.rx.borrow().clone()
    }

    pub fn native_value(&self) -> Option<f64> {
        self.snapshot().total_price
    }

    /// Attributes beyond the main value
    pub fn extra_state_attributes(&self) -> serde_json::Value {
        serde_json::json!({ "transfer_fee": self.snapshot().transfer_fee })
    }

    /// False once the most recent cycle has failed
    pub fn available(&self) -> bool {
        self.snapshot().last_update_success
    }

    /// New receiver for change notifications
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.rx.clone()
    }

    fn local(&self, ts: DateTime<Utc>) -> String {
        ts.with_timezone(&self.tz).to_rfc3339()
    }

    pub fn render(&self, snapshot: &PriceSnapshot) -> SensorState {
        let state = snapshot
            .total_price
            .map_or_else(|| STATE_UNKNOWN.to_string(), |v| v.to_string());
        SensorState {
            unique_id: self.unique_id.clone(),
            state,
            native_value: snapshot.total_price,
            available: snapshot.last_update_success,
            phase: snapshot.phase.as_str(),
            attributes: SensorAttributes {
                transfer_fee: snapshot.transfer_fee,
                energy_price: snapshot.energy_price,
                price_start: snapshot.price_start.map(|t| self.local(t)),
                unit_of_measurement: self.presentation.unit_of_measurement.clone(),
                device_class: self.presentation.device_class.clone(),
                state_class: self.presentation.state_class.clone(),
                friendly_name: self.presentation.name.clone(),
            },
            last_updated: snapshot.last_updated.map(|t| self.local(t)),
            last_error: snapshot.last_error.clone(),
        }
    }

    /// Render the latest snapshot
    pub fn state(&self) -> SensorState {
        self.render(&self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{UpdatePhase, snapshot_channel};
    use chrono::TimeZone;

    fn sensor() -> (crate::coordinator::SnapshotSender, PriceSensor) {
        let (tx, rx) = snapshot_channel(0.03);
        let s = PriceSensor::new("abc", SensorConfig::default(), chrono_tz::Europe::Helsinki, rx);
        (tx, s)
    }

    #[test]
    fn unique_id_follows_entry() {
        let (_tx, s) = sensor();
        assert_eq!(s.unique_id(), "abc_current_price");
        assert_eq!(s.name(), "Porssisahko Electricity Price");
    }

    #[test]
    fn initial_state_is_unknown() {
        let (_tx, s) = sensor();
        let st = s.state();
        assert_eq!(st.state, "unknown");
        assert!(!st.available);
        assert_eq!(st.phase, "idle");
        assert_eq!(s.extra_state_attributes()["transfer_fee"], 0.03);
    }

    #[test]
    fn renders_value_and_local_times() {
        let (tx, s) = sensor();
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        tx.send_modify(|cur| {
            let mut next = (**cur).clone();
            next.total_price = Some(0.125);
            next.energy_price = Some(0.095);
            next.price_start = Some(start);
            next.phase = UpdatePhase::Updated;
            next.last_update_success = true;
            *cur = Arc::new(next);
        });
        let st = s.state();
        assert_eq!(st.state, "0.125");
        assert_eq!(s.native_value(), Some(0.125));
        assert!(s.available());
        assert_eq!(st.attributes.unit_of_measurement, "€/kWh");
        // Helsinki is UTC+2 in winter
        assert_eq!(
            st.attributes.price_start.as_deref(),
            Some("2024-01-15T12:00:00+02:00")
        );
    }
}
