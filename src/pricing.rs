//! Current-hour price selection and the transfer fee transform

use crate::api::PriceRecord;
use chrono::{DateTime, Duration, Utc};

/// Length of one price bucket in minutes
pub const BUCKET_MINUTES: i64 = 60;

/// Whether `now` falls inside the bucket starting at `record.start_time`
pub fn covers(record: &PriceRecord, now: DateTime<Utc>) -> bool {
    record.start_time <= now && now < record.start_time + Duration::minutes(BUCKET_MINUTES)
}

/// First record whose one-hour window contains `now`, scanning in order
pub fn select_current(records: &[PriceRecord], now: DateTime<Utc>) -> Option<&PriceRecord> {
    records.iter().find(|r| covers(r, now))
}

/// Price in cents per kWh of the bucket covering `now`
pub fn select_current_price(records: &[PriceRecord], now: DateTime<Utc>) -> Option<f64> {
    select_current(records, now).map(|r| r.price_cents_per_kwh)
}

/// Spot price converted from cents to currency units per kWh
pub fn energy_price(price_cents_per_kwh: f64) -> f64 {
    price_cents_per_kwh / 100.0
}

/// Total price per kWh: `cents / 100 + transfer_fee`
pub fn total_price(price_cents_per_kwh: f64, transfer_fee: f64) -> f64 {
    energy_price(price_cents_per_kwh) + transfer_fee
}
