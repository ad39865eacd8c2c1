use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One hour-long price bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Start of the bucket; the wire value is an ISO 8601 string
    #[serde(rename = "startDate")]
    pub start_time: DateTime<Utc>,

    /// Spot price in cents per kWh, VAT included as published
    #[serde(rename = "price")]
    pub price_cents_per_kwh: f64,
}

impl PriceRecord {
    pub const fn new(start_time: DateTime<Utc>, price_cents_per_kwh: f64) -> Self {
        Self {
            start_time,
            price_cents_per_kwh,
        }
    }
}

/// Body of `latest-prices.json`
#[derive(Debug, Clone, Deserialize)]
pub struct LatestPricesResponse {
    pub prices: Vec<PriceRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_wire_format() {
        let body = r#"{"prices":[
            {"price": 13.494, "startDate": "2024-11-05T22:00:00.000Z", "endDate": "2024-11-05T23:00:00.000Z"},
            {"price": -0.25, "startDate": "2024-11-05T21:00:00+02:00"}
        ]}"#;
        let parsed: LatestPricesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.prices.len(), 2);
        assert_eq!(
            parsed.prices[0].start_time,
            Utc.with_ymd_and_hms(2024, 11, 5, 22, 0, 0).unwrap()
        );
        assert!((parsed.prices[0].price_cents_per_kwh - 13.494).abs() < 1e-9);
        // Offsets are normalised to UTC
        assert_eq!(
            parsed.prices[1].start_time,
            Utc.with_ymd_and_hms(2024, 11, 5, 19, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_missing_prices_key() {
        let err = serde_json::from_str::<LatestPricesResponse>(r#"{"data": []}"#);
        assert!(err.is_err());
    }
}
