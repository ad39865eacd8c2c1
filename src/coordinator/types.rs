use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the update cycle currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePhase {
    /// No cycle has run yet
    #[default]
    Idle,
    /// Waiting for the price API
    Fetching,
    /// Last cycle succeeded
    Updated,
    /// Last cycle failed; previous values retained
    Failed,
}

impl UpdatePhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Updated => "updated",
            Self::Failed => "failed",
        }
    }
}

/// Published result of the update cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Energy price plus transfer fee; `None` when no bucket covers now
    pub total_price: Option<f64>,
    /// Energy price alone, currency per kWh
    pub energy_price: Option<f64>,
    /// Fee the total was computed with
    pub transfer_fee: f64,
    /// Start of the bucket the price was taken from
    pub price_start: Option<DateTime<Utc>>,
    pub phase: UpdatePhase,
    /// Whether the most recent finished cycle succeeded
    pub last_update_success: bool,
    /// Completion time of the most recent successful cycle
    pub last_updated: Option<DateTime<Utc>>,
    /// Message of the most recent failure, cleared on success
    pub last_error: Option<String>,
}

impl PriceSnapshot {
    /// State before the first cycle
    pub const fn initial(transfer_fee: f64) -> Self {
        Self {
            total_price: None,
            energy_price: None,
            transfer_fee,
            price_start: None,
            phase: UpdatePhase::Idle,
            last_update_success: false,
            last_updated: None,
            last_error: None,
        }
    }
}
