use super::*;

/// Public endpoint serving roughly 48 hours of spot prices
pub const DEFAULT_API_URL: &str = "https://api.porssisahko.net/v1/latest-prices.json";

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            timeout_seconds: 10,
            user_agent: format!("porssisahko/{}", env!("APP_VERSION")),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            name: "Porssisahko Electricity Price".to_string(),
            unit_of_measurement: "€/kWh".to_string(),
            device_class: "monetary".to_string(),
            state_class: "total".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/porssisahko.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 8089,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            poll_interval_seconds: 300,
            setup_retry_seconds: 30,
            transfer_fee: 0.0,
            auto_install: true,
            timezone: "Europe/Helsinki".to_string(),
            entry_file: "/data/porssisahko_entry.json".to_string(),
            sensor: SensorConfig::default(),
            logging: LoggingConfig::default(),
            web: WebConfig::default(),
        }
    }
}
