//! Error types and handling for Porssisahko
//!
//! Every fallible operation in the crate returns [`Result`]. The update cycle
//! treats any error as transient: it is logged, recorded on the published
//! state and the next tick tries again.

use thiserror::Error;

/// Result type alias for Porssisahko operations
pub type Result<T> = std::result::Result<T, PorssisahkoError>;

/// Main error type for Porssisahko
#[derive(Debug, Error)]
pub enum PorssisahkoError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Transport-level failures talking to the price API
    #[error("Network error: {message}")]
    Network { message: String },

    /// Price API answered with something other than 200 OK
    #[error("API request failed with status {status}")]
    HttpStatus { status: u16 },

    /// Price API answered but the payload was unusable
    #[error("API error: {message}")]
    Api { message: String },

    /// Setup could not complete; the entry is retried later
    #[error("Entry not ready: {message}")]
    NotReady { message: String },

    /// A config entry already exists (single instance only)
    #[error("Already configured: single_instance_allowed")]
    AlreadyConfigured,

    /// HTTP server errors
    #[error("Web server error: {message}")]
    Web { message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl PorssisahkoError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an error for a non-200 API response
    pub const fn http_status(status: u16) -> Self {
        Self::HttpStatus { status }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new not-ready error
    pub fn not_ready<S: Into<String>>(message: S) -> Self {
        Self::NotReady {
            message: message.into(),
        }
    }

    /// Create a new web error
    pub fn web<S: Into<String>>(message: S) -> Self {
        Self::Web {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Whether the next poll may succeed without any change on our side
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::HttpStatus { .. }
                | Self::Api { .. }
                | Self::Serialization { .. }
                | Self::NotReady { .. }
        )
    }
}

impl From<std::io::Error> for PorssisahkoError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for PorssisahkoError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PorssisahkoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for PorssisahkoError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::http_status(status.as_u16());
        }
        Self::network(err.to_string())
    }
}

impl From<chrono::ParseError> for PorssisahkoError {
    fn from(err: chrono::ParseError) -> Self {
        Self::validation("datetime", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PorssisahkoError::config("test config error");
        assert!(matches!(err, PorssisahkoError::Config { .. }));

        let err = PorssisahkoError::http_status(503);
        assert!(matches!(err, PorssisahkoError::HttpStatus { status: 503 }));

        let err = PorssisahkoError::validation("field", "test validation error");
        assert!(matches!(err, PorssisahkoError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = PorssisahkoError::config("test error");
        assert_eq!(format!("{err}"), "Configuration error: test error");

        let err = PorssisahkoError::validation("transfer_fee", "invalid value");
        assert_eq!(
            format!("{err}"),
            "Validation error: transfer_fee - invalid value"
        );

        let err = PorssisahkoError::http_status(500);
        assert_eq!(format!("{err}"), "API request failed with status 500");
    }

    #[test]
    fn test_transient_classification() {
        assert!(PorssisahkoError::http_status(502).is_transient());
        assert!(PorssisahkoError::network("reset").is_transient());
        assert!(!PorssisahkoError::AlreadyConfigured.is_transient());
        assert!(!PorssisahkoError::config("bad").is_transient());
    }
}
