//! Error types.
//!
//! Construction problems are reported as errors from `build()`. Delivery
//! problems never reach the caller of a logging method: the dispatcher turns
//! them into a `false` return and a `warn!` diagnostic.

use std::time::Duration;
use thiserror::Error;

/// Error returned when environment configuration is missing or invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The ingest token variable is not set or empty
    #[error("{0} must be set to a non-empty ingest token")]
    MissingToken(&'static str),
    /// A variable holds a value that cannot be parsed
    #[error("{name} has an invalid value {value:?}")]
    InvalidValue {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

/// Error returned when building an `AxiomLogger` fails.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Service name must not be empty
    #[error("service name must not be empty")]
    EmptyServiceName,
    /// Maximum signatures must be greater than zero
    #[error("max_signatures must be greater than 0")]
    ZeroMaxSignatures,
    /// Deduplication window must be greater than zero
    #[error("dedup window must be greater than 0, got {0:?}")]
    ZeroDedupWindow(Duration),
    /// An allowlist regex failed to compile
    #[error("invalid allowlist pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    /// Axiom configuration could not be loaded
    #[error("axiom configuration error: {0}")]
    Config(#[from] ConfigError),
    /// The HTTP client could not be created
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
    /// Axiom output requested but the `axiom` feature is disabled
    #[error("axiom output requires the `axiom` feature")]
    AxiomUnavailable,
    /// Every output was disabled
    #[error("no output configured: enable axiom or console output, or set a transport")]
    NoOutput,
}

/// Error returned when an event could not be delivered.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request failed before a response was received
    #[cfg(feature = "axiom")]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The backend answered with a non-success status
    #[error("backend rejected event with status {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },
    /// The event could not be serialized
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Writing to a local sink failed
    #[error("failed to write event: {0}")]
    Io(#[from] std::io::Error),
    /// The transport panicked while sending
    #[error("transport panicked while sending")]
    Panicked,
    /// Some sinks of a fan-out failed
    #[error("{failed} of {attempted} outputs failed, first error: {first}")]
    Partial {
        /// Number of failed sinks
        failed: usize,
        /// Number of sinks attempted
        attempted: usize,
        /// First failure observed
        first: Box<TransportError>,
    },
    /// Other failure reported by a custom transport
    #[error("{0}")]
    Other(String),
}

/// Error returned by a notification channel.
#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ConfigError::MissingToken("AXIOM_TOKEN").to_string(),
            "AXIOM_TOKEN must be set to a non-empty ingest token"
        );
        assert_eq!(
            BuildError::ZeroMaxSignatures.to_string(),
            "max_signatures must be greater than 0"
        );
        assert_eq!(
            TransportError::Rejected {
                status: 403,
                body: "forbidden".into()
            }
            .to_string(),
            "backend rejected event with status 403: forbidden"
        );
    }

    #[test]
    fn test_config_error_converts() {
        let err: BuildError = ConfigError::MissingToken("AXIOM_TOKEN").into();
        assert!(matches!(err, BuildError::Config(ConfigError::MissingToken(_))));
    }

    #[test]
    fn test_partial_reports_first() {
        let err = TransportError::Partial {
            failed: 1,
            attempted: 2,
            first: Box::new(TransportError::Other("disk full".into())),
        };
        assert_eq!(err.to_string(), "1 of 2 outputs failed, first error: disk full");
    }
}
