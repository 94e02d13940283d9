//! The outgoing log event and its building blocks.
//!
//! An [`Event`] is assembled once per logging call and handed to the transport
//! as-is. Errors enter the model as an [`ErrorInfo`], a plain `(kind, message)`
//! pair extracted from any `std::error::Error`.

use crate::domain::signature::ErrorSignature;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt;

/// A JSON mapping used for event context and event data.
pub type Fields = Map<String, Value>;

/// Event type tag carried by every document.
pub const EVENT_TYPE: &str = "workflow";

/// Severity of a forwarded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    /// An error, carries error kind and message
    Error,
    /// A warning message
    Warning,
    /// An informational message
    Info,
}

impl Level {
    /// Lowercase name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind and message of an error, detached from its concrete type.
///
/// # Examples
///
/// ```
/// use workflow_logger::ErrorInfo;
///
/// let err = "abc".parse::<i32>().unwrap_err();
/// let info = ErrorInfo::from_error(&err);
/// assert_eq!(info.kind(), "ParseIntError");
/// assert_eq!(info.message(), "invalid digit found in string");
///
/// let explicit = ErrorInfo::new("ValidationError", "missing field `id`");
/// assert_eq!(explicit.kind(), "ValidationError");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    kind: String,
    message: String,
    sources: Vec<String>,
}

impl ErrorInfo {
    /// Create error info from an explicit kind and message.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            sources: Vec::new(),
        }
    }

    /// Extract kind, message and source chain from an error value.
    ///
    /// The kind is the short type name of `E` (`ParseIntError` for
    /// `core::num::ParseIntError`). Trait objects have no concrete name and
    /// report `Error`; use [`ErrorInfo::new`] when a precise kind matters.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: Error + ?Sized,
    {
        let mut sources = Vec::new();
        let mut current = error.source();
        while let Some(source) = current {
            sources.push(source.to_string());
            current = source.source();
        }

        Self {
            kind: short_type_name(std::any::type_name::<E>()).to_string(),
            message: error.to_string(),
            sources,
        }
    }

    /// Attach a source chain, outermost first.
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// The error category.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The error message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Messages of the underlying causes, outermost first.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Split into `(kind, message, sources)`.
    pub fn into_parts(self) -> (String, String, Vec<String>) {
        (self.kind, self.message, self.sources)
    }

    /// Deduplication identity of this error.
    pub fn signature(&self) -> ErrorSignature {
        ErrorSignature::new(&self.kind, &self.message)
    }
}

impl<E> From<&E> for ErrorInfo
where
    E: Error + ?Sized,
{
    fn from(error: &E) -> Self {
        ErrorInfo::from_error(error)
    }
}

/// Reduce a `std::any::type_name` to its last path segment.
fn short_type_name(full: &str) -> &str {
    let name = full.strip_prefix("dyn ").unwrap_or(full);
    let name = name.split(" + ").next().unwrap_or(name);
    let name = name.split('<').next().unwrap_or(name);
    name.rsplit("::").next().unwrap_or(name).trim()
}

/// What the event is about: a message or an error.
#[derive(Debug, Clone, PartialEq)]
pub enum EventBody {
    /// Free-form message (warning / info)
    Message(String),
    /// Error occurrence
    Error(ErrorInfo),
}

/// A fully assembled, redacted log event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Severity
    pub level: Level,
    /// Name of the emitting service
    pub service_name: String,
    /// Wall-clock time the event was built
    pub timestamp: DateTime<Utc>,
    /// Message for warning / info events
    pub message: Option<String>,
    /// Error category for error events
    pub error_kind: Option<String>,
    /// Error text for error events
    pub error_message: Option<String>,
    /// Error source chain, outermost first
    pub error_sources: Vec<String>,
    /// Set when the deduplication cache suppressed the notification
    pub exclude_from_notification: bool,
    /// Operator-supplied metadata, never redacted
    pub context: Fields,
    /// Caller payload after redaction
    pub data: Fields,
}

impl Event {
    /// Event type tag.
    pub fn event_type(&self) -> &'static str {
        EVENT_TYPE
    }

    /// Short description for diagnostics, e.g. `[error] ParseIntError: invalid digit`.
    pub fn format_brief(&self) -> String {
        match (&self.error_kind, &self.error_message, &self.message) {
            (Some(kind), Some(message), _) => format!("[{}] {}: {}", self.level, kind, message),
            (_, _, Some(message)) => format!("[{}] {}", self.level, message),
            _ => format!("[{}]", self.level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug)]
    struct Outer(io::Error);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "failed to load workflow")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_level_names() {
        assert_eq!(Level::Error.as_str(), "error");
        assert_eq!(Level::Warning.as_str(), "warning");
        assert_eq!(Level::Info.to_string(), "info");
    }

    #[test]
    fn test_from_concrete_error() {
        let err = "x".parse::<u8>().unwrap_err();
        let info = ErrorInfo::from(&err);

        assert_eq!(info.kind(), "ParseIntError");
        assert_eq!(info.message(), err.to_string());
        assert!(info.sources().is_empty());
    }

    #[test]
    fn test_source_chain_is_collected() {
        let err = Outer(io::Error::new(io::ErrorKind::NotFound, "workflow.json missing"));
        let info = ErrorInfo::from_error(&err);

        assert_eq!(info.kind(), "Outer");
        assert_eq!(info.message(), "failed to load workflow");
        assert_eq!(info.sources(), ["workflow.json missing".to_string()]);
    }

    #[test]
    fn test_trait_object_kind() {
        let err: Box<dyn Error + Send + Sync> = "boom".into();
        let info = ErrorInfo::from_error(err.as_ref());

        assert_eq!(info.kind(), "Error");
        assert_eq!(info.message(), "boom");
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("core::num::error::ParseIntError"), "ParseIntError");
        assert_eq!(short_type_name("my::Wrapper<alloc::string::String>"), "Wrapper");
        assert_eq!(short_type_name("dyn core::error::Error + Send + Sync"), "Error");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn test_signature_ignores_sources() {
        let a = ErrorInfo::new("IoError", "reset");
        let b = ErrorInfo::new("IoError", "reset").with_sources(vec!["socket closed".into()]);

        assert_eq!(a.signature(), b.signature());
    }
}
