//! Assembly of outgoing events.
//!
//! The builder owns the per-logger constants (service name, redactor) and
//! turns one logging call into an [`Event`]. Only the data payload goes
//! through redaction; context is operator-supplied and copied as given.

use crate::domain::event::{Event, EventBody, Fields, Level};
use crate::domain::redact::Redactor;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

/// Key used to wrap a context or data value that is not a mapping.
pub const WRAPPED_VALUE_KEY: &str = "value";

/// Builds events for one service.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    service_name: String,
    redactor: Redactor,
}

impl EventBuilder {
    /// Create a builder for `service_name`.
    pub fn new(service_name: impl Into<String>, redactor: Redactor) -> Self {
        Self {
            service_name: service_name.into(),
            redactor,
        }
    }

    /// The service name stamped on every event.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// The redactor applied to event data.
    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    /// Assemble an event.
    ///
    /// `exclude_from_notification` is only meaningful for errors and is
    /// forced to `false` for other levels.
    pub fn build(
        &self,
        level: Level,
        body: EventBody,
        context: Option<Value>,
        data: Option<Value>,
        timestamp: DateTime<Utc>,
        exclude_from_notification: bool,
    ) -> Event {
        let data = into_fields(data);
        if tracing::enabled!(tracing::Level::DEBUG) {
            let redacted = self.redactor.redacted_paths(&Value::Object(data.clone()));
            if !redacted.is_empty() {
                debug!(
                    service = %self.service_name,
                    paths = ?redacted,
                    "redacted event data fields"
                );
            }
        }

        let (message, error_kind, error_message, error_sources) = match body {
            EventBody::Message(message) => (Some(message), None, None, Vec::new()),
            EventBody::Error(info) => {
                let (kind, message, sources) = info.into_parts();
                (None, Some(kind), Some(message), sources)
            }
        };

        Event {
            level,
            service_name: self.service_name.clone(),
            timestamp,
            message,
            error_kind,
            error_message,
            error_sources,
            exclude_from_notification: level == Level::Error && exclude_from_notification,
            context: into_fields(context),
            data: self.redactor.redact_fields(&data),
        }
    }
}

/// Normalize an optional payload into a mapping.
///
/// `None` and `null` become empty, mappings pass through, anything else is
/// wrapped under [`WRAPPED_VALUE_KEY`].
pub fn into_fields(value: Option<Value>) -> Fields {
    match value {
        None | Some(Value::Null) => Fields::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            let mut fields = Fields::new();
            fields.insert(WRAPPED_VALUE_KEY.to_string(), other);
            fields
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::allowlist::AllowList;
    use crate::domain::event::ErrorInfo;
    use crate::domain::redact::REDACTED;
    use serde_json::json;
    use std::sync::Arc;

    fn builder() -> EventBuilder {
        EventBuilder::new(
            "payments",
            Redactor::new(Arc::new(AllowList::new(["id", "status"]))),
        )
    }

    fn ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_info_event() {
        let event = builder().build(
            Level::Info,
            EventBody::Message("charge captured".into()),
            None,
            Some(json!({"id": 7, "card": "4242"})),
            ts(),
            true,
        );

        assert_eq!(event.level, Level::Info);
        assert_eq!(event.service_name, "payments");
        assert_eq!(event.message.as_deref(), Some("charge captured"));
        assert!(event.error_kind.is_none());
        assert!(!event.exclude_from_notification);
        assert_eq!(Value::Object(event.data), json!({"id": 7, "card": REDACTED}));
        assert!(event.context.is_empty());
    }

    #[test]
    fn test_error_event() {
        let info = ErrorInfo::new("TimeoutError", "gateway timed out")
            .with_sources(vec!["connect timeout".into()]);
        let event = builder().build(
            Level::Error,
            EventBody::Error(info),
            Some(json!({"request_id": "r-1"})),
            None,
            ts(),
            true,
        );

        assert!(event.message.is_none());
        assert_eq!(event.error_kind.as_deref(), Some("TimeoutError"));
        assert_eq!(event.error_message.as_deref(), Some("gateway timed out"));
        assert_eq!(event.error_sources, vec!["connect timeout".to_string()]);
        assert!(event.exclude_from_notification);
        assert_eq!(event.timestamp, ts());
    }

    #[test]
    fn test_context_is_not_redacted() {
        let event = builder().build(
            Level::Warning,
            EventBody::Message("retrying".into()),
            Some(json!({"password": "hunter2", "nested": {"token": "t"}})),
            None,
            ts(),
            false,
        );

        assert_eq!(
            Value::Object(event.context),
            json!({"password": "hunter2", "nested": {"token": "t"}})
        );
    }

    #[test]
    fn test_into_fields() {
        assert!(into_fields(None).is_empty());
        assert!(into_fields(Some(Value::Null)).is_empty());
        assert_eq!(
            Value::Object(into_fields(Some(json!({"a": 1})))),
            json!({"a": 1})
        );
        assert_eq!(
            Value::Object(into_fields(Some(json!([1, 2])))),
            json!({"value": [1, 2]})
        );
    }

    #[test]
    fn test_wrapped_scalar_data_is_redacted() {
        let event = builder().build(
            Level::Info,
            EventBody::Message("m".into()),
            None,
            Some(json!("secret")),
            ts(),
            false,
        );

        assert_eq!(Value::Object(event.data), json!({"value": REDACTED}));
    }
}
