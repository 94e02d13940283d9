//! Wire representation of an event.

use crate::domain::event::{Event, Fields, Level};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One ingest document, borrowed from an [`Event`].
///
/// Field names follow the dataset schema: underscore-prefixed keys are
/// metadata, `event` carries the redacted payload.
#[derive(Debug, Serialize)]
pub struct IngestDocument<'a> {
    #[serde(rename = "_time")]
    time: DateTime<Utc>,
    level: &'static str,
    #[serde(rename = "_service")]
    service: &'a str,
    #[serde(rename = "_type")]
    event_type: &'static str,
    #[serde(
        rename = "_excludeFromSlackNotification",
        skip_serializing_if = "Option::is_none"
    )]
    exclude_from_notification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<&'a str>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    error_sources: &'a [String],
    context: &'a Fields,
    event: &'a Fields,
}

impl<'a> From<&'a Event> for IngestDocument<'a> {
    fn from(event: &'a Event) -> Self {
        Self {
            time: event.timestamp,
            level: event.level.as_str(),
            service: &event.service_name,
            event_type: event.event_type(),
            exclude_from_notification: (event.level == Level::Error)
                .then_some(event.exclude_from_notification),
            message: event.message.as_deref(),
            error_kind: event.error_kind.as_deref(),
            error_message: event.error_message.as_deref(),
            error_sources: &event.error_sources,
            context: &event.context,
            event: &event.data,
        }
    }
}
