//! Event model and wire payload types.
//!
//! Requests arrive as loosely-typed JSON ([`EventRequest`]) and are
//! validated into [`NewEvent`] before any scheduling happens. Replies are
//! the [`EventResponse`] enum, tagged by `status` on the wire.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::policy::coerce_duration;

/// `strftime`-style format for the human-readable reply fields.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Scheduling category of an event. Each kind selects one policy rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Meeting,
    Deadline,
    Reminder,
    Appointment,
    General,
}

impl EventKind {
    /// Parse a wire `event_type` value.
    ///
    /// Absent or empty values fall back to [`EventKind::General`]; any
    /// other unrecognized value is a validation error naming it.
    pub fn parse(value: Option<&str>) -> Result<Self, DispatchError> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::General),
            Some("meeting") => Ok(Self::Meeting),
            Some("deadline") => Ok(Self::Deadline),
            Some("reminder") => Ok(Self::Reminder),
            Some("appointment") => Ok(Self::Appointment),
            Some("general") => Ok(Self::General),
            Some(other) => Err(DispatchError::Validation(format!(
                "unknown event_type: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Meeting => write!(f, "meeting"),
            EventKind::Deadline => write!(f, "deadline"),
            EventKind::Reminder => write!(f, "reminder"),
            EventKind::Appointment => write!(f, "appointment"),
            EventKind::General => write!(f, "general"),
        }
    }
}

/// Request verb, parsed from the wire `action` string.
///
/// The rejection arm is explicit so an unrecognized action names itself
/// in the error instead of falling through to a default behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateEvent,
    HealthCheck,
}

impl Action {
    pub fn parse(value: &str) -> Result<Self, DispatchError> {
        match value {
            "create_event" => Ok(Self::CreateEvent),
            "health_check" => Ok(Self::HealthCheck),
            other => Err(DispatchError::UnknownAction(other.to_string())),
        }
    }
}

/// Decoded request payload. Field names match the wire protocol exactly;
/// `event_type` and `duration_hours` stay loosely typed until the
/// dispatcher validates them into a [`NewEvent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRequest {
    pub action: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
}

impl EventRequest {
    /// A `create_event` request.
    pub fn create(
        name: impl Into<String>,
        event_type: Option<String>,
        duration_hours: Option<f64>,
    ) -> Self {
        Self {
            action: "create_event".into(),
            event_name: Some(name.into()),
            event_type,
            duration_hours,
        }
    }

    /// A `health_check` request.
    pub fn health_check() -> Self {
        Self {
            action: "health_check".into(),
            event_name: None,
            event_type: None,
            duration_hours: None,
        }
    }
}

/// A create request after validation: trimmed non-empty name, a known
/// kind, a positive duration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub name: String,
    pub kind: EventKind,
    pub duration_hours: f64,
}

impl NewEvent {
    /// Validate a loosely-typed wire request.
    pub fn from_request(request: &EventRequest) -> Result<Self, DispatchError> {
        let name = request
            .event_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| DispatchError::Validation("event_name is required".into()))?;

        let kind = EventKind::parse(request.event_type.as_deref())?;

        Ok(Self {
            name: name.to_string(),
            kind,
            duration_hours: coerce_duration(request.duration_hours),
        })
    }
}

/// An event recorded in the dispatcher's in-memory log.
///
/// Append-only and never mutated after creation; lives only as long as
/// the process. `end >= start` always holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub name: String,
    pub kind: EventKind,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub created_at: DateTime<Local>,
}

/// Reply payload, tagged by `status` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EventResponse {
    Success {
        event_id: String,
        event_name: String,
        event_type: EventKind,
        timestamp: DateTime<Local>,
        end_timestamp: DateTime<Local>,
        formatted_time: String,
        formatted_end_time: String,
        timezone: String,
        duration_hours: f64,
    },
    Error {
        message: String,
    },
    Healthy {
        service: String,
        events_created: usize,
        timestamp: DateTime<Local>,
    },
}

impl EventResponse {
    /// Build the success payload for a freshly recorded event.
    ///
    /// `duration_hours` is the requested (possibly defaulted) value, which
    /// the reply echoes even when the policy capped the actual slot.
    pub fn success(record: &EventRecord, duration_hours: f64) -> Self {
        Self::Success {
            event_id: record.id.clone(),
            event_name: record.name.clone(),
            event_type: record.kind,
            timestamp: record.start,
            end_timestamp: record.end,
            formatted_time: record.start.format(DISPLAY_FORMAT).to_string(),
            formatted_end_time: record.end.format(DISPLAY_FORMAT).to_string(),
            timezone: "local".into(),
            duration_hours,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn healthy(service: &str, events_created: usize, timestamp: DateTime<Local>) -> Self {
        Self::Healthy {
            service: service.to_string(),
            events_created,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn kind_parse_known_values() {
        assert_eq!(EventKind::parse(Some("meeting")).unwrap(), EventKind::Meeting);
        assert_eq!(EventKind::parse(Some("deadline")).unwrap(), EventKind::Deadline);
        assert_eq!(EventKind::parse(Some("reminder")).unwrap(), EventKind::Reminder);
        assert_eq!(
            EventKind::parse(Some("appointment")).unwrap(),
            EventKind::Appointment
        );
        assert_eq!(EventKind::parse(Some("general")).unwrap(), EventKind::General);
    }

    #[test]
    fn kind_parse_defaults_to_general() {
        assert_eq!(EventKind::parse(None).unwrap(), EventKind::General);
        assert_eq!(EventKind::parse(Some("")).unwrap(), EventKind::General);
        assert_eq!(EventKind::parse(Some("  ")).unwrap(), EventKind::General);
    }

    #[test]
    fn kind_parse_rejects_unknown_naming_it() {
        let err = EventKind::parse(Some("bogus")).unwrap_err();
        assert!(err.to_string().contains("bogus"), "got: {err}");
    }

    #[test]
    fn action_parse_rejects_unknown_naming_it() {
        assert_eq!(Action::parse("create_event").unwrap(), Action::CreateEvent);
        assert_eq!(Action::parse("health_check").unwrap(), Action::HealthCheck);

        let err = Action::parse("delete_event").unwrap_err();
        assert!(err.to_string().contains("delete_event"), "got: {err}");
    }

    #[test]
    fn new_event_requires_nonempty_name() {
        let missing = EventRequest {
            action: "create_event".into(),
            event_name: None,
            event_type: None,
            duration_hours: None,
        };
        let err = NewEvent::from_request(&missing).unwrap_err();
        assert_eq!(err.to_string(), "event_name is required");

        let blank = EventRequest::create("   ", None, None);
        let err = NewEvent::from_request(&blank).unwrap_err();
        assert_eq!(err.to_string(), "event_name is required");
    }

    #[test]
    fn new_event_trims_name_and_defaults() {
        let request = EventRequest::create("  Standup  ", None, None);
        let event = NewEvent::from_request(&request).unwrap();
        assert_eq!(event.name, "Standup");
        assert_eq!(event.kind, EventKind::General);
        assert_eq!(event.duration_hours, 1.0);
    }

    #[test]
    fn request_decodes_with_optional_fields_absent() {
        let request: EventRequest = serde_json::from_str(r#"{"action":"health_check"}"#).unwrap();
        assert_eq!(request.action, "health_check");
        assert!(request.event_name.is_none());
        assert!(request.event_type.is_none());
        assert!(request.duration_hours.is_none());
    }

    #[test]
    fn response_wire_shape() {
        let start = Local.with_ymd_and_hms(2025, 3, 11, 11, 0, 0).unwrap();
        let record = EventRecord {
            id: "EVT-20250311101500-0001".into(),
            name: "Standup".into(),
            kind: EventKind::Meeting,
            start,
            end: start + chrono::Duration::hours(1),
            created_at: start,
        };

        let value = serde_json::to_value(EventResponse::success(&record, 1.0)).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["event_id"], "EVT-20250311101500-0001");
        assert_eq!(value["event_type"], "meeting");
        assert_eq!(value["formatted_time"], "2025-03-11 11:00:00");
        assert_eq!(value["formatted_end_time"], "2025-03-11 12:00:00");
        assert_eq!(value["timezone"], "local");

        let value = serde_json::to_value(EventResponse::error("event_name is required")).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["message"], "event_name is required");

        let value = serde_json::to_value(EventResponse::healthy("fahrplan", 3, start)).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["events_created"], 3);
        assert_eq!(value["service"], "fahrplan");
    }

    #[test]
    fn response_roundtrip() {
        let now = Local.with_ymd_and_hms(2025, 3, 11, 10, 15, 0).unwrap();
        let response = EventResponse::healthy("fahrplan", 7, now);
        let json = serde_json::to_string(&response).unwrap();
        let decoded: EventResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, response);
    }
}
