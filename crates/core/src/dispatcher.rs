//! Request dispatcher: decodes, validates, routes, and answers one
//! request at a time against an in-memory event log.

use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::error::DispatchError;
use crate::event::{Action, EventRecord, EventRequest, EventResponse, NewEvent};
use crate::policy;

/// Service name reported by health-check replies.
pub const SERVICE_NAME: &str = "fahrplan";

/// Owns the per-process scheduling state: the append-only event log, the
/// id sequence counter, and the randomness source for offset-based rules.
///
/// One dispatcher processes exactly one request to completion before the
/// next is accepted. The transport's strict request/reply alternation is
/// what serializes access, so no internal locking is needed; a concurrent
/// variant would have to guard the log and the counter.
pub struct Dispatcher<R: Rng = StdRng> {
    events: Vec<EventRecord>,
    next_seq: u32,
    rng: R,
}

impl Dispatcher<StdRng> {
    /// Dispatcher with an OS-seeded randomness source.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for Dispatcher<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Dispatcher<R> {
    /// Dispatcher with a caller-supplied randomness source. Tests seed
    /// this to make appointment/general offsets reproducible.
    pub fn with_rng(rng: R) -> Self {
        Self {
            events: Vec::new(),
            next_seq: 1,
            rng,
        }
    }

    /// Number of events created so far.
    pub fn events_created(&self) -> usize {
        self.events.len()
    }

    /// The append-only event log, oldest first.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Process one raw request payload into a reply payload.
    ///
    /// Total: malformed payloads, validation failures, and unknown
    /// actions all come back as `status: "error"` replies and leave the
    /// event log untouched.
    pub fn dispatch(&mut self, payload: &str) -> EventResponse {
        self.dispatch_at(payload, Local::now())
    }

    /// [`dispatch`](Self::dispatch) with an explicit reference instant.
    pub fn dispatch_at(&mut self, payload: &str, now: DateTime<Local>) -> EventResponse {
        debug!(payload_len = payload.len(), "received request");
        match self.process(payload, now) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "request rejected");
                EventResponse::error(e.to_string())
            }
        }
    }

    fn process(
        &mut self,
        payload: &str,
        now: DateTime<Local>,
    ) -> Result<EventResponse, DispatchError> {
        let request: EventRequest = serde_json::from_str(payload)?;

        match Action::parse(&request.action)? {
            Action::HealthCheck => {
                debug!(events_created = self.events.len(), "health check");
                Ok(EventResponse::healthy(SERVICE_NAME, self.events.len(), now))
            }
            Action::CreateEvent => {
                let event = NewEvent::from_request(&request)?;
                Ok(self.create_event(event, now))
            }
        }
    }

    /// Compute the slot, allocate the next id, and append to the log.
    ///
    /// The sequence counter advances only here, so rejected requests
    /// never consume a number.
    fn create_event(&mut self, event: NewEvent, now: DateTime<Local>) -> EventResponse {
        let slot = policy::schedule(event.kind, now, event.duration_hours, &mut self.rng);

        let id = format!("EVT-{}-{:04}", now.format("%Y%m%d%H%M%S"), self.next_seq);
        self.next_seq += 1;

        let record = EventRecord {
            id,
            name: event.name,
            kind: event.kind,
            start: slot.start,
            end: slot.end,
            created_at: now,
        };

        info!(
            event_id = %record.id,
            kind = %record.kind,
            start = %record.start,
            end = %record.end,
            "event scheduled"
        );

        let response = EventResponse::success(&record, event.duration_hours);
        self.events.push(record);
        response
    }
}
