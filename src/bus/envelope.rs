//! Self-describing event wrapper exchanged over the bus.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope carrying one event across the bus.
///
/// Pairs a string event type with an arbitrary JSON payload so unrelated
/// domains can share a single bus; consumers decode only the types they
/// recognise and ignore the rest. The emission timestamp serialises as
/// RFC 3339 text and survives a relay round trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    event_type: String,
    payload: Value,
    emitted_at: DateTime<Utc>,
}

impl EventEnvelope {
    /// Creates an envelope stamped with the current wall-clock time.
    #[must_use]
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
            emitted_at: Utc::now(),
        }
    }

    /// Creates an envelope stamped via the supplied clock.
    #[must_use]
    pub fn with_clock(event_type: impl Into<String>, payload: Value, clock: &impl Clock) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
            emitted_at: clock.utc(),
        }
    }

    /// Returns the event type identifying how to decode the payload.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Returns the JSON payload.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns the instant the envelope was emitted.
    #[must_use]
    pub const fn emitted_at(&self) -> DateTime<Utc> {
        self.emitted_at
    }
}
