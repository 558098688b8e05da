//! Ticket event vocabulary carried over the event bus.
//!
//! Each lifecycle change is announced as a [`TicketEvent`]: a kind naming
//! what happened plus a full snapshot of the ticket after the change.
//! Events travel as [`EventEnvelope`]s so the bus stays domain-agnostic;
//! [`TicketEvent::from_envelope`] decodes only the ticket vocabulary and
//! leaves foreign event types untouched.

use std::fmt;
use std::sync::Arc;

use mockable::Clock;

use super::error::UnknownEventKindError;
use super::ticket::Ticket;
use crate::bus::{BusListener, EventBus, EventEnvelope, ListenerError, ListenerGuard};

/// Kind of lifecycle change a ticket event announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketEventKind {
    /// A ticket was opened.
    Created,
    /// A ticket was claimed by an assignee.
    Claimed,
    /// A ticket changed in place, including status moves that keep the
    /// same assignee.
    Updated,
    /// A ticket was released back to the waiting queue.
    Abandoned,
}

impl TicketEventKind {
    /// Returns the wire identifier used as the envelope event type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "ticket-created",
            Self::Claimed => "ticket-claimed",
            Self::Updated => "ticket-updated",
            Self::Abandoned => "ticket-abandoned",
        }
    }
}

impl TryFrom<&str> for TicketEventKind {
    type Error = UnknownEventKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "ticket-created" => Ok(Self::Created),
            "ticket-claimed" => Ok(Self::Claimed),
            "ticket-updated" => Ok(Self::Updated),
            "ticket-abandoned" => Ok(Self::Abandoned),
            other => Err(UnknownEventKindError(other.to_owned())),
        }
    }
}

impl fmt::Display for TicketEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One announced lifecycle change with the resulting ticket snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketEvent {
    kind: TicketEventKind,
    ticket: Ticket,
}

impl TicketEvent {
    /// Creates an event announcing `kind` for the given ticket snapshot.
    #[must_use]
    pub const fn new(kind: TicketEventKind, ticket: Ticket) -> Self {
        Self { kind, ticket }
    }

    /// Returns the kind of change announced.
    #[must_use]
    pub const fn kind(&self) -> TicketEventKind {
        self.kind
    }

    /// Returns the ticket snapshot taken after the change.
    #[must_use]
    pub const fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    /// Wraps the event in a bus envelope stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when the ticket snapshot cannot be
    /// serialised.
    pub fn to_envelope(&self) -> Result<EventEnvelope, serde_json::Error> {
        let payload = serde_json::to_value(&self.ticket)?;
        Ok(EventEnvelope::new(self.kind.as_str(), payload))
    }

    /// Wraps the event in a bus envelope stamped via the supplied clock.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when the ticket snapshot cannot be
    /// serialised.
    pub fn to_envelope_with_clock(
        &self,
        clock: &impl Clock,
    ) -> Result<EventEnvelope, serde_json::Error> {
        let payload = serde_json::to_value(&self.ticket)?;
        Ok(EventEnvelope::with_clock(self.kind.as_str(), payload, clock))
    }

    /// Decodes a bus envelope back into a ticket event.
    ///
    /// Returns `Ok(None)` when the envelope carries an event type outside
    /// the ticket vocabulary, so unrelated domains can share the bus.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when the event type is a ticket kind
    /// but the payload does not decode as a ticket snapshot.
    pub fn from_envelope(envelope: &EventEnvelope) -> Result<Option<Self>, serde_json::Error> {
        let Ok(kind) = TicketEventKind::try_from(envelope.event_type()) else {
            return Ok(None);
        };
        let ticket = serde_json::from_value(envelope.payload().clone())?;
        Ok(Some(Self { kind, ticket }))
    }
}

/// Typed consumer of ticket events.
///
/// Every hook defaults to a no-op so implementors override only the kinds
/// they care about.
pub trait TicketEventListener: Send + Sync {
    /// Invoked when a ticket is opened.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the event cannot be processed.
    fn on_ticket_created(&self, ticket: &Ticket) -> Result<(), ListenerError> {
        let _ = ticket;
        Ok(())
    }

    /// Invoked when a ticket is claimed.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the event cannot be processed.
    fn on_ticket_claimed(&self, ticket: &Ticket) -> Result<(), ListenerError> {
        let _ = ticket;
        Ok(())
    }

    /// Invoked when a ticket changes in place.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the event cannot be processed.
    fn on_ticket_updated(&self, ticket: &Ticket) -> Result<(), ListenerError> {
        let _ = ticket;
        Ok(())
    }

    /// Invoked when a ticket is released back to the waiting queue.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the event cannot be processed.
    fn on_ticket_abandoned(&self, ticket: &Ticket) -> Result<(), ListenerError> {
        let _ = ticket;
        Ok(())
    }
}

struct TicketListenerBridge {
    listener: Arc<dyn TicketEventListener>,
}

impl BusListener for TicketListenerBridge {
    fn on_event(&self, envelope: &EventEnvelope) -> Result<(), ListenerError> {
        let event = match TicketEvent::from_envelope(envelope) {
            Ok(Some(event)) => event,
            Ok(None) => return Ok(()),
            Err(err) => {
                tracing::warn!(
                    event_type = %envelope.event_type(),
                    error = %err,
                    "skipping malformed ticket event payload",
                );
                return Ok(());
            }
        };
        match event.kind() {
            TicketEventKind::Created => self.listener.on_ticket_created(event.ticket()),
            TicketEventKind::Claimed => self.listener.on_ticket_claimed(event.ticket()),
            TicketEventKind::Updated => self.listener.on_ticket_updated(event.ticket()),
            TicketEventKind::Abandoned => self.listener.on_ticket_abandoned(event.ticket()),
        }
    }
}

/// Subscribes a typed ticket listener to the given bus.
///
/// The returned guard keeps the subscription alive; dropping it detaches
/// the listener. Envelopes outside the ticket vocabulary are ignored, and
/// a ticket-typed envelope whose payload fails to decode is logged and
/// skipped rather than surfaced.
pub fn subscribe_ticket_listener(
    bus: &dyn EventBus,
    listener: Arc<dyn TicketEventListener>,
) -> ListenerGuard {
    bus.listen(Arc::new(TicketListenerBridge { listener }))
}
