//! Generic publish/subscribe event bus.
//!
//! The bus decouples "something changed" from "who needs to know" behind a
//! narrow contract: a string event type plus a JSON-serialisable payload.
//! Within one [`LocalBus`] delivery is synchronous and in registration
//! order; an [`InProcessRelay`] additionally fans emissions out to sibling
//! bus instances, crossing the boundary as serialised frames so payloads
//! observe the same round-trip semantics a real transport would impose.
//!
//! The bus carries no domain knowledge. Ticket, chat, or any other domain
//! defines its own event vocabulary on top of [`EventEnvelope`] and decodes
//! only the event types it recognises; unrecognised types pass through
//! untouched.
//!
//! Delivery is best effort: no retention, no replay, no ordering across bus
//! instances. A failing listener is logged and skipped, never surfaced to
//! the emitter.

mod envelope;
mod listener;
mod local;

pub use envelope::EventEnvelope;
pub use listener::{BusListener, EventBus, ListenerError, ListenerGuard};
pub use local::{InProcessRelay, LocalBus};

#[cfg(test)]
mod tests;
