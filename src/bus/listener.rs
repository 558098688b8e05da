//! Listener contracts and subscription lifetime management.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::EventEnvelope;

/// Failure raised by a listener callback.
///
/// The dispatching bus logs the failure and moves on to the next listener;
/// it never propagates to the emitter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("listener failed: {0}")]
pub struct ListenerError(String);

impl ListenerError {
    /// Creates a listener error carrying the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Callback invoked for every envelope a bus dispatches.
pub trait BusListener: Send + Sync {
    /// Handles one envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the envelope cannot be processed. The
    /// bus logs the failure and continues dispatching to later listeners.
    fn on_event(&self, envelope: &EventEnvelope) -> Result<(), ListenerError>;
}

/// Publish/subscribe contract shared by bus implementations.
///
/// Object safe so services can hold `Arc<dyn EventBus>` and tests can swap
/// implementations freely.
pub trait EventBus: Send + Sync {
    /// Delivers the envelope to every registered listener.
    ///
    /// Emission is infallible from the caller's perspective; listener
    /// failures are contained by the bus.
    fn emit(&self, envelope: EventEnvelope);

    /// Registers a listener for all subsequent emissions.
    ///
    /// The listener stays registered for the lifetime of the returned
    /// guard and is detached when the guard drops.
    fn listen(&self, listener: Arc<dyn BusListener>) -> ListenerGuard;
}

/// Subscription handle that detaches its listener on drop.
#[must_use = "dropping the guard detaches the listener"]
pub struct ListenerGuard {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl ListenerGuard {
    /// Creates a guard running `detach` exactly once when dropped.
    ///
    /// Bus implementations supply the hook that removes the listener from
    /// their registry.
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}
