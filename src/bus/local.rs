//! In-process bus and the relay that links bus instances together.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use super::envelope::EventEnvelope;
use super::listener::{BusListener, EventBus, ListenerGuard};

/// Recovers the guarded value even when a panicking writer poisoned the
/// lock, so bus bookkeeping stays usable for later emitters.
fn read_recovered<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_recovered<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone)]
struct ListenerEntry {
    id: u64,
    listener: Arc<dyn BusListener>,
}

#[derive(Default)]
struct BusState {
    next_listener_id: AtomicU64,
    listeners: RwLock<Vec<ListenerEntry>>,
    relay_seat: RwLock<Option<RelaySeat>>,
}

impl BusState {
    fn dispatch(&self, envelope: &EventEnvelope) {
        // Dispatch runs on a snapshot of the registry so callbacks may
        // register or detach listeners without deadlocking.
        let listeners = read_recovered(&self.listeners).clone();
        if listeners.is_empty() {
            tracing::debug!(
                event_type = %envelope.event_type(),
                "emitted event had no listeners",
            );
            return;
        }
        for entry in listeners {
            if let Err(err) = entry.listener.on_event(envelope) {
                tracing::warn!(
                    event_type = %envelope.event_type(),
                    listener = entry.id,
                    error = %err,
                    "event listener failed",
                );
            }
        }
    }

    fn forward(&self, envelope: &EventEnvelope) {
        let Some(seat) = read_recovered(&self.relay_seat).clone() else {
            return;
        };
        match serde_json::to_string(envelope) {
            Ok(frame) => seat.relay.broadcast(seat.member_id, &frame),
            Err(err) => {
                tracing::warn!(
                    event_type = %envelope.event_type(),
                    error = %err,
                    "failed to encode relay frame",
                );
            }
        }
    }
}

/// Synchronous in-process event bus.
///
/// Listeners run on the emitting thread in registration order. A listener
/// failure is logged and skipped; it never stops later listeners and never
/// reaches the emitter. Clones share one listener registry.
#[derive(Clone, Default)]
pub struct LocalBus {
    state: Arc<BusState>,
}

impl LocalBus {
    /// Creates a bus with no listeners and no relay attachment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many listeners are currently registered.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        read_recovered(&self.state.listeners).len()
    }
}

impl EventBus for LocalBus {
    fn emit(&self, envelope: EventEnvelope) {
        self.state.dispatch(&envelope);
        self.state.forward(&envelope);
    }

    fn listen(&self, listener: Arc<dyn BusListener>) -> ListenerGuard {
        let id = self.state.next_listener_id.fetch_add(1, Ordering::Relaxed);
        write_recovered(&self.state.listeners).push(ListenerEntry { id, listener });
        let state = Arc::downgrade(&self.state);
        ListenerGuard::new(move || {
            if let Some(bus) = state.upgrade() {
                write_recovered(&bus.listeners).retain(|entry| entry.id != id);
            }
        })
    }
}

impl fmt::Debug for LocalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBus")
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
struct RelaySeat {
    relay: Arc<RelayState>,
    member_id: u64,
}

struct RelayMember {
    id: u64,
    bus: Weak<BusState>,
}

#[derive(Default)]
struct RelayState {
    next_member_id: AtomicU64,
    members: RwLock<Vec<RelayMember>>,
}

impl RelayState {
    fn register(&self, bus: Weak<BusState>) -> u64 {
        let id = self.next_member_id.fetch_add(1, Ordering::Relaxed);
        let mut members = write_recovered(&self.members);
        members.retain(|member| member.bus.strong_count() > 0);
        members.push(RelayMember { id, bus });
        id
    }

    fn deregister(&self, member_id: u64) {
        write_recovered(&self.members).retain(|member| member.id != member_id);
    }

    /// Decodes the frame once and hands it to every live member except the
    /// originating bus. Received envelopes are dispatched locally only, so
    /// a relayed frame is never relayed a second time.
    fn broadcast(&self, origin: u64, frame: &str) {
        let envelope = match serde_json::from_str::<EventEnvelope>(frame) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(error = %err, "discarding undecodable relay frame");
                return;
            }
        };
        let targets: Vec<Weak<BusState>> = read_recovered(&self.members)
            .iter()
            .filter(|member| member.id != origin)
            .map(|member| Weak::clone(&member.bus))
            .collect();
        let mut saw_dead = false;
        for target in targets {
            let Some(bus) = target.upgrade() else {
                saw_dead = true;
                continue;
            };
            bus.dispatch(&envelope);
        }
        if saw_dead {
            write_recovered(&self.members).retain(|member| member.bus.strong_count() > 0);
        }
    }
}

/// Fan-out link between bus instances in the same process.
///
/// Every envelope emitted on an attached bus is serialised to a JSON frame
/// and re-dispatched on all other attached buses, standing in for the
/// cross-instance transport of a deployed system. The origin bus never
/// re-receives its own frame.
#[derive(Clone, Default)]
pub struct InProcessRelay {
    state: Arc<RelayState>,
}

impl InProcessRelay {
    /// Creates a relay with no attached buses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a bus to the relay, replacing any previous attachment the
    /// bus held.
    ///
    /// The relay keeps only a weak reference, so dropping every handle to
    /// a bus detaches it automatically.
    pub fn attach(&self, bus: &LocalBus) {
        let member_id = self.state.register(Arc::downgrade(&bus.state));
        let seat = RelaySeat {
            relay: Arc::clone(&self.state),
            member_id,
        };
        if let Some(previous) = write_recovered(&bus.state.relay_seat).replace(seat) {
            previous.relay.deregister(previous.member_id);
        }
    }

    /// Returns how many attached buses are still alive.
    #[must_use]
    pub fn member_count(&self) -> usize {
        read_recovered(&self.state.members)
            .iter()
            .filter(|member| member.bus.strong_count() > 0)
            .count()
    }
}

impl fmt::Debug for InProcessRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InProcessRelay")
            .field("members", &self.member_count())
            .finish_non_exhaustive()
    }
}
