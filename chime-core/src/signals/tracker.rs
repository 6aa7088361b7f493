//! Connection lifetime tracking.
//!
//! A [`Tracker`] records the connections made on behalf of one subscriber
//! and severs all of them when it is dropped, so a subscriber object never
//! has to remember its own connection ids, and a signal never has to know
//! the subscriber's type.
//!
//! # Teardown in either order
//!
//! Signals and trackers reference each other, yet neither owns the other:
//! a tracker holds a `Weak` to each joined signal's registry, and each
//! registry holds a `Weak` back to the tracker in its observing set. The
//! cleanup is an explicit notification protocol:
//!
//! - Tracker dies first: `leave_all` disconnects every tracked connection
//!   and removes the tracker from every live signal's observing set.
//!
//! - Signal dies first: the registry's `Drop` calls `forget_signal` on each
//!   observing tracker, which drops its mapping for that signal without
//!   calling back into the dying registry.
//!
//! Either way, no dangling cross-reference survives.

use std::fmt;
use std::sync::{Arc, Weak};

use indexmap::map::Entry;
use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::debug;

use super::id::{ConnectionId, SignalId, TrackerId};
use super::registry::SignalCore;
use super::signal::{Connect, Source};

/// Opaque handle naming one tracked connection, returned by
/// [`Tracker::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackId(SignalId);

/// One tracked connection: which registry, and which entry in it.
struct TrackedConnection {
    core: Weak<SignalCore>,
    connection: ConnectionId,
}

/// Shared tracker state. Signals hold `Weak` references to this so a dying
/// registry can notify the tracker; the [`Tracker`] wrapper owns the only
/// strong reference.
pub(crate) struct TrackerInner {
    id: TrackerId,
    /// At most one tracked connection per distinct signal. An `IndexMap`
    /// keeps join order, which makes `leave_all` teardown deterministic.
    connections: Mutex<IndexMap<SignalId, TrackedConnection>>,
}

impl TrackerInner {
    /// Called by a dying [`SignalCore`]: drop the mapping for that signal
    /// only. Must not call back into the signal and must not touch its
    /// tracker set; the registry is already being destroyed.
    pub(crate) fn forget_signal(&self, signal: SignalId) {
        if self.connections.lock().shift_remove(&signal).is_some() {
            debug!(tracker = ?self.id, signal = ?signal, "dropped mapping for destroyed signal");
        }
    }
}

/// Tracks signal connections for one subscriber and disconnects them all on
/// drop.
///
/// # Example
///
/// ```rust
/// use chime_core::signals::{Signal1, Tracker};
///
/// let sig: Signal1<u32> = Signal1::new();
/// {
///     let tracker = Tracker::new();
///     tracker.join(&sig, |v: &u32| println!("saw {v}"));
///     sig.emit(&1); // prints "saw 1"
/// }
/// sig.emit(&2); // tracker dropped, prints nothing
/// ```
pub struct Tracker {
    inner: Arc<TrackerInner>,
}

impl Tracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                id: TrackerId::new(),
                connections: Mutex::new(IndexMap::new()),
            }),
        }
    }

    pub fn id(&self) -> TrackerId {
        self.inner.id
    }

    /// Connect `functor` to `signal` and track the connection.
    ///
    /// If this tracker already holds a connection to that signal, the
    /// just-made connection is undone and the pre-existing one is kept, so
    /// there is never more than one tracked connection per signal per
    /// tracker. The returned [`TrackId`] names the surviving connection
    /// either way.
    pub fn join<S, F>(&self, signal: &S, functor: F) -> TrackId
    where
        S: Connect<F>,
    {
        let connection = signal.connect(functor);
        let core = signal.core();
        let signal_id = core.id();

        let duplicate = {
            let mut connections = self.inner.connections.lock();
            match connections.entry(signal_id) {
                Entry::Occupied(_) => true,
                Entry::Vacant(vacant) => {
                    vacant.insert(TrackedConnection {
                        core: Arc::downgrade(core),
                        connection,
                    });
                    false
                }
            }
        };

        if duplicate {
            core.disconnect(connection);
            debug!(tracker = ?self.inner.id, signal = ?signal_id, "duplicate join collapsed");
        } else {
            debug!(tracker = ?self.inner.id, signal = ?signal_id, connection = ?connection, "joined signal");
        }

        core.connect_tracker(self.inner.id, Arc::downgrade(&self.inner));
        TrackId(signal_id)
    }

    /// Stop tracking `id` and disconnect the underlying connection.
    ///
    /// With `with_tracker` set, this tracker is also removed from the
    /// signal's observing set; leave it unset when the caller may join the
    /// same signal again. Unknown ids are ignored.
    pub fn leave(&self, id: TrackId, with_tracker: bool) {
        let removed = self.inner.connections.lock().shift_remove(&id.0);
        let Some(tracked) = removed else {
            return;
        };
        if let Some(core) = tracked.core.upgrade() {
            core.disconnect(tracked.connection);
            if with_tracker {
                core.disconnect_tracker(self.inner.id);
            }
        }
        debug!(tracker = ?self.inner.id, signal = ?id.0, "left signal");
    }

    /// Convenience lookup by signal identity; a no-op if the signal is not
    /// tracked here.
    pub fn leave_signal<S: Source>(&self, signal: &S) {
        self.leave(TrackId(signal.id()), false);
    }

    /// Tear down every tracked connection and return to the idle state.
    ///
    /// Reentrancy-safe: each iteration pops the current first remaining
    /// mapping under the lock and tears it down outside the lock, so a slot
    /// destructor that mutates this tracker cannot invalidate the loop.
    pub fn leave_all(&self) {
        loop {
            let next = self.inner.connections.lock().shift_remove_index(0);
            let Some((signal_id, tracked)) = next else {
                break;
            };
            if let Some(core) = tracked.core.upgrade() {
                core.disconnect(tracked.connection);
                core.disconnect_tracker(self.inner.id);
            }
            debug!(tracker = ?self.inner.id, signal = ?signal_id, "left signal");
        }
    }

    /// Number of signals this tracker currently holds a connection to.
    pub fn tracked_count(&self) -> usize {
        self.inner.connections.lock().len()
    }

    pub fn is_idle(&self) -> bool {
        self.tracked_count() == 0
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.leave_all();
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("id", &self.inner.id)
            .field("tracked_count", &self.tracked_count())
            .finish()
    }
}
