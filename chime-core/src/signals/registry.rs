//! Slot registry internals.
//!
//! Implementation details for the signal engine; nothing in this module is
//! meant to be used directly. The public surface is the typed signal
//! façades and the tracker, re-exported from the parent module.
//!
//! # The reentrancy protocol
//!
//! Emission may recursively trigger `connect`, `disconnect`, `clear`, or
//! further `emit` calls on the same signal from within a slot invocation.
//! Erasing registry entries while an emit loop is walking them would shift
//! every later cursor position, so mutation during emission follows a
//! tombstone-and-sweep scheme:
//!
//! 1. `emit` brackets the dispatch loop with a nesting counter
//!    (`begin_emitting` / `end_emitting`).
//!
//! 2. While the counter is nonzero, `disconnect` and `clear` overwrite an
//!    entry's handle with `None` (a tombstone) instead of erasing the entry,
//!    leaving every index stable.
//!
//! 3. When the counter returns to zero, one order-preserving pass sweeps the
//!    tombstoned entries out.
//!
//! The dispatch loop itself never holds the registry lock across a slot
//! invocation: per step it locks, clones the live handle, unlocks, invokes.
//! Slot handles are likewise always dropped outside the lock, so a slot
//! whose captured state re-enters the signal on drop cannot deadlock.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::id::{ConnectionId, SignalId, TrackerId};
use super::slot::SlotHandle;
use super::tracker::TrackerInner;

/// One subscription: a never-reused id plus the slot handle.
///
/// `slot == None` is the tombstone left by a disconnect that happened while
/// an emission was in progress.
struct SlotEntry {
    id: ConnectionId,
    slot: Option<SlotHandle>,
}

/// Registry state guarded by a single lock: the ordered entry sequence and
/// the emission nesting depth that gates physical erasure.
struct RegistryState {
    entries: SmallVec<[SlotEntry; 4]>,
    emit_depth: u32,
}

/// The type-erased slot registry shared by every signal arity.
///
/// A typed signal façade owns one of these through an `Arc`; trackers hold
/// only `Weak` references, so the registry dies exactly when the last signal
/// clone does, and its `Drop` runs the cross-reference teardown protocol.
pub struct SignalCore {
    id: SignalId,
    state: Mutex<RegistryState>,
    /// Trackers observing this signal, notified on destruction.
    trackers: Mutex<HashMap<TrackerId, Weak<TrackerInner>>>,
}

impl SignalCore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            id: SignalId::new(),
            state: Mutex::new(RegistryState {
                entries: SmallVec::new(),
                emit_depth: 0,
            }),
            trackers: Mutex::new(HashMap::new()),
        })
    }

    pub(crate) fn id(&self) -> SignalId {
        self.id
    }

    /// Append a slot at the end of the sequence.
    ///
    /// Appending is safe at any emission depth: an in-progress dispatch loop
    /// re-reads the sequence length each step, so a slot connected during an
    /// emission is visited by that same emission.
    pub(crate) fn connect(&self, slot: SlotHandle) -> ConnectionId {
        let id = ConnectionId::new();
        let live = {
            let mut state = self.state.lock();
            state.entries.push(SlotEntry {
                id,
                slot: Some(slot),
            });
            state.entries.len()
        };
        trace!(signal = ?self.id, connection = ?id, slots = live, "slot connected");
        id
    }

    /// Remove the entry named by `id`.
    ///
    /// Outside emission the entry is erased in place (order-preserving);
    /// during emission it is tombstoned and swept later. An id that is no
    /// longer present is ignored: ids are never reused, so a stale id can
    /// only name an entry that is already gone.
    pub(crate) fn disconnect(&self, id: ConnectionId) {
        let removed = {
            let mut state = self.state.lock();
            let Some(pos) = state.entries.iter().position(|e| e.id == id) else {
                return;
            };
            if state.emit_depth > 0 {
                state.entries[pos].slot.take()
            } else {
                state.entries.remove(pos).slot
            }
        };
        trace!(signal = ?self.id, connection = ?id, "slot disconnected");
        // The handle must not be released under the lock: its destructor may
        // re-enter this signal.
        drop(removed);
    }

    /// Remove every entry, with the same tombstone-vs-erase policy as
    /// [`disconnect`](Self::disconnect).
    pub(crate) fn clear(&self) {
        let removed: SmallVec<[SlotHandle; 4]> = {
            let mut state = self.state.lock();
            if state.emit_depth > 0 {
                state.entries.iter_mut().filter_map(|e| e.slot.take()).collect()
            } else {
                state.entries.drain(..).filter_map(|e| e.slot).collect()
            }
        };
        trace!(signal = ?self.id, dropped = removed.len(), "registry cleared");
        drop(removed);
    }

    /// Number of live (non-tombstoned) entries.
    pub(crate) fn slot_count(&self) -> usize {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|e| e.slot.is_some())
            .count()
    }

    /// Walk the registry in order, invoking `invoke` on every live handle.
    ///
    /// This is the single dispatch loop shared by every signal arity; the
    /// typed façades supply the downcast-and-call closure. The cursor runs
    /// to the sequence length as it stands at each step, so entries appended
    /// mid-emission are visited too.
    pub(crate) fn emit_with<F>(&self, invoke: F)
    where
        F: Fn(&SlotHandle),
    {
        let _guard = EmitGuard::enter(self);
        let mut cursor = 0usize;
        loop {
            let slot = {
                let state = self.state.lock();
                if cursor >= state.entries.len() {
                    break;
                }
                state.entries[cursor].slot.clone()
            };
            if let Some(slot) = slot {
                invoke(&slot);
            }
            cursor += 1;
        }
    }

    fn begin_emitting(&self) {
        let mut state = self.state.lock();
        state.emit_depth += 1;
        trace!(signal = ?self.id, depth = state.emit_depth, "emit begin");
    }

    fn end_emitting(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.emit_depth > 0, "emit depth underflow");
        state.emit_depth -= 1;
        if state.emit_depth == 0 {
            // Tombstones hold no handle (it was dropped at disconnect time),
            // so sweeping the husks under the lock runs no user code.
            let before = state.entries.len();
            state.entries.retain(|e| e.slot.is_some());
            let swept = before - state.entries.len();
            if swept > 0 {
                trace!(signal = ?self.id, swept, "tombstones swept");
            }
        }
        trace!(signal = ?self.id, depth = state.emit_depth, "emit end");
    }

    /// Add a tracker to the set observing this signal. Idempotent.
    pub(crate) fn connect_tracker(&self, id: TrackerId, tracker: Weak<TrackerInner>) {
        self.trackers.lock().insert(id, tracker);
    }

    /// Remove a tracker from the observing set.
    pub(crate) fn disconnect_tracker(&self, id: TrackerId) {
        self.trackers.lock().remove(&id);
    }
}

impl Drop for SignalCore {
    fn drop(&mut self) {
        // Tell every observing tracker this signal is gone, so none of them
        // later tries to disconnect from a freed registry. The tracker must
        // not call back in; `forget_signal` only drops its own mapping.
        let trackers: Vec<Weak<TrackerInner>> =
            self.trackers.get_mut().drain().map(|(_, t)| t).collect();
        for tracker in trackers {
            if let Some(tracker) = tracker.upgrade() {
                tracker.forget_signal(self.id);
            }
        }
        debug!(signal = ?self.id, "signal destroyed");
    }
}

/// Drop guard bracketing one emission, so the depth counter is decremented
/// and the sweep runs even if a slot panics.
struct EmitGuard<'a> {
    core: &'a SignalCore,
}

impl<'a> EmitGuard<'a> {
    fn enter(core: &'a SignalCore) -> Self {
        core.begin_emitting();
        Self { core }
    }
}

impl Drop for EmitGuard<'_> {
    fn drop(&mut self) {
        self.core.end_emitting();
    }
}
