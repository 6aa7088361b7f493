//! Identifier types for the signal engine.
//!
//! All three identifiers are opaque `u64` values drawn from process-wide
//! atomic counters, so they are unique for the lifetime of the process and
//! never reused. That property is what makes a [`ConnectionId`] safe to hold
//! across sweeps of the slot registry: an id that has been disconnected can
//! never come back naming a different slot.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one signal's slot registry.
///
/// Trackers key their connection map by this value, so two signals always
/// have distinct identities even if one is created at the address of a
/// previously destroyed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(u64);

impl SignalId {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Opaque name for one live entry in one signal's slot registry.
///
/// Returned by `connect`; valid for exactly one `disconnect` (or `leave`),
/// including across intervening emissions of the same signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity of a [`Tracker`](super::Tracker) instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackerId(u64);

impl TrackerId {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_ids_are_unique() {
        let a = SignalId::new();
        let b = SignalId::new();
        let c = SignalId::new();

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn connection_ids_are_unique() {
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        assert_ne!(a, b);
    }

    #[test]
    fn tracker_ids_are_unique() {
        let a = TrackerId::new();
        let b = TrackerId::new();

        assert_ne!(a, b);
    }
}
