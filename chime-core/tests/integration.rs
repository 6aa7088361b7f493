//! Integration tests for the signal/slot engine.
//!
//! These cover the cross-module behavior: signals and trackers destroyed in
//! either order, tracked connections across several signals and arities,
//! and dispatch under reentrant mutation.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use chime_core::signals::{Signal0, Signal1, Signal2, Tracker};

/// Dropping a tracker disconnects every connection it made.
#[test]
fn tracker_drop_disconnects_all_joined_signals() {
    let sig_a: Signal1<i32> = Signal1::new();
    let sig_b: Signal1<i32> = Signal1::new();
    let hits = Arc::new(AtomicI32::new(0));

    {
        let tracker = Tracker::new();
        let hits_clone = hits.clone();
        tracker.join(&sig_a, move |_: &i32| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });
        let hits_clone = hits.clone();
        tracker.join(&sig_b, move |_: &i32| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        sig_a.emit(&0);
        sig_b.emit(&0);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    sig_a.emit(&0);
    sig_b.emit(&0);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(sig_a.slot_count(), 0);
    assert_eq!(sig_b.slot_count(), 0);
}

/// The concrete scenario from the crate docs: join, drop the tracker, and
/// the registry reports zero connected slots.
#[test]
fn tracker_drop_leaves_empty_registry() {
    let sig: Signal1<i32> = Signal1::new();
    let seen = Arc::new(AtomicI32::new(0));

    let tracker = Tracker::new();
    let seen_clone = seen.clone();
    tracker.join(&sig, move |v: &i32| {
        seen_clone.store(*v, Ordering::SeqCst);
    });
    drop(tracker);

    sig.emit(&1);
    assert_eq!(seen.load(Ordering::SeqCst), 0);
    assert_eq!(sig.slot_count(), 0);
}

/// Destroying the signal first: the tracker's mapping disappears without
/// the tracker touching the dead registry, and dropping the tracker
/// afterwards is harmless.
#[test]
fn signal_destroyed_before_tracker() {
    let tracker = Tracker::new();
    let sig: Signal1<i32> = Signal1::new();

    tracker.join(&sig, |_: &i32| {});
    assert_eq!(tracker.tracked_count(), 1);

    drop(sig);
    assert_eq!(tracker.tracked_count(), 0);
    assert!(tracker.is_idle());

    // Nothing left to double-disconnect.
    drop(tracker);
}

/// A signal with several observing trackers notifies all of them on death.
#[test]
fn dying_signal_notifies_every_tracker() {
    let sig: Signal0 = Signal0::new();
    let t1 = Tracker::new();
    let t2 = Tracker::new();

    t1.join(&sig, || {});
    t2.join(&sig, || {});

    drop(sig);
    assert!(t1.is_idle());
    assert!(t2.is_idle());
}

/// A tracker spanning a dead and a live signal still tears the live one
/// down correctly.
#[test]
fn leave_all_with_partially_dead_signals() {
    let tracker = Tracker::new();
    let dead: Signal0 = Signal0::new();
    let live: Signal0 = Signal0::new();

    tracker.join(&dead, || {});
    tracker.join(&live, || {});

    drop(dead);
    assert_eq!(tracker.tracked_count(), 1);

    tracker.leave_all();
    assert!(tracker.is_idle());
    assert_eq!(live.slot_count(), 0);
}

/// Signal clones share one registry; the tracker survives any one clone
/// dropping and is only notified when the last clone goes.
#[test]
fn registry_dies_with_the_last_signal_clone() {
    let tracker = Tracker::new();
    let sig: Signal0 = Signal0::new();
    let clone = sig.clone();

    tracker.join(&sig, || {});

    drop(sig);
    assert_eq!(tracker.tracked_count(), 1);

    drop(clone);
    assert!(tracker.is_idle());
}

/// Ordered delivery across a mixed population of plain and tracked slots.
#[test]
fn plain_and_tracked_slots_interleave_in_registration_order() {
    let sig: Signal0 = Signal0::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    let tracker = Tracker::new();

    let order_clone = order.clone();
    sig.connect(move || order_clone.lock().push("plain-1"));
    let order_clone = order.clone();
    tracker.join(&sig, move || order_clone.lock().push("tracked"));
    let order_clone = order.clone();
    sig.connect(move || order_clone.lock().push("plain-2"));

    sig.emit();
    assert_eq!(*order.lock(), vec!["plain-1", "tracked", "plain-2"]);
}

/// A slot on one signal emitting another signal mid-dispatch.
#[test]
fn slot_emits_a_different_signal() {
    let first: Signal1<i32> = Signal1::new();
    let second: Signal2<i32, i32> = Signal2::new();
    let sums = Arc::new(Mutex::new(Vec::new()));

    let second_clone = second.clone();
    first.connect(move |v: &i32| {
        second_clone.emit(v, &10);
    });
    let sums_clone = sums.clone();
    second.connect(move |a: &i32, b: &i32| {
        sums_clone.lock().push(a + b);
    });

    first.emit(&1);
    first.emit(&2);
    assert_eq!(*sums.lock(), vec![11, 12]);
}

/// A tracked slot that leaves its own tracker while the signal is emitting:
/// the disconnect lands as a tombstone and the tracker ends up idle.
#[test]
fn tracked_slot_leaves_during_emission() {
    let sig: Signal0 = Signal0::new();
    let tracker = Arc::new(Tracker::new());
    let runs = Arc::new(AtomicI32::new(0));

    let tracker_clone = tracker.clone();
    let runs_clone = runs.clone();
    let track_id = Arc::new(Mutex::new(None));
    let track_id_clone = track_id.clone();
    let id = tracker.join(&sig, move || {
        runs_clone.fetch_add(1, Ordering::SeqCst);
        if let Some(id) = *track_id_clone.lock() {
            tracker_clone.leave(id, false);
        }
    });
    *track_id.lock() = Some(id);

    sig.emit();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(tracker.is_idle());
    assert_eq!(sig.slot_count(), 0);

    sig.emit();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

/// Duplicate joins against an already-tracked signal keep working after
/// intervening emissions.
#[test]
fn duplicate_join_survives_emissions() {
    let sig: Signal0 = Signal0::new();
    let tracker = Tracker::new();
    let count = Arc::new(AtomicI32::new(0));

    let count_clone = count.clone();
    tracker.join(&sig, move || {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });
    sig.emit();

    let count_clone = count.clone();
    tracker.join(&sig, move || {
        count_clone.fetch_add(100, Ordering::SeqCst);
    });
    sig.emit();

    // Only the original slot ever runs.
    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert_eq!(sig.slot_count(), 1);
}
