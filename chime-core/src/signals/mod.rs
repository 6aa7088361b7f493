//! Signal/slot engine.
//!
//! This module implements an in-process, type-checked publish/subscribe
//! mechanism: any number of slots (callable subscribers) attach to a signal,
//! and emission delivers arguments synchronously to every attached slot in
//! registration order. Producers of a notification and its consumers never
//! see each other's concrete types.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A signal is the publish endpoint, provided in four fixed arities
//! ([`Signal0`] through [`Signal3`]). `connect` registers a callable whose
//! signature is checked at compile time and returns an opaque
//! [`ConnectionId`]; `emit` walks the slots in registration order.
//!
//! ## Safe mutation during dispatch
//!
//! A slot may disconnect itself, disconnect other slots, connect new ones,
//! clear the signal, or re-enter `emit` from within its own invocation.
//! The registry keeps iteration valid by tombstoning entries instead of
//! erasing them while any emission is in progress, then sweeping the
//! tombstones when the outermost emission ends.
//!
//! ## Trackers
//!
//! A [`Tracker`] records the connections made on behalf of one subscriber
//! and severs all of them when dropped. Signals and trackers notify each
//! other at destruction time, so the two can die in either order without
//! leaving a dangling reference behind.
//!
//! # Implementation Notes
//!
//! Slots are stored type-erased (`Arc<dyn Any>`) and reconstructed to their
//! concrete arity at emit time by the typed signal façade that created them;
//! the registry itself is written once and shared by all arities.

mod id;
pub mod registry;
mod signal;
mod slot;
mod tracker;

pub use id::{ConnectionId, SignalId, TrackerId};
pub use signal::{Connect, Signal0, Signal1, Signal2, Signal3, Source};
pub use tracker::{TrackId, Tracker};
