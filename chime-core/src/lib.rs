//! Chime Core
//!
//! This crate provides the core dispatch engine for the Chime event
//! toolkit: a synchronous, type-checked signal/slot mechanism in the
//! observer-pattern tradition.
//!
//! - Signals in four fixed arities, with compile-time checked slot
//!   signatures
//! - A slot registry that stays safe under reentrant mutation
//!   (disconnect/connect/clear/emit from inside a slot invocation)
//! - Trackers that automatically disconnect a subscriber's connections at
//!   the end of its life, with signal and tracker destructible in either
//!   order
//!
//! # Example
//!
//! ```rust
//! use chime_core::signals::{Signal1, Tracker};
//!
//! let clicked: Signal1<u32> = Signal1::new();
//!
//! // Plain connection, disconnected by hand.
//! let id = clicked.connect(|button: &u32| {
//!     println!("button {button} clicked");
//! });
//!
//! // Tracked connection, disconnected when the tracker drops.
//! let tracker = Tracker::new();
//! tracker.join(&clicked, |button: &u32| {
//!     println!("tracker saw button {button}");
//! });
//!
//! clicked.emit(&1); // both slots run, in registration order
//! clicked.disconnect(id);
//! drop(tracker);
//! clicked.emit(&2); // nothing runs
//! ```

pub mod signals;
