//! Typed signal façades.
//!
//! A signal is a thin, arity-specific typed surface over one shared
//! [`SignalCore`] registry: `connect` does the type-checked wrap-and-store,
//! `emit` does the type-checked unwrap-and-invoke. Four fixed arities are
//! provided (zero through three arguments); higher arities follow the same
//! pattern. All the registry and reentrancy logic lives in the core and is
//! written exactly once.
//!
//! Arguments are delivered by shared reference, so emission never clones the
//! payload and slots are plain observers: `Fn`, returning nothing.
//!
//! Cloning a signal clones the façade, not the registry: all clones publish
//! to, and are observed through, the same slot sequence. The registry is
//! destroyed when the last clone drops, at which point every tracker still
//! observing it is notified.
//!
//! # Example
//!
//! ```rust
//! use chime_core::signals::Signal1;
//!
//! let sig: Signal1<i32> = Signal1::new();
//! let id = sig.connect(|v: &i32| println!("got {v}"));
//!
//! sig.emit(&42); // prints "got 42"
//! sig.disconnect(id);
//! sig.emit(&7);  // prints nothing
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::id::{ConnectionId, SignalId};
use super::registry::SignalCore;
use super::slot::{ErasedSlot0, ErasedSlot1, ErasedSlot2, ErasedSlot3};

/// Anything with a slot registry: the identity surface trackers need to
/// work across signal arities.
pub trait Source {
    /// Identity of the underlying registry.
    fn id(&self) -> SignalId;

    #[doc(hidden)]
    fn core(&self) -> &Arc<SignalCore>;
}

/// Type-checked connection for one functor type, implemented by each signal
/// arity. This is what lets [`Tracker::join`](super::Tracker::join) accept
/// any signal together with a matching functor.
pub trait Connect<F>: Source {
    /// Wrap `functor` for this signal's argument types and register it.
    fn connect(&self, functor: F) -> ConnectionId;
}

/// A signal delivering no arguments.
pub struct Signal0 {
    core: Arc<SignalCore>,
}

impl Signal0 {
    pub fn new() -> Self {
        Self {
            core: SignalCore::new(),
        }
    }

    /// Register `functor` as a slot; it runs on every subsequent `emit`
    /// until disconnected.
    pub fn connect<F>(&self, functor: F) -> ConnectionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.core.connect(Arc::new(ErasedSlot0::new(functor)))
    }

    /// Synchronously invoke every live slot in registration order.
    pub fn emit(&self) {
        self.core.emit_with(|slot| {
            if let Some(slot) = slot.downcast_ref::<ErasedSlot0>() {
                slot.invoke();
            } else {
                debug_assert!(false, "foreign slot type in registry");
            }
        });
    }

    pub fn disconnect(&self, id: ConnectionId) {
        self.core.disconnect(id);
    }

    pub fn clear(&self) {
        self.core.clear();
    }

    /// Number of currently connected slots.
    pub fn slot_count(&self) -> usize {
        self.core.slot_count()
    }
}

/// A signal delivering one argument by shared reference.
pub struct Signal1<A1: 'static> {
    core: Arc<SignalCore>,
    _marker: PhantomData<fn(&A1)>,
}

impl<A1: 'static> Signal1<A1> {
    pub fn new() -> Self {
        Self {
            core: SignalCore::new(),
            _marker: PhantomData,
        }
    }

    /// Register `functor` as a slot. The argument type is checked at
    /// compile time by the `Fn(&A1)` bound; a functor with the wrong
    /// signature does not get past the type checker.
    pub fn connect<F>(&self, functor: F) -> ConnectionId
    where
        F: Fn(&A1) + Send + Sync + 'static,
    {
        self.core.connect(Arc::new(ErasedSlot1::new(functor)))
    }

    /// Synchronously invoke every live slot in registration order.
    pub fn emit(&self, a1: &A1) {
        self.core.emit_with(|slot| {
            if let Some(slot) = slot.downcast_ref::<ErasedSlot1<A1>>() {
                slot.invoke(a1);
            } else {
                debug_assert!(false, "foreign slot type in registry");
            }
        });
    }

    pub fn disconnect(&self, id: ConnectionId) {
        self.core.disconnect(id);
    }

    pub fn clear(&self) {
        self.core.clear();
    }

    /// Number of currently connected slots.
    pub fn slot_count(&self) -> usize {
        self.core.slot_count()
    }
}

/// A signal delivering two arguments by shared reference.
pub struct Signal2<A1: 'static, A2: 'static> {
    core: Arc<SignalCore>,
    _marker: PhantomData<fn(&A1, &A2)>,
}

impl<A1: 'static, A2: 'static> Signal2<A1, A2> {
    pub fn new() -> Self {
        Self {
            core: SignalCore::new(),
            _marker: PhantomData,
        }
    }

    pub fn connect<F>(&self, functor: F) -> ConnectionId
    where
        F: Fn(&A1, &A2) + Send + Sync + 'static,
    {
        self.core.connect(Arc::new(ErasedSlot2::new(functor)))
    }

    pub fn emit(&self, a1: &A1, a2: &A2) {
        self.core.emit_with(|slot| {
            if let Some(slot) = slot.downcast_ref::<ErasedSlot2<A1, A2>>() {
                slot.invoke(a1, a2);
            } else {
                debug_assert!(false, "foreign slot type in registry");
            }
        });
    }

    pub fn disconnect(&self, id: ConnectionId) {
        self.core.disconnect(id);
    }

    pub fn clear(&self) {
        self.core.clear();
    }

    pub fn slot_count(&self) -> usize {
        self.core.slot_count()
    }
}

/// A signal delivering three arguments by shared reference.
pub struct Signal3<A1: 'static, A2: 'static, A3: 'static> {
    core: Arc<SignalCore>,
    _marker: PhantomData<fn(&A1, &A2, &A3)>,
}

impl<A1: 'static, A2: 'static, A3: 'static> Signal3<A1, A2, A3> {
    pub fn new() -> Self {
        Self {
            core: SignalCore::new(),
            _marker: PhantomData,
        }
    }

    pub fn connect<F>(&self, functor: F) -> ConnectionId
    where
        F: Fn(&A1, &A2, &A3) + Send + Sync + 'static,
    {
        self.core.connect(Arc::new(ErasedSlot3::new(functor)))
    }

    pub fn emit(&self, a1: &A1, a2: &A2, a3: &A3) {
        self.core.emit_with(|slot| {
            if let Some(slot) = slot.downcast_ref::<ErasedSlot3<A1, A2, A3>>() {
                slot.invoke(a1, a2, a3);
            } else {
                debug_assert!(false, "foreign slot type in registry");
            }
        });
    }

    pub fn disconnect(&self, id: ConnectionId) {
        self.core.disconnect(id);
    }

    pub fn clear(&self) {
        self.core.clear();
    }

    pub fn slot_count(&self) -> usize {
        self.core.slot_count()
    }
}

// Clone shares the registry; Default mirrors `new`; Debug reports identity
// and live-slot count. Spelled out per arity, same as the façades above.

impl Clone for Signal0 {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<A1: 'static> Clone for Signal1<A1> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            _marker: PhantomData,
        }
    }
}

impl<A1: 'static, A2: 'static> Clone for Signal2<A1, A2> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            _marker: PhantomData,
        }
    }
}

impl<A1: 'static, A2: 'static, A3: 'static> Clone for Signal3<A1, A2, A3> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            _marker: PhantomData,
        }
    }
}

impl Default for Signal0 {
    fn default() -> Self {
        Self::new()
    }
}

impl<A1: 'static> Default for Signal1<A1> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A1: 'static, A2: 'static> Default for Signal2<A1, A2> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A1: 'static, A2: 'static, A3: 'static> Default for Signal3<A1, A2, A3> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Signal0 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal0")
            .field("id", &self.core.id())
            .field("slot_count", &self.slot_count())
            .finish()
    }
}

impl<A1: 'static> fmt::Debug for Signal1<A1> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal1")
            .field("id", &self.core.id())
            .field("slot_count", &self.slot_count())
            .finish()
    }
}

impl<A1: 'static, A2: 'static> fmt::Debug for Signal2<A1, A2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal2")
            .field("id", &self.core.id())
            .field("slot_count", &self.slot_count())
            .finish()
    }
}

impl<A1: 'static, A2: 'static, A3: 'static> fmt::Debug for Signal3<A1, A2, A3> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal3")
            .field("id", &self.core.id())
            .field("slot_count", &self.slot_count())
            .finish()
    }
}

impl Source for Signal0 {
    fn id(&self) -> SignalId {
        self.core.id()
    }

    fn core(&self) -> &Arc<SignalCore> {
        &self.core
    }
}

impl<A1: 'static> Source for Signal1<A1> {
    fn id(&self) -> SignalId {
        self.core.id()
    }

    fn core(&self) -> &Arc<SignalCore> {
        &self.core
    }
}

impl<A1: 'static, A2: 'static> Source for Signal2<A1, A2> {
    fn id(&self) -> SignalId {
        self.core.id()
    }

    fn core(&self) -> &Arc<SignalCore> {
        &self.core
    }
}

impl<A1: 'static, A2: 'static, A3: 'static> Source for Signal3<A1, A2, A3> {
    fn id(&self) -> SignalId {
        self.core.id()
    }

    fn core(&self) -> &Arc<SignalCore> {
        &self.core
    }
}

impl<F> Connect<F> for Signal0
where
    F: Fn() + Send + Sync + 'static,
{
    fn connect(&self, functor: F) -> ConnectionId {
        Signal0::connect(self, functor)
    }
}

impl<A1: 'static, F> Connect<F> for Signal1<A1>
where
    F: Fn(&A1) + Send + Sync + 'static,
{
    fn connect(&self, functor: F) -> ConnectionId {
        Signal1::connect(self, functor)
    }
}

impl<A1: 'static, A2: 'static, F> Connect<F> for Signal2<A1, A2>
where
    F: Fn(&A1, &A2) + Send + Sync + 'static,
{
    fn connect(&self, functor: F) -> ConnectionId {
        Signal2::connect(self, functor)
    }
}

impl<A1: 'static, A2: 'static, A3: 'static, F> Connect<F> for Signal3<A1, A2, A3>
where
    F: Fn(&A1, &A2, &A3) + Send + Sync + 'static,
{
    fn connect(&self, functor: F) -> ConnectionId {
        Signal3::connect(self, functor)
    }
}
