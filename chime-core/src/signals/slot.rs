//! Type-erased slot wrappers.
//!
//! The slot registry stores callables of different concrete types in one
//! ordered sequence, yet each must be invoked with typed arguments at emit
//! time. The scheme here is erasure with typed reconstruction:
//!
//! 1. `connect` on a typed signal wraps the user functor in the erased
//!    wrapper for that signal's arity (`ErasedSlot0` .. `ErasedSlot3`).
//!
//! 2. The registry stores the wrapper only as a [`SlotHandle`], an
//!    `Arc<dyn Any + Send + Sync>`, and never looks inside it.
//!
//! 3. `emit` on the same typed signal downcasts each handle back to the
//!    wrapper type and invokes it with concrete arguments. Only the signal
//!    that created a handle ever downcasts it, so the downcast cannot fail.
//!
//! The handle is shared-ownership on purpose: the registry holds one strong
//! reference and the emit loop clones a transient second one, so the
//! registry lock is never held while user code runs.

use std::any::Any;
use std::sync::Arc;

/// Shared-ownership reference to a type-erased slot wrapper.
pub(crate) type SlotHandle = Arc<dyn Any + Send + Sync>;

/// Erased wrapper for a nullary slot.
pub(crate) struct ErasedSlot0 {
    call: Box<dyn Fn() + Send + Sync>,
}

impl ErasedSlot0 {
    pub(crate) fn new<F>(functor: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            call: Box::new(functor),
        }
    }

    pub(crate) fn invoke(&self) {
        (self.call)()
    }
}

/// Erased wrapper for a one-argument slot.
pub(crate) struct ErasedSlot1<A1: 'static> {
    call: Box<dyn Fn(&A1) + Send + Sync>,
}

impl<A1: 'static> ErasedSlot1<A1> {
    pub(crate) fn new<F>(functor: F) -> Self
    where
        F: Fn(&A1) + Send + Sync + 'static,
    {
        Self {
            call: Box::new(functor),
        }
    }

    pub(crate) fn invoke(&self, a1: &A1) {
        (self.call)(a1)
    }
}

/// Erased wrapper for a two-argument slot.
pub(crate) struct ErasedSlot2<A1: 'static, A2: 'static> {
    call: Box<dyn Fn(&A1, &A2) + Send + Sync>,
}

impl<A1: 'static, A2: 'static> ErasedSlot2<A1, A2> {
    pub(crate) fn new<F>(functor: F) -> Self
    where
        F: Fn(&A1, &A2) + Send + Sync + 'static,
    {
        Self {
            call: Box::new(functor),
        }
    }

    pub(crate) fn invoke(&self, a1: &A1, a2: &A2) {
        (self.call)(a1, a2)
    }
}

/// Erased wrapper for a three-argument slot.
pub(crate) struct ErasedSlot3<A1: 'static, A2: 'static, A3: 'static> {
    call: Box<dyn Fn(&A1, &A2, &A3) + Send + Sync>,
}

impl<A1: 'static, A2: 'static, A3: 'static> ErasedSlot3<A1, A2, A3> {
    pub(crate) fn new<F>(functor: F) -> Self
    where
        F: Fn(&A1, &A2, &A3) + Send + Sync + 'static,
    {
        Self {
            call: Box::new(functor),
        }
    }

    pub(crate) fn invoke(&self, a1: &A1, a2: &A2, a3: &A3) {
        (self.call)(a1, a2, a3)
    }
}
