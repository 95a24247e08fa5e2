//! Scoped replacement of a mutable binding with guaranteed restoration
//!
//! A [`Patchable`] is a named slot holding the "current" implementation of
//! some dependency (a value, a closure, a trait object). Production code
//! reads through [`Patchable::get`]; a test swaps a stand-in via
//! [`Patchable::patch`] and receives a [`PatchGuard`] that restores the
//! previous value when dropped, even during panic unwinding, so no test can
//! leak its stand-in into a sibling.
//!
//! Nested patches restore correctly when guards drop in LIFO order, which
//! falls out of normal scoping.
//!
//! # Examples
//!
//! ```
//! use testrig_core::double::patch::Patchable;
//!
//! let greeting = Patchable::new("greeting", String::from("hello"));
//! {
//!     let _guard = greeting.patch(String::from("goodbye"));
//!     assert_eq!(*greeting.get(), "goodbye");
//! }
//! // guard dropped: original restored
//! assert_eq!(*greeting.get(), "hello");
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// A named slot whose current value can be temporarily replaced
pub struct Patchable<T: ?Sized> {
    name: Arc<str>,
    slot: Arc<RwLock<Arc<T>>>,
}

impl<T: ?Sized> Clone for Patchable<T> {
    fn clone(&self) -> Self {
        Self { name: Arc::clone(&self.name), slot: Arc::clone(&self.slot) }
    }
}

impl<T: ?Sized> fmt::Debug for Patchable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patchable").field("name", &self.name).finish()
    }
}

impl<T: Send + Sync + 'static> Patchable<T> {
    /// Create a slot with `value` as the value to restore to
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self::from_arc(name, Arc::new(value))
    }

    /// Install `replacement` until the returned guard drops
    pub fn patch(&self, replacement: T) -> PatchGuard<T> {
        self.patch_arc(Arc::new(replacement))
    }
}

impl<T: ?Sized + Send + Sync + 'static> Patchable<T> {
    /// Create a slot from an already-shared value (useful for `dyn Trait`)
    pub fn from_arc(name: impl Into<String>, value: Arc<T>) -> Self {
        Self { name: Arc::from(name.into()), slot: Arc::new(RwLock::new(value)) }
    }

    /// Read the current value of the slot
    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.slot.read())
    }

    /// Install an already-shared replacement until the returned guard drops
    pub fn patch_arc(&self, replacement: Arc<T>) -> PatchGuard<T> {
        let saved = {
            let mut slot = self.slot.write();
            std::mem::replace(&mut *slot, replacement)
        };
        tracing::debug!(binding = %self.name, "patched binding");
        PatchGuard { name: Arc::clone(&self.name), slot: Arc::clone(&self.slot), saved: Some(saved) }
    }
}

/// Restores the value that was current when the patch was installed
///
/// Restoration happens on `Drop`: success, failure, assertion panic, or
/// early return all take the same path.
#[must_use = "dropping the guard immediately undoes the patch"]
pub struct PatchGuard<T: ?Sized> {
    name: Arc<str>,
    slot: Arc<RwLock<Arc<T>>>,
    saved: Option<Arc<T>>,
}

impl<T: ?Sized> Drop for PatchGuard<T> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            *self.slot.write() = saved;
            tracing::debug!(binding = %self.name, "restored binding");
        }
    }
}

impl<T: ?Sized> fmt::Debug for PatchGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchGuard").field("name", &self.name).finish()
    }
}
