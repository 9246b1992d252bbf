//! `LazySlot` — at-most-once, fallible, thread-safe lazy initialization.
//!
//! Per-rule derived state (a factory instance, a loaded nested rule set) is
//! expensive and fallible, so it is built on first use behind the classic
//! double-checked discipline: check without the lock, take the lock,
//! re-check, construct, publish. `OnceLock` provides the lock-free fast
//! path and the publish barrier; the `Mutex` serializes construction so at
//! most one builder ever runs to completion.
//!
//! A failed construction publishes nothing — the error propagates to the
//! caller and a later resolution may try again. That matches the resolver's
//! no-retry stance: *this* call fails, the slot stays cold.

use std::fmt;
use std::sync::{Mutex, OnceLock};

pub(crate) struct LazySlot<T> {
    cell: OnceLock<T>,
    init: Mutex<()>,
}

impl<T> LazySlot<T> {
    pub(crate) const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Get the value, constructing it with `build` on first use.
    ///
    /// Exactly one successful `build` ever runs, even under concurrent
    /// first access; every caller then observes the same fully-constructed
    /// value.
    pub(crate) fn get_or_try_init<E>(
        &self,
        build: impl FnOnce() -> Result<T, E>,
    ) -> Result<&T, E> {
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }
        // A poisoned guard only means another builder panicked; the cell is
        // still either empty or fully published, so proceed either way.
        let _guard = self.init.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }
        let value = build()?;
        Ok(self.cell.get_or_init(|| value))
    }

    #[cfg(test)]
    pub(crate) fn initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for LazySlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("LazySlot").field(value).finish(),
            None => f.write_str("LazySlot(<uninit>)"),
        }
    }
}
