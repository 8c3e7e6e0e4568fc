// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Cooperative cancellation.
//!
//! A single shared flag polled by Groupify at each class boundary and by
//! Search between node checks. There are no suspension points beyond
//! these explicit polls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply cloneable, thread-shareable cancellation flag.
///
/// Despite the engine running single-threaded and cooperative, the flag
/// itself is `Arc<AtomicBool>` so an embedder can flip it from a signal
/// handler or another thread without taking a lock.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    /// A fresh, not-yet-triggered flag.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Requests cancellation. Idempotent.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_untriggered() {
        assert!(!InterruptFlag::new().is_triggered());
    }

    #[test]
    fn trigger_is_visible_through_clones() {
        let flag = InterruptFlag::new();
        let clone = flag.clone();
        clone.trigger();
        assert!(flag.is_triggered());
    }
}
