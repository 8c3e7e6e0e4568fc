// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Reference `k`-anonymity predicate.
//!
//! Textbook class-based predicate: a class is anonymous iff its size is
//! at least `k`. Shipped so the engine's own Predicate contract is
//! exercised end to end; it is not a stand-in for the privacy-model
//! library this crate otherwise keeps out of scope.

use panonym_core::{Config, DataManager};

use crate::groupify::ClassSummary;
use crate::predicate::{requirements, Predicate};
use crate::Result;

/// `k`-anonymity: every equivalence class must contain at least `k`
/// rows.
#[derive(Debug, Clone, Copy)]
pub struct KAnonymity {
    k: usize,
}

impl KAnonymity {
    /// Builds the predicate for the given `k`.
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    /// The configured `k`.
    pub fn k(&self) -> usize {
        self.k
    }
}

impl Predicate for KAnonymity {
    fn requirements(&self) -> u8 {
        requirements::COUNTER
    }

    fn is_anonymous(&self, class: &ClassSummary) -> bool {
        class.size() >= self.k
    }

    fn is_monotonic_with_generalization(&self) -> bool {
        // Merging classes (generalizing further) only grows them, so a
        // class satisfying the minimum size keeps satisfying it.
        true
    }

    fn is_monotonic_with_suppression(&self) -> bool {
        true
    }

    fn minimal_class_size(&self) -> Option<usize> {
        Some(self.k)
    }

    fn initialize(&mut self, _data: &DataManager, _config: &Config) -> Result<()> {
        Ok(())
    }

    fn clone_for_subset(&self, _subset: &[u32]) -> Box<dyn Predicate> {
        // k-anonymity carries no per-row state; the same k applies to any
        // projection of the table.
        Box::new(*self)
    }
}
