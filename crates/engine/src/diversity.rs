// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Reference ℓ-diversity predicate.
//!
//! Distinct-ℓ-diversity: every equivalence class must contain at least
//! `l` distinct sensitive values. Like [`crate::kanonymity::KAnonymity`]
//! this is a textbook implementation shipped for testability, not the
//! privacy-model library this crate otherwise keeps external.

use panonym_core::{Config, DataManager};

use crate::groupify::ClassSummary;
use crate::predicate::{requirements, Predicate};
use crate::Result;

/// Distinct ℓ-diversity over one sensitive attribute.
#[derive(Debug, Clone, Copy)]
pub struct LDiversity {
    l: usize,
}

impl LDiversity {
    /// Builds the predicate for the given `l`.
    pub fn new(l: usize) -> Self {
        Self { l }
    }
}

impl Predicate for LDiversity {
    fn requirements(&self) -> u8 {
        requirements::DISTRIBUTION
    }

    fn is_anonymous(&self, class: &ClassSummary) -> bool {
        class
            .distribution
            .as_ref()
            .map(|d| d.len() >= self.l)
            .unwrap_or(false)
    }

    fn is_monotonic_with_generalization(&self) -> bool {
        // Merging classes can only add distinct sensitive values, never
        // remove one, so satisfying ℓ is preserved under generalization.
        true
    }

    fn is_monotonic_with_suppression(&self) -> bool {
        true
    }

    fn minimal_class_size(&self) -> Option<usize> {
        Some(self.l)
    }

    fn initialize(&mut self, _data: &DataManager, _config: &Config) -> Result<()> {
        Ok(())
    }

    fn clone_for_subset(&self, _subset: &[u32]) -> Box<dyn Predicate> {
        // The required `l` is a property of the predicate, not of which
        // rows it is evaluated over.
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashMap;

    fn class(values: &[u32]) -> ClassSummary {
        let mut dist = AHashMap::default();
        for &v in values {
            *dist.entry(v).or_insert(0usize) += 1;
        }
        ClassSummary {
            key: vec![0],
            rows: (0..values.len() as u32).collect(),
            secondary_counter: 0,
            distribution: Some(dist),
        }
    }

    #[test]
    fn requires_distinct_sensitive_values() {
        let p = LDiversity::new(2);
        assert!(!p.is_anonymous(&class(&[1, 1, 1])));
        assert!(p.is_anonymous(&class(&[1, 2])));
    }

    #[test]
    fn missing_distribution_is_not_anonymous() {
        let p = LDiversity::new(2);
        let class = ClassSummary {
            key: vec![0],
            rows: vec![0, 1],
            secondary_counter: 0,
            distribution: None,
        };
        assert!(!p.is_anonymous(&class));
    }

    #[test]
    fn clone_for_subset_preserves_l() {
        let p = LDiversity::new(2);
        let cloned = p.clone_for_subset(&[0, 1]);
        assert!(!cloned.is_anonymous(&class(&[1, 1])));
        assert!(cloned.is_anonymous(&class(&[1, 2])));
    }
}
