// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Predicate and quality-metric contracts.
//!
//! The privacy-model and quality-metric *libraries* stay out of scope;
//! this module is the narrow contract the engine consumes, expressed as
//! a capability-mask style in place of polymorphic inheritance chains —
//! `requirements`/`isMonotonic*` live as data so the Checker can branch
//! on masks rather than types.

use panonym_core::{Config, DataManager};

use crate::groupify::{ClassSummary, GroupifyResult};
use crate::Result;

/// Bitmask of what a predicate needs Groupify to compute per class.
pub mod requirements {
    /// A plain row count per class.
    pub const COUNTER: u8 = 1;
    /// A second counter alongside the primary one (used by predicates
    /// that track, e.g., a suppressed-row count separately).
    pub const SECONDARY_COUNTER: u8 = 2;
    /// A per-class distribution over sensitive values (ℓ-diversity,
    /// t-closeness style predicates).
    pub const DISTRIBUTION: u8 = 4;
}

/// A class-based privacy predicate: evaluated independently on every
/// equivalence class, then combined by logical AND.
pub trait Predicate {
    /// Which [`requirements`] bits this predicate needs Groupify to
    /// populate.
    fn requirements(&self) -> u8;

    /// Whether `class` alone satisfies the predicate.
    fn is_anonymous(&self, class: &ClassSummary) -> bool;

    /// Whether a node satisfying this predicate implies every node
    /// above it (componentwise ≥) also satisfies it.
    fn is_monotonic_with_generalization(&self) -> bool;

    /// Whether suppressing additional rows can only help this predicate
    /// hold (used by the Checker's suppression budget logic).
    fn is_monotonic_with_suppression(&self) -> bool;

    /// The smallest class size this predicate can ever accept, if it
    /// has one uniformly (used by Groupify to flag outlier candidates
    /// early).
    fn minimal_class_size(&self) -> Option<usize>;

    /// Called once before Search begins.
    fn initialize(&mut self, data: &DataManager, config: &Config) -> Result<()>;

    /// Clones this predicate restricted to `subset` (a projection onto a
    /// subset of row ids). `panonym-search` never calls this itself —
    /// post-anonymization local recoding is orchestrated externally —
    /// but the engine still exposes the hook so a local-recoding caller
    /// can re-run a narrower Checker over one partition of the table
    /// without reimplementing this predicate's own state.
    fn clone_for_subset(&self, subset: &[u32]) -> Box<dyn Predicate>;
}

/// A sample-based privacy predicate: evaluated against the whole
/// groupify result rather than class by class.
pub trait SamplePredicate {
    /// Which [`requirements`] bits this predicate needs.
    fn requirements(&self) -> u8;

    /// See [`Predicate::is_monotonic_with_generalization`].
    fn is_monotonic_with_generalization(&self) -> bool;

    /// See [`Predicate::is_monotonic_with_suppression`].
    fn is_monotonic_with_suppression(&self) -> bool;

    /// Evaluates the whole result, optionally naming rows that must be
    /// suppressed for the sample to pass.
    fn evaluate(&self, result: &GroupifyResult) -> SampleVerdict;
}

/// The outcome of evaluating a [`SamplePredicate`].
#[derive(Debug, Clone, Default)]
pub struct SampleVerdict {
    /// Whether the sample (after any suppression named below) is
    /// anonymous.
    pub anonymous: bool,
    /// Rows the predicate additionally insists must be suppressed,
    /// beyond whatever the Checker's own budget already removed.
    pub must_suppress: Option<Vec<u32>>,
}

/// A utility/quality metric.
pub trait QualityMetric {
    /// Called once before Search begins.
    fn initialize(&mut self, data: &DataManager, config: &Config) -> Result<()>;

    /// Scores a groupify result; lower is better throughout this engine
    /// (a "quality loss" convention: the search minimizes this score).
    fn evaluate(&self, result: &GroupifyResult) -> f64;

    /// A lower bound on the achievable score at `node`'s level vector,
    /// if the metric can compute one cheaply without a full check. Used
    /// by Search to order candidates and prune without a full check.
    fn lower_bound(&self, levels: &[u32]) -> Option<f64>;

    /// Whether the metric is monotone with generalization given
    /// `suppression_limit`: coarser nodes never score better. Drives
    /// Search's ancestor/descendant inference when combined with
    /// predicate monotonicity.
    fn is_monotonic(&self, suppression_limit: f64) -> bool;
}
