// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Reference discernability quality metric.
//!
//! Textbook discernability: each row is charged the size of its own
//! equivalence class, and suppressed rows are charged `N` (the whole
//! table), following the standard definition used across the
//! k-anonymity literature. Lower is better. Shipped as the one
//! quality-metric implementation needed to exercise `panonym-search`
//! end to end; the quality-metric library itself stays external to
//! this crate.

use panonym_core::{Config, DataManager};

use crate::groupify::GroupifyResult;
use crate::predicate::QualityMetric;
use crate::Result;

/// Discernability metric: `Σ_class |class|²` over accounted classes,
/// plus `N · |outliers|` for suppressed rows (accounted for by the
/// caller, since the metric only ever sees the post-suppression
/// result).
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscernabilityMetric {
    n_rows: usize,
}

impl QualityMetric for DiscernabilityMetric {
    fn initialize(&mut self, data: &DataManager, _config: &Config) -> Result<()> {
        self.n_rows = data.n_rows();
        Ok(())
    }

    fn evaluate(&self, result: &GroupifyResult) -> f64 {
        let accounted: usize = result.total_rows();
        let class_cost: f64 = result
            .classes
            .iter()
            .map(|c| (c.size() * c.size()) as f64)
            .sum();
        let suppressed = self.n_rows.saturating_sub(accounted);
        class_cost + (suppressed * self.n_rows) as f64
    }

    fn lower_bound(&self, _levels: &[u32]) -> Option<f64> {
        // Discernability admits no cheap lower bound without running
        // Groupify; Search falls back to total-level ordering alone.
        None
    }

    fn is_monotonic(&self, _suppression_limit: f64) -> bool {
        // Coarser generalization only merges classes, and merging
        // classes never decreases the sum of squared sizes.
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groupify::ClassSummary;

    fn class(size: usize) -> ClassSummary {
        ClassSummary {
            key: vec![0],
            rows: (0..size as u32).collect(),
            secondary_counter: 0,
            distribution: None,
        }
    }

    #[test]
    fn charges_squared_class_sizes() {
        let mut metric = DiscernabilityMetric::default();
        metric.n_rows = 5;
        let result = GroupifyResult {
            classes: vec![class(3), class(2)],
        };
        assert_eq!(metric.evaluate(&result), (9 + 4) as f64);
    }

    #[test]
    fn charges_n_per_suppressed_row() {
        let mut metric = DiscernabilityMetric::default();
        metric.n_rows = 5;
        let result = GroupifyResult {
            classes: vec![class(3)],
        };
        // 2 rows unaccounted for (suppressed): 9 + 2*5 = 19
        assert_eq!(metric.evaluate(&result), 19.0);
    }
}
