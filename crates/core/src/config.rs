// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Engine configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{DataManager, Error, Result, RoleMask};

/// Recognized configuration options for a search run.
///
/// Deserializes with `#[serde(default)]`, so a caller can supply only the
/// fields they want to override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum outlier fraction, `α ∈ [0, 1)`.
    pub suppression_limit: f64,
    /// Snapshot cache capacity.
    pub history_size: usize,
    /// Admission cap vs. dataset size, `(0, 1)`.
    pub snapshot_size_dataset: f64,
    /// Admission cap vs. ancestor snapshot size, `(0, 1)`.
    pub snapshot_size_snapshot: f64,
    /// String substituted for suppressed values on decode.
    pub suppression_string: String,
    /// Which attribute roles get suppressed in the output.
    pub suppressed_attribute_types: RoleMask,
    /// User opt-in to assume monotonicity for predicates that don't
    /// formally guarantee it.
    pub practical_monotonicity: bool,
    /// Switch Search from optimal to best-effort when the search space
    /// exceeds `heuristic_search_threshold`.
    pub heuristic_search_enabled: bool,
    /// Search-space size threshold that triggers best-effort mode.
    pub heuristic_search_threshold: usize,
    /// Wall-clock budget for best-effort runs, in milliseconds.
    pub heuristic_search_time_limit_ms: u64,
    /// Per-attribute weight in `[0, 1]` consumed by the quality metric,
    /// keyed by attribute name. Missing attributes default to 0.5.
    pub attribute_weights: HashMap<String, f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            suppression_limit: 0.0,
            history_size: 200,
            snapshot_size_dataset: 0.2,
            snapshot_size_snapshot: 0.8,
            suppression_string: "*".to_string(),
            suppressed_attribute_types: RoleMask::default(),
            practical_monotonicity: false,
            heuristic_search_enabled: false,
            heuristic_search_threshold: 100_000,
            heuristic_search_time_limit_ms: 30_000,
            attribute_weights: HashMap::new(),
        }
    }
}

/// Default weight applied to an attribute absent from `attribute_weights`.
pub const DEFAULT_ATTRIBUTE_WEIGHT: f64 = 0.5;

impl Config {
    /// The configured weight for `attribute`, or [`DEFAULT_ATTRIBUTE_WEIGHT`]
    /// if unset.
    pub fn attribute_weight(&self, attribute: &str) -> f64 {
        self.attribute_weights
            .get(attribute)
            .copied()
            .unwrap_or(DEFAULT_ATTRIBUTE_WEIGHT)
    }

    /// The suppression budget in rows, `⌊α·N⌋`.
    pub fn suppression_budget(&self, n_rows: usize) -> usize {
        (self.suppression_limit * n_rows as f64).floor() as usize
    }

    /// Validates the numeric ranges of every field.
    ///
    /// `data` is consulted for the curse-of-dimensionality guard (more
    /// than 15 QIs); [`DataManager::new`] already enforces this bound
    /// structurally, so this check is a belt-and-braces re-validation
    /// for configs built/edited independently of a concrete `DataManager`.
    pub fn validate(&self, data: Option<&DataManager>) -> Result<()> {
        if !(0.0..1.0).contains(&self.suppression_limit) {
            return Err(Error::InvalidConfiguration(format!(
                "suppressionLimit must be in [0, 1), got {}",
                self.suppression_limit
            )));
        }
        if self.history_size == 0 {
            return Err(Error::InvalidConfiguration(
                "historySize must be positive".into(),
            ));
        }
        if self.snapshot_size_dataset <= 0.0 || self.snapshot_size_dataset >= 1.0 {
            return Err(Error::InvalidConfiguration(format!(
                "snapshotSizeDataset must be in (0, 1), got {}",
                self.snapshot_size_dataset
            )));
        }
        if self.snapshot_size_snapshot <= 0.0 || self.snapshot_size_snapshot >= 1.0 {
            return Err(Error::InvalidConfiguration(format!(
                "snapshotSizeSnapshot must be in (0, 1), got {}",
                self.snapshot_size_snapshot
            )));
        }
        for (attr, &w) in &self.attribute_weights {
            if !(0.0..=1.0).contains(&w) {
                return Err(Error::InvalidConfiguration(format!(
                    "attribute weight for '{attr}' must be in [0, 1], got {w}"
                )));
            }
        }
        if let Some(data) = data {
            if data.n_qi() == 0 {
                return Err(Error::InvalidConfiguration(
                    "at least one quasi-identifier is required".into(),
                ));
            }
            if data.n_qi() > crate::MAX_QI_ATTRIBUTES {
                return Err(Error::InvalidConfiguration(format!(
                    "{} quasi-identifiers exceeds the maximum of {}",
                    data.n_qi(),
                    crate::MAX_QI_ATTRIBUTES
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable() {
        let cfg = Config::default();
        assert_eq!(cfg.suppression_limit, 0.0);
        assert_eq!(cfg.history_size, 200);
        assert_eq!(cfg.snapshot_size_dataset, 0.2);
        assert_eq!(cfg.snapshot_size_snapshot, 0.8);
        assert_eq!(cfg.suppression_string, "*");
        assert!(cfg.suppressed_attribute_types.contains(crate::AttributeRole::Qi));
        assert!(!cfg.practical_monotonicity);
        assert_eq!(cfg.heuristic_search_threshold, 100_000);
        assert_eq!(cfg.heuristic_search_time_limit_ms, 30_000);
    }

    #[test]
    fn attribute_weight_defaults_to_half() {
        let cfg = Config::default();
        assert_eq!(cfg.attribute_weight("age"), 0.5);
    }

    #[test]
    fn suppression_limit_of_one_is_rejected() {
        let cfg = Config {
            suppression_limit: 1.0,
            ..Default::default()
        };
        assert!(cfg.validate(None).is_err());
    }

    #[test]
    fn suppression_limit_zero_is_accepted() {
        let cfg = Config {
            suppression_limit: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate(None).is_ok());
    }

    #[test]
    fn suppression_budget_floors() {
        let cfg = Config {
            suppression_limit: 0.25,
            ..Default::default()
        };
        assert_eq!(cfg.suppression_budget(5), 1);
        assert_eq!(cfg.suppression_budget(4), 1);
        assert_eq!(cfg.suppression_budget(3), 0);
    }

    #[test]
    fn rejects_zero_history_size() {
        let cfg = Config {
            history_size: 0,
            ..Default::default()
        };
        assert!(cfg.validate(None).is_err());
    }

    #[test]
    fn rejects_out_of_range_attribute_weight() {
        let mut cfg = Config::default();
        cfg.attribute_weights.insert("age".into(), 1.5);
        assert!(cfg.validate(None).is_err());
    }

    #[test]
    fn rejects_zero_snapshot_size_dataset() {
        // (0, 1) is open at the bottom: 0.0 would disable snapshot
        // admission entirely rather than merely constraining it.
        let cfg = Config {
            snapshot_size_dataset: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate(None).is_err());
    }

    #[test]
    fn rejects_zero_snapshot_size_snapshot() {
        let cfg = Config {
            snapshot_size_snapshot: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate(None).is_err());
    }

    proptest::proptest! {
        #[test]
        fn suppression_budget_never_exceeds_n(
            limit in 0.0f64..1.0,
            n in 0usize..10_000,
        ) {
            let cfg = Config { suppression_limit: limit, ..Default::default() };
            proptest::prop_assert!(cfg.suppression_budget(n) <= n);
        }
    }
}
