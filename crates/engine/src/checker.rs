// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Node Checker.
//!
//! Evaluates the privacy predicate(s) and the quality metric for one
//! node, orchestrating Groupify and History so that a snapshot from an
//! ancestor is reused whenever one is available.

use ahash::AHashSet;
use panonym_core::{Config, DataManager};
use panonym_lattice::{InterruptFlag, Lattice, NodeId};

use crate::groupify::{self, ClassSummary, GroupifyResult};
use crate::predicate::{Predicate, QualityMetric, SamplePredicate};
use crate::snapshot::{History, Snapshot};
use crate::Result;

/// The result of [`NodeChecker::check`].
#[derive(Debug, Clone, Copy)]
pub struct CheckOutcome {
    /// Whether the node, after suppression, satisfies every predicate.
    pub anonymous: bool,
    /// The quality metric's score for the (post-suppression) result.
    pub quality: f64,
    /// Rows removed from anonymity accounting by suppression.
    pub outliers: usize,
    /// The row ids removed from anonymity accounting by suppression.
    pub outlier_rows: Vec<u32>,
    /// Rows left in offending classes that the suppression budget
    /// could not cover — `0` for an anonymous node, otherwise a measure
    /// of how far the node is from anonymous (used for `NoSolution`
    /// diagnostics when no node in the lattice turns out anonymous).
    pub deficit: usize,
}

/// Evaluates predicates and the quality metric for lattice nodes.
pub struct NodeChecker<'a> {
    data: &'a DataManager,
    config: &'a Config,
    se_index: Option<usize>,
    class_predicates: Vec<Box<dyn Predicate>>,
    sample_predicates: Vec<Box<dyn SamplePredicate>>,
    quality_metric: Box<dyn QualityMetric>,
}

impl<'a> NodeChecker<'a> {
    /// Builds a checker over the given predicate set and quality
    /// metric. `se_index` selects which sensitive column (if any)
    /// feeds distribution-requiring predicates.
    pub fn new(
        data: &'a DataManager,
        config: &'a Config,
        se_index: Option<usize>,
        class_predicates: Vec<Box<dyn Predicate>>,
        sample_predicates: Vec<Box<dyn SamplePredicate>>,
        quality_metric: Box<dyn QualityMetric>,
    ) -> Self {
        Self {
            data,
            config,
            se_index,
            class_predicates,
            sample_predicates,
            quality_metric,
        }
    }

    fn requirements(&self) -> u8 {
        self.class_predicates
            .iter()
            .map(|p| p.requirements())
            .chain(self.sample_predicates.iter().map(|p| p.requirements()))
            .fold(0, |acc, r| acc | r)
    }

    fn is_class_anonymous(&self, class: &ClassSummary) -> bool {
        self.class_predicates.iter().all(|p| p.is_anonymous(class))
    }

    /// Computes Groupify (using History when possible), applies
    /// class-based predicates with the suppression budget, then
    /// sample-based predicates, then the quality metric.
    pub fn check(
        &self,
        lattice: &mut Lattice,
        history: &mut History,
        node: NodeId,
        interrupt: &InterruptFlag,
    ) -> Result<CheckOutcome> {
        let levels = lattice.levels(node);
        let needs = self.requirements();

        let result = {
            let ancestor = history.closest_ancestor(lattice, node);
            match ancestor {
                Some(snapshot) => groupify::build_from_snapshot(self.data, &levels, snapshot, interrupt)?,
                None => {
                    groupify::build_from_scratch(self.data, &levels, self.se_index, needs, interrupt)?
                }
            }
        };

        let snapshot = Snapshot::from_groupify(node, &levels, &result, needs);
        history.put(lattice, self.data.n_rows(), node, snapshot);

        let budget = self.config.suppression_budget(self.data.n_rows());
        let mut offending: Vec<&ClassSummary> = result
            .classes
            .iter()
            .filter(|c| !self.is_class_anonymous(c))
            .collect();
        offending.sort_by_key(ClassSummary::size);

        let mut suppressed: AHashSet<Vec<u32>> = AHashSet::default();
        let mut outlier_rows: Vec<u32> = Vec::new();
        for class in &offending {
            if outlier_rows.len() + class.size() <= budget {
                outlier_rows.extend(class.rows.iter().copied());
                suppressed.insert(class.key.clone());
            }
        }
        let classwise_anonymous = offending.iter().all(|c| suppressed.contains(&c.key));
        let mut deficit: usize = offending
            .iter()
            .filter(|c| !suppressed.contains(&c.key))
            .map(|c| c.size())
            .sum();

        let accounted = GroupifyResult {
            classes: result
                .classes
                .iter()
                .filter(|c| !suppressed.contains(&c.key))
                .cloned()
                .collect(),
        };

        let mut anonymous = classwise_anonymous;
        for predicate in &self.sample_predicates {
            let verdict = predicate.evaluate(&accounted);
            if !verdict.anonymous {
                anonymous = false;
            }
            if let Some(rows) = verdict.must_suppress {
                outlier_rows.extend(rows);
            } else if !verdict.anonymous {
                deficit += 1;
            }
        }

        let quality = self.quality_metric.evaluate(&accounted);
        let outliers = outlier_rows.len();

        Ok(CheckOutcome {
            anonymous,
            quality,
            outliers,
            outlier_rows,
            deficit,
        })
    }

    /// A lower bound on quality, when the metric supports one,
    /// without running a full check.
    pub fn score(&self, levels: &[u32]) -> Option<f64> {
        self.quality_metric.lower_bound(levels)
    }

    /// Whether the configured quality metric is monotone given the
    /// configured suppression limit. Search only trusts `score()` as a
    /// pruning lower bound when this holds.
    pub fn quality_is_monotonic(&self) -> bool {
        self.quality_metric
            .is_monotonic(self.config.suppression_limit)
    }

    /// Whether every class-based predicate is monotone with
    /// generalization — Search can only infer `Inferred-Anonymous`
    /// under this condition.
    pub fn predicates_monotonic_with_generalization(&self) -> bool {
        self.class_predicates
            .iter()
            .all(|p| p.is_monotonic_with_generalization())
            && self
                .sample_predicates
                .iter()
                .all(|p| p.is_monotonic_with_generalization())
    }

    /// Whether every predicate is monotone with suppression — consulted
    /// by Search's ancestor/descendant inference alongside
    /// [`Self::predicates_monotonic_with_generalization`] whenever the
    /// suppression budget is actually nonzero.
    pub fn predicates_monotonic_with_suppression(&self) -> bool {
        self.class_predicates
            .iter()
            .all(|p| p.is_monotonic_with_suppression())
            && self
                .sample_predicates
                .iter()
                .all(|p| p.is_monotonic_with_suppression())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kanonymity::KAnonymity;
    use crate::discernibility::DiscernabilityMetric;
    use panonym_core::{AttributeRole as R, Dictionary, EncodedTable, Hierarchy};

    fn fixture() -> (DataManager, Config) {
        let mut dict = Dictionary::new(1);
        let rows = vec![
            vec!["25".into()],
            vec!["27".into()],
            vec!["29".into()],
            vec!["31".into()],
            vec!["40".into()],
        ];
        let table = EncodedTable::from_rows(&mut dict, &rows).unwrap();
        // id 0 is the suppression sentinel; ids 1..=5 are 25/27/29/31/40.
        // Level 1 groups {25,27,29}->id1 ("<30") and {31,40}->id4 (">=30").
        let levels = vec![vec![0, 1, 2, 3, 4, 5], vec![0, 1, 1, 1, 4, 4]];
        let hierarchy = Hierarchy::from_levels(levels).unwrap();
        let dm = DataManager::new(table, &[R::Qi], vec![hierarchy], vec![0], vec![1]).unwrap();
        (dm, Config::default())
    }

    fn checker<'a>(data: &'a DataManager, config: &'a Config, k: usize) -> NodeChecker<'a> {
        NodeChecker::new(
            data,
            config,
            None,
            vec![Box::new(KAnonymity::new(k))],
            vec![],
            Box::new(DiscernabilityMetric::default()),
        )
    }

    #[test]
    fn k3_alpha0_level1_is_not_anonymous() {
        let (dm, config) = fixture();
        let mut lattice = Lattice::new(vec![(0, 1)]).unwrap();
        let mut history = History::new(&config);
        let c = checker(&dm, &config, 3);
        let node = lattice.node_id(&[1]).unwrap();
        let outcome = c
            .check(&mut lattice, &mut history, node, &InterruptFlag::new())
            .unwrap();
        assert!(!outcome.anonymous);
    }

    #[test]
    fn k2_alpha0_level1_is_anonymous() {
        let (dm, config) = fixture();
        let mut lattice = Lattice::new(vec![(0, 1)]).unwrap();
        let mut history = History::new(&config);
        let c = checker(&dm, &config, 2);
        let node = lattice.node_id(&[1]).unwrap();
        let outcome = c
            .check(&mut lattice, &mut history, node, &InterruptFlag::new())
            .unwrap();
        assert!(outcome.anonymous);
        assert_eq!(outcome.outliers, 0);
    }

    #[test]
    fn k3_alpha_quarter_stays_no_solution() {
        let (dm, mut config) = fixture();
        config.suppression_limit = 0.25; // floor(0.25 * 5) = 1
        let mut lattice = Lattice::new(vec![(0, 1)]).unwrap();
        let mut history = History::new(&config);
        let c = checker(&dm, &config, 3);
        let node = lattice.node_id(&[1]).unwrap();
        let outcome = c
            .check(&mut lattice, &mut history, node, &InterruptFlag::new())
            .unwrap();
        assert!(!outcome.anonymous);
    }

    proptest::proptest! {
        /// Whatever the outcome, the number of rows removed by
        /// suppression never exceeds `floor(alpha * N)`.
        #[test]
        fn suppression_never_exceeds_its_budget(
            alpha in 0.0f64..0.99,
            k in 1usize..6,
            level in 0u32..2,
        ) {
            let (dm, mut config) = fixture();
            config.suppression_limit = alpha;
            let mut lattice = Lattice::new(vec![(0, 1)]).unwrap();
            let mut history = History::new(&config);
            let c = checker(&dm, &config, k);
            let node = lattice.node_id(&[level]).unwrap();
            let outcome = c
                .check(&mut lattice, &mut history, node, &InterruptFlag::new())
                .unwrap();
            let budget = config.suppression_budget(dm.n_rows());
            proptest::prop_assert!(outcome.outliers <= budget);
        }
    }
}
