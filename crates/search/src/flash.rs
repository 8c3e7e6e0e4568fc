// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! FLASH: a monotonicity-aware sweep of the lattice.
//!
//! Nodes are visited primarily by total generalization level (ascending)
//! and secondarily by a quality-driven tiebreaker. Whenever a node is
//! classified, its verdict propagates to the sub-lattice that
//! monotonicity guarantees shares it, so the Checker is never invoked on
//! those nodes at all.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use panonym_core::Config;
use panonym_engine::{History, NodeChecker};
use panonym_lattice::{InterruptFlag, Lattice, NodeId, NodeState};

use crate::error::NoSolutionCandidate;
use crate::{Error, Result};

/// The chosen optimum, as found by [`run`].
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The optimal node's identity.
    pub optimal_node: NodeId,
    /// The optimal node's level vector.
    pub levels: Vec<u32>,
    /// The optimal node's achieved quality.
    pub quality: f64,
    /// Rows suppressed at the optimal node.
    pub outliers: usize,
}

#[derive(Debug, Clone)]
struct Candidate {
    node: NodeId,
    levels: Vec<u32>,
    quality: f64,
    outliers: usize,
}

/// Compares two candidates: lower quality wins; ties broken by the
/// lexicographically smaller level vector; remaining ties by node id.
fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    a.quality
        .partial_cmp(&b.quality)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.levels.cmp(&b.levels))
        .then_with(|| a.node.cmp(&b.node))
}

/// Drives FLASH over `lattice`, using `checker` (backed by `history`)
/// to classify nodes, honoring `config`'s heuristic-search switch and
/// `interrupt` for cooperative cancellation.
pub fn run(
    lattice: &mut Lattice,
    checker: &NodeChecker,
    history: &mut History,
    config: &Config,
    interrupt: &InterruptFlag,
) -> Result<SearchOutcome> {
    let span = tracing::info_span!("search_run", total_nodes = lattice.total_nodes());
    let _enter = span.enter();

    if config.practical_monotonicity {
        tracing::warn!(
            "practicalMonotonicity asserted: pruning will assume monotonicity even for \
             predicates that do not formally guarantee it"
        );
    }

    // Suppression monotonicity only matters once the suppression budget is
    // actually nonzero; at alpha == 0 no row is ever suppressed, so a
    // predicate's behavior under suppression never comes into play.
    let generalization_monotone = {
        let structurally_monotone = checker.predicates_monotonic_with_generalization()
            && (config.suppression_limit <= 0.0 || checker.predicates_monotonic_with_suppression());
        structurally_monotone || config.practical_monotonicity
    };
    let quality_monotone = checker.quality_is_monotonic() || config.practical_monotonicity;

    let best_effort =
        config.heuristic_search_enabled && lattice.total_nodes() > config.heuristic_search_threshold;
    let deadline = if best_effort {
        Some(Instant::now() + Duration::from_millis(config.heuristic_search_time_limit_ms))
    } else {
        None
    };
    if best_effort {
        tracing::info!(
            threshold = config.heuristic_search_threshold,
            time_limit_ms = config.heuristic_search_time_limit_ms,
            "search space exceeds heuristicSearchThreshold; switching to best-effort mode"
        );
    }

    let mut best: Option<Candidate> = None;
    let mut diagnostics: Vec<NoSolutionCandidate> = Vec::new();

    let buckets = lattice.nodes_by_total_level();
    'sweep: for mut bucket in buckets {
        bucket.sort_by(|&a, &b| {
            let sa = checker.score(&lattice.levels(a)).unwrap_or(f64::INFINITY);
            let sb = checker.score(&lattice.levels(b)).unwrap_or(f64::INFINITY);
            sa.partial_cmp(&sb)
                .unwrap_or(Ordering::Equal)
                .then_with(|| lattice.levels(a).cmp(&lattice.levels(b)))
                .then_with(|| a.cmp(&b))
        });

        for node in bucket {
            if interrupt.is_triggered() {
                return Err(panonym_lattice::Error::Interrupted.into());
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    tracing::warn!("heuristicSearchTimeLimit reached; returning best-effort result");
                    break 'sweep;
                }
            }
            if !lattice.state(node).is_open() {
                continue;
            }

            let levels = lattice.levels(node);
            if let Some(lower_bound) = checker.score(&levels) {
                lattice.set_lower_bound(node, lower_bound);
                if quality_monotone {
                    if let Some(best) = &best {
                        if lower_bound >= best.quality {
                            lattice.set_state(node, NodeState::Pruned);
                            continue;
                        }
                    }
                }
            }

            let outcome = checker.check(lattice, history, node, interrupt)?;
            lattice.set_quality(node, outcome.quality);
            lattice.set_outliers(node, outcome.outliers);
            tracing::debug!(
                ?node,
                levels = ?levels,
                anonymous = outcome.anonymous,
                quality = outcome.quality,
                outliers = outcome.outliers,
                "node checked"
            );

            if outcome.anonymous {
                lattice.set_state(node, NodeState::CheckedAnonymous);
                if generalization_monotone {
                    infer(lattice, node, |l, n| l.successors(n), NodeState::InferredAnonymous);
                }
                let candidate = Candidate {
                    node,
                    levels,
                    quality: outcome.quality,
                    outliers: outcome.outliers,
                };
                let better = match &best {
                    None => true,
                    Some(current) => compare_candidates(&candidate, current) == Ordering::Less,
                };
                if better {
                    best = Some(candidate);
                }
            } else {
                lattice.set_state(node, NodeState::CheckedNonAnonymous);
                diagnostics.push(NoSolutionCandidate {
                    levels: levels.clone(),
                    outliers: outcome.outliers,
                    deficit: outcome.deficit,
                    quality: outcome.quality,
                });
                if generalization_monotone {
                    infer(
                        lattice,
                        node,
                        |l, n| l.predecessors(n),
                        NodeState::InferredNonAnonymous,
                    );
                }
            }
        }
    }

    match best {
        Some(candidate) => Ok(SearchOutcome {
            optimal_node: candidate.node,
            levels: candidate.levels,
            quality: candidate.quality,
            outliers: candidate.outliers,
        }),
        None => {
            diagnostics.sort_by(|a, b| {
                a.deficit
                    .cmp(&b.deficit)
                    .then_with(|| a.levels.iter().sum::<u32>().cmp(&b.levels.iter().sum()))
            });
            diagnostics.truncate(10);
            Err(Error::NoSolution { diagnostics })
        }
    }
}

/// Breadth-first propagates `state` over every node reachable from
/// `start` via `neighbors` (excluding `start` itself), stopping at any
/// node that already carries a non-`Unvisited` state (`Checked-*` is
/// terminal; an already-inferred node's neighborhood was already
/// covered).
fn infer(
    lattice: &mut Lattice,
    start: NodeId,
    neighbors: impl Fn(&Lattice, NodeId) -> Vec<NodeId>,
    state: NodeState,
) {
    let mut frontier = neighbors(lattice, start);
    while let Some(node) = frontier.pop() {
        if !lattice.state(node).is_open() {
            continue;
        }
        lattice.set_state(node, state);
        frontier.extend(neighbors(lattice, node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panonym_core::{AttributeRole as R, Config, DataManager, Dictionary, EncodedTable, Hierarchy};
    use panonym_engine::{DiscernabilityMetric, KAnonymity};

    fn fixture_data() -> DataManager {
        let mut dict = Dictionary::new(1);
        let rows = vec![
            vec!["25".into()],
            vec!["27".into()],
            vec!["29".into()],
            vec!["31".into()],
            vec!["40".into()],
        ];
        let table = EncodedTable::from_rows(&mut dict, &rows).unwrap();
        let levels = vec![vec![0, 1, 2, 3, 4, 5], vec![0, 1, 1, 1, 4, 4]];
        let hierarchy = Hierarchy::from_levels(levels).unwrap();
        DataManager::new(table, &[R::Qi], vec![hierarchy], vec![0], vec![1]).unwrap()
    }

    #[test]
    fn finds_level_one_as_optimum() {
        let data = fixture_data();
        let config = Config::default();
        let mut lattice = Lattice::from_data_manager(&data).unwrap();
        let mut history = History::new(&config);
        let checker = NodeChecker::new(
            &data,
            &config,
            None,
            vec![Box::new(KAnonymity::new(2))],
            vec![],
            Box::new(DiscernabilityMetric::default()),
        );
        let outcome = run(&mut lattice, &checker, &mut history, &config, &InterruptFlag::new())
            .unwrap();
        assert_eq!(outcome.levels, vec![1]);
    }

    #[test]
    fn reports_no_solution_when_nothing_qualifies() {
        let data = fixture_data();
        let config = Config::default();
        let mut lattice = Lattice::from_data_manager(&data).unwrap();
        let mut history = History::new(&config);
        let checker = NodeChecker::new(
            &data,
            &config,
            None,
            vec![Box::new(KAnonymity::new(3))],
            vec![],
            Box::new(DiscernabilityMetric::default()),
        );
        let err = run(&mut lattice, &checker, &mut history, &config, &InterruptFlag::new())
            .unwrap_err();
        assert!(matches!(err, Error::NoSolution { .. }));
    }

    /// Builds a two-QI dataset over a small bitmask hierarchy (level `l`
    /// zeroes out the low `l` bits of each base value, so coarser levels
    /// only ever merge classes, satisfying monotonicity by construction) — enough
    /// structure to exercise a multi-node lattice for the property tests
    /// below without the string-interning machinery of `Dictionary`.
    fn bitmask_hierarchy(bits: u32) -> panonym_core::Hierarchy {
        let cardinality = 1usize << bits;
        let levels: Vec<Vec<u32>> = (0..=bits)
            .map(|l| {
                let mask: u32 = if l == 0 { u32::MAX } else { !((1u32 << l) - 1) };
                (0..cardinality as u32).map(|v| v & mask).collect()
            })
            .collect();
        panonym_core::Hierarchy::from_levels(levels).unwrap()
    }

    fn two_qi_bitmask_data(col0: &[u32], col1: &[u32], bits: u32) -> DataManager {
        let n = col0.len();
        let mut data = Vec::with_capacity(n * 2);
        for i in 0..n {
            data.push(col0[i] % (1 << bits));
            data.push(col1[i] % (1 << bits));
        }
        let table = panonym_core::EncodedTable::from_encoded(data, n, 2).unwrap();
        let h0 = bitmask_hierarchy(bits);
        let h1 = bitmask_hierarchy(bits);
        DataManager::new(
            table,
            &[R::Qi, R::Qi],
            vec![h0, h1],
            vec![0, 0],
            vec![bits as usize, bits as usize],
        )
        .unwrap()
    }

    proptest::proptest! {
        /// No node Search marked `InferredAnonymous` turns out
        /// non-anonymous when force-checked, and no node marked
        /// `InferredNonAnonymous` turns out anonymous —
        /// for `KAnonymity`, which is monotone in both senses, so
        /// ancestor/descendant inference applies.
        #[test]
        fn inferred_states_match_a_forced_check(
            bits in 1u32..3,
            col0 in proptest::collection::vec(0u32..8, 2..12),
            k in 1usize..4,
        ) {
            let bits = bits.max(1);
            let col1: Vec<u32> = col0.iter().map(|&v| v.wrapping_mul(3)).collect();
            let data = two_qi_bitmask_data(&col0, &col1, bits);
            let config = Config::default();
            let mut lattice = Lattice::from_data_manager(&data).unwrap();
            let mut history = History::new(&config);
            let checker = NodeChecker::new(
                &data,
                &config,
                None,
                vec![Box::new(KAnonymity::new(k))],
                vec![],
                Box::new(DiscernabilityMetric::default()),
            );
            let _ = run(&mut lattice, &checker, &mut history, &config, &InterruptFlag::new());

            let nodes: Vec<NodeId> = lattice.iter_all().collect();
            for node in nodes {
                let state = lattice.state(node);
                if state == NodeState::InferredAnonymous || state == NodeState::InferredNonAnonymous {
                    let mut scratch_history = History::new(&config);
                    let outcome = checker
                        .check(&mut lattice, &mut scratch_history, node, &InterruptFlag::new())
                        .unwrap();
                    if state == NodeState::InferredAnonymous {
                        proptest::prop_assert!(outcome.anonymous);
                    } else {
                        proptest::prop_assert!(!outcome.anonymous);
                    }
                }
            }
        }

        /// Two runs over identical input/config produce an identical
        /// optimum, level vector, quality, and outlier count.
        #[test]
        fn repeated_runs_are_deterministic(
            bits in 1u32..3,
            col0 in proptest::collection::vec(0u32..8, 2..12),
            k in 1usize..4,
        ) {
            let bits = bits.max(1);
            let col1: Vec<u32> = col0.iter().map(|&v| v.wrapping_mul(3)).collect();
            let run_once = || {
                let data = two_qi_bitmask_data(&col0, &col1, bits);
                let config = Config::default();
                let mut lattice = Lattice::from_data_manager(&data).unwrap();
                let mut history = History::new(&config);
                let checker = NodeChecker::new(
                    &data,
                    &config,
                    None,
                    vec![Box::new(KAnonymity::new(k))],
                    vec![],
                    Box::new(DiscernabilityMetric::default()),
                );
                run(&mut lattice, &checker, &mut history, &config, &InterruptFlag::new())
                    .ok()
                    .map(|o| (o.levels, o.quality, o.outliers))
            };
            proptest::prop_assert_eq!(run_once(), run_once());
        }
    }
}
