// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! The top-level `anonymize()` entry point and its result type.

use std::collections::HashSet;

use panonym_core::{AttributeRole, Config, DataManager, Dictionary};
use panonym_engine::{NodeChecker, Predicate, QualityMetric, SamplePredicate};
use panonym_lattice::{AnnotatedLattice, InterruptFlag, Lattice, NodeId};

use crate::flash;
use crate::Result;

/// Everything `anonymize()` returns: the chosen optimal node, its
/// level vector, the anonymized table, the achieved quality score,
/// and the annotated lattice.
pub struct AnonymizeResult {
    /// The optimal node's identity.
    pub optimal_node: NodeId,
    /// The optimal node's level vector.
    pub levels: Vec<u32>,
    /// The achieved quality score (lower is better).
    pub quality: f64,
    /// Rows suppressed at the optimal node.
    pub outliers: usize,
    /// The anonymized table, one decoded row per input row, with
    /// suppression applied to outlier rows and to the configured
    /// attribute roles.
    pub anonymized_rows: Vec<Vec<String>>,
    /// The full per-node state table covering every node visited
    /// during the search.
    pub annotated_lattice: AnnotatedLattice,
}

/// Runs FLASH to completion and builds the full [`AnonymizeResult`].
///
/// `class_predicates`/`sample_predicates`/`quality_metric` are the
/// caller's chosen privacy model and utility metric; those libraries
/// stay external, and this crate only contracts their interface.
pub fn anonymize(
    dict: &Dictionary,
    data: &DataManager,
    config: &Config,
    se_index: Option<usize>,
    mut class_predicates: Vec<Box<dyn Predicate>>,
    sample_predicates: Vec<Box<dyn SamplePredicate>>,
    mut quality_metric: Box<dyn QualityMetric>,
    interrupt: &InterruptFlag,
) -> Result<AnonymizeResult> {
    config.validate(Some(data))?;

    for predicate in &mut class_predicates {
        predicate.initialize(data, config)?;
    }
    quality_metric.initialize(data, config)?;

    let mut lattice = Lattice::from_data_manager(data)?;
    let mut history = panonym_engine::History::new(config);
    let checker = NodeChecker::new(
        data,
        config,
        se_index,
        class_predicates,
        sample_predicates,
        quality_metric,
    );

    let outcome = flash::run(&mut lattice, &checker, &mut history, config, interrupt)?;
    // Re-running `check` at the chosen optimum is cheap (History still
    // holds its snapshot) and is the only place that needs the actual
    // outlier row ids rather than just their count.
    let final_check = checker.check(&mut lattice, &mut history, outcome.optimal_node, interrupt)?;
    let outlier_rows: HashSet<u32> = final_check.outlier_rows.iter().copied().collect();

    let levels_usize: Vec<usize> = outcome.levels.iter().map(|&l| l as usize).collect();
    let anonymized_rows = (0..data.n_rows())
        .map(|row| {
            let suppress_row = outlier_rows.contains(&(row as u32));
            data.decode_row_with(dict, row, |col, id| {
                resolve_cell(data, config, col, row, &levels_usize, suppress_row, id)
            })
            .into_iter()
            .map(str::to_string)
            .collect()
        })
        .collect();

    Ok(AnonymizeResult {
        optimal_node: outcome.optimal_node,
        levels: outcome.levels,
        quality: outcome.quality,
        outliers: outcome.outliers,
        anonymized_rows,
        annotated_lattice: lattice.annotated_view(),
    })
}

/// Resolves the output id for one cell of the anonymized table: `0`
/// (the suppression sentinel) for a suppressed role on an outlier row,
/// the QI's generalized value at the optimum's level for a suppressed
/// QI column, otherwise the original id unchanged.
fn resolve_cell(
    data: &DataManager,
    config: &Config,
    col: usize,
    row: usize,
    levels: &[usize],
    suppress_row: bool,
    id: u32,
) -> u32 {
    let role = column_role(data, col);
    if !config.suppressed_attribute_types.contains(role) {
        return id;
    }
    if suppress_row {
        return 0;
    }
    if let Some(qi) = qi_index_of(data, col) {
        return data.generalize(qi, levels[qi], row);
    }
    id
}

fn column_role(data: &DataManager, col: usize) -> AttributeRole {
    if qi_index_of(data, col).is_some() {
        return AttributeRole::Qi;
    }
    if (0..data.n_se()).any(|se| data.se_column(se) == col) {
        return AttributeRole::Se;
    }
    AttributeRole::Is
}

fn qi_index_of(data: &DataManager, col: usize) -> Option<usize> {
    (0..data.n_qi()).find(|&qi| data.qi_column(qi) == col)
}
