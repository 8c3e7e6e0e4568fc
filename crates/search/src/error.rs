// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Errors for `panonym-search`.

/// One diagnostic candidate reported with [`Error::NoSolution`].
#[derive(Debug, Clone)]
pub struct NoSolutionCandidate {
    /// The candidate's level vector.
    pub levels: Vec<u32>,
    /// Rows suppressed at this candidate.
    pub outliers: usize,
    /// Rows still in offending classes the suppression budget could
    /// not cover — the distance from anonymous.
    pub deficit: usize,
    /// The candidate's quality score.
    pub quality: f64,
}

/// Errors the search algorithm can raise.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Propagated from `panonym-core`.
    #[error(transparent)]
    Core(#[from] panonym_core::Error),

    /// Propagated from `panonym-lattice` (includes `Interrupted`).
    #[error(transparent)]
    Lattice(#[from] panonym_lattice::Error),

    /// Propagated from `panonym-engine`.
    #[error(transparent)]
    Engine(#[from] panonym_engine::Error),

    /// Search completed without finding any anonymous node.
    #[error("no anonymous node found among {} candidate(s) examined", .diagnostics.len())]
    NoSolution {
        /// The closest-to-anonymous nodes, for diagnostics.
        diagnostics: Vec<NoSolutionCandidate>,
    },
}

/// Result type used throughout `panonym-search`.
pub type Result<T> = std::result::Result<T, Error>;
