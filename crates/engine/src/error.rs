// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Errors for `panonym-engine`.

/// Errors the engine can raise.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Propagated from `panonym-core`.
    #[error(transparent)]
    Core(#[from] panonym_core::Error),

    /// Propagated from `panonym-lattice` (includes `Interrupted`).
    #[error(transparent)]
    Lattice(#[from] panonym_lattice::Error),

    /// A predicate combination the engine does not implement: e.g.
    /// a predicate that needs more than one sensitive attribute at
    /// once but is given a configuration that does not name which.
    #[error("unsupported predicate configuration: {0}")]
    Unsupported(String),

    /// A class-based or sample-based predicate needed a sensitive
    /// column that the node's `DataManager` does not have.
    #[error("predicate requires a sensitive attribute that is not present")]
    MissingSensitiveAttribute,
}

/// Result type used throughout `panonym-engine`.
pub type Result<T> = std::result::Result<T, Error>;
