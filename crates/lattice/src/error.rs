// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Errors for `panonym-lattice`.

/// Errors the lattice can raise, plus cooperative cancellation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Propagated from `panonym-core` (bad configuration, bad hierarchy,
    /// bad input).
    #[error(transparent)]
    Core(#[from] panonym_core::Error),

    /// Cooperative cancellation was honored; traversal stopped partway
    /// through.
    #[error("interrupted")]
    Interrupted,
}

/// Result type used throughout `panonym-lattice`.
pub type Result<T> = std::result::Result<T, Error>;
