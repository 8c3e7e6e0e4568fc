// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Error types shared by every layer of the search engine.

/// Errors raised while configuring or feeding data into the engine.
///
/// Validation errors (`InvalidConfiguration`, `InvalidHierarchy`,
/// `InvalidInput`) always surface before any search work begins, per the
/// propagation policy: the engine leaves no state behind on these paths.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Bad numeric ranges, more than 15 QIs, zero QIs, a predicate missing
    /// its required sensitive attribute, or conflicting predicate subsets.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A non-monotone hierarchy, or `minLevel`/`maxLevel` outside
    /// `[0, height-1]`.
    #[error("invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// Unknown attribute name, a locked data handle, or mismatched column
    /// counts.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A predicate combination the engine does not implement, e.g.
    /// multiple sensitive attributes under a mode that requires exactly
    /// one.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Result type used throughout `panonym-core`.
pub type Result<T> = std::result::Result<T, Error>;
