// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! FLASH traversal of the generalization lattice and the top-level
//! `anonymize()` entry point that wires Dictionary, Data Manager,
//! Lattice, Groupify, History, and the Node Checker together.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod anonymize;
mod error;
mod flash;

pub use anonymize::{anonymize, AnonymizeResult};
pub use error::{Error, NoSolutionCandidate, Result};
pub use flash::SearchOutcome;

/// Convenience re-exports for downstream crates.
pub mod prelude {
    pub use crate::{anonymize, AnonymizeResult, Error, NoSolutionCandidate, Result, SearchOutcome};
}
