// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! The bounded product lattice of per-attribute generalization levels.
//!
//! This crate owns node identity and lifecycle (`NodeId`, `NodeState`),
//! the lattice's successor/predecessor structure, and the cooperative
//! [`InterruptFlag`] shared by Groupify and Search. It knows nothing
//! about table contents, equivalence classes, or the FLASH traversal
//! order itself — those live one layer up in `panonym-engine` and
//! `panonym-search`.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod interrupt;
mod lattice;
mod node;

pub use error::{Error, Result};
pub use interrupt::InterruptFlag;
pub use lattice::{AnnotatedLattice, AnnotatedNode, Lattice};
pub use node::{NodeId, NodeState};

/// Convenience re-exports for downstream crates.
pub mod prelude {
    pub use crate::{
        AnnotatedLattice, AnnotatedNode, Error, InterruptFlag, Lattice, NodeId, NodeState, Result,
    };
}
