// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Groupify, Snapshot History, and the Node Checker: the machinery that
//! turns a lattice node into an anonymity verdict and a quality score.
//!
//! This crate also ships two reference implementations of the
//! predicate/quality-metric contracts it defines ([`kanonymity`],
//! [`diversity`], [`discernibility`]) so the whole vertical stack is
//! testable without a separate privacy-model library.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod checker;
mod discernibility;
mod diversity;
mod error;
mod groupify;
mod kanonymity;
mod predicate;
mod snapshot;

pub use checker::{CheckOutcome, NodeChecker};
pub use discernibility::DiscernabilityMetric;
pub use diversity::LDiversity;
pub use error::{Error, Result};
pub use groupify::{build_from_scratch, build_from_snapshot, ClassSummary, GroupifyResult};
pub use kanonymity::KAnonymity;
pub use predicate::{requirements, Predicate, QualityMetric, SamplePredicate, SampleVerdict};
pub use snapshot::{History, Snapshot, SnapshotRecord};

/// Convenience re-exports for downstream crates.
pub mod prelude {
    pub use crate::{
        CheckOutcome, ClassSummary, DiscernabilityMetric, Error, GroupifyResult, History,
        KAnonymity, LDiversity, NodeChecker, Predicate, QualityMetric, Result, SamplePredicate,
        SampleVerdict, Snapshot,
    };
}
