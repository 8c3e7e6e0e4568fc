// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Node identity and lifecycle state.

use serde::Serialize;

/// A dense, bit-packed identity for a lattice node. Stable for the
/// lifetime of the owning [`crate::Lattice`]; never reused across
/// lattices with different bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The raw index into the lattice's arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node's position in the FLASH lifecycle.
///
/// From `Unvisited` a node moves to exactly one of the `Checked-*` or
/// `Inferred-*` states; `Checked-*` is terminal. `Pruned` marks a node
/// FLASH determined cannot beat the current best without needing to
/// classify its anonymity at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum NodeState {
    /// Not yet visited by Search.
    #[default]
    Unvisited,
    /// The Checker evaluated this node directly and found it anonymous.
    CheckedAnonymous,
    /// The Checker evaluated this node directly and found it not
    /// anonymous.
    CheckedNonAnonymous,
    /// Inferred anonymous from an ancestor's `CheckedAnonymous` result
    /// (generalizing further than an already-anonymous node can only
    /// stay anonymous), without being checked directly.
    InferredAnonymous,
    /// Inferred not anonymous from a descendant's `CheckedNonAnonymous`
    /// result (generalizing less than an already-non-anonymous node
    /// can only stay non-anonymous), without being checked directly.
    InferredNonAnonymous,
    /// Determined unreachable-as-optimum without classification.
    Pruned,
}

impl NodeState {
    /// Whether this state resulted from actually running the Checker
    /// (`Checked-*`), as opposed to being inferred or pruned.
    pub fn is_checked(self) -> bool {
        matches!(self, Self::CheckedAnonymous | Self::CheckedNonAnonymous)
    }

    /// Whether this state (checked or inferred) counts as anonymous.
    pub fn is_anonymous(self) -> bool {
        matches!(self, Self::CheckedAnonymous | Self::InferredAnonymous)
    }

    /// Whether Search still needs to visit this node, i.e. it carries no
    /// anonymity verdict yet.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Unvisited)
    }
}

/// Per-node bookkeeping carried by the lattice arena.
#[derive(Debug, Clone, Default)]
pub(crate) struct NodeRecord {
    pub state: NodeState,
    /// Achieved quality, set once the node is `Checked-*`.
    pub quality: Option<f64>,
    /// Lower bound on quality, set when the metric supports it (used to
    /// order candidates and prune without a full check).
    pub lower_bound: Option<f64>,
    /// Whether a snapshot for this node is currently held by History.
    pub has_snapshot: bool,
    /// Outlier count from the last check, if any.
    pub outliers: Option<usize>,
}
