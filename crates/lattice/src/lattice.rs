// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! The bounded product lattice of per-attribute generalization levels.
//!
//! `∏ [minLevel_i, maxLevel_i]`. Each node is a level vector; edges
//! connect nodes differing in exactly one coordinate by one level. Nodes
//! are addressed by a bit-packed [`NodeId`] computed with mixed-radix
//! encoding over the per-attribute ranges, so `NodeId`s are dense and
//! contiguous in `0..total_nodes()`.

use panonym_core::{DataManager, Error as CoreError};

use crate::node::{NodeId, NodeRecord, NodeState};
use crate::Result;

/// The product lattice of per-attribute generalization levels.
pub struct Lattice {
    /// `(min, max)` inclusive bounds per dimension.
    bounds: Vec<(u32, u32)>,
    /// Mixed-radix strides, `strides[i] = ∏_{j<i} (bounds[j].1 - bounds[j].0 + 1)`.
    strides: Vec<usize>,
    total_nodes: usize,
    nodes: Vec<NodeRecord>,
}

impl Lattice {
    /// Builds the lattice from explicit `(min, max)` bounds per attribute.
    pub fn new(bounds: Vec<(u32, u32)>) -> Result<Self> {
        if bounds.is_empty() {
            return Err(CoreError::InvalidConfiguration(
                "lattice requires at least one dimension".into(),
            )
            .into());
        }
        for (i, &(min, max)) in bounds.iter().enumerate() {
            if min > max {
                return Err(CoreError::InvalidConfiguration(format!(
                    "dimension {i}: minLevel {min} > maxLevel {max}"
                ))
                .into());
            }
        }

        let mut strides = Vec::with_capacity(bounds.len());
        let mut total_nodes: usize = 1;
        for &(min, max) in &bounds {
            strides.push(total_nodes);
            total_nodes *= (max - min + 1) as usize;
        }

        Ok(Self {
            bounds,
            strides,
            total_nodes,
            nodes: vec![NodeRecord::default(); total_nodes],
        })
    }

    /// Builds the lattice directly from a [`DataManager`]'s per-QI
    /// `[minLevel, maxLevel]` bounds.
    pub fn from_data_manager(data: &DataManager) -> Result<Self> {
        let bounds = (0..data.n_qi())
            .map(|i| (data.min_level(i) as u32, data.max_level(i) as u32))
            .collect();
        Self::new(bounds)
    }

    /// Number of dimensions, `d`.
    #[inline]
    pub fn n_dims(&self) -> usize {
        self.bounds.len()
    }

    /// Total number of nodes in the lattice, `∏ (max_i - min_i + 1)`.
    #[inline]
    pub fn total_nodes(&self) -> usize {
        self.total_nodes
    }

    /// The lower bound of dimension `i`.
    pub fn min_level(&self, i: usize) -> u32 {
        self.bounds[i].0
    }

    /// The upper bound of dimension `i`.
    pub fn max_level(&self, i: usize) -> u32 {
        self.bounds[i].1
    }

    /// The bottom node: every coordinate at its minimum.
    pub fn bottom(&self) -> NodeId {
        NodeId(0)
    }

    /// The top node: every coordinate at its maximum.
    pub fn top(&self) -> NodeId {
        NodeId((self.total_nodes - 1) as u32)
    }

    /// Decodes `id` back into its level vector.
    pub fn levels(&self, id: NodeId) -> Vec<u32> {
        let mut rest = id.index();
        let mut out = vec![0u32; self.bounds.len()];
        for i in 0..self.bounds.len() {
            let range = (self.bounds[i].1 - self.bounds[i].0 + 1) as usize;
            let coord = rest % range;
            rest /= range;
            out[i] = self.bounds[i].0 + coord as u32;
        }
        out
    }

    /// Encodes a level vector into its [`NodeId`], validating bounds.
    pub fn node_id(&self, levels: &[u32]) -> Result<NodeId> {
        if levels.len() != self.bounds.len() {
            return Err(CoreError::InvalidInput(format!(
                "level vector has {} entries, expected {}",
                levels.len(),
                self.bounds.len()
            ))
            .into());
        }
        let mut id = 0usize;
        for (i, &l) in levels.iter().enumerate() {
            let (min, max) = self.bounds[i];
            if l < min || l > max {
                return Err(CoreError::InvalidInput(format!(
                    "level {l} for dimension {i} out of bounds [{min}, {max}]"
                ))
                .into());
            }
            id += (l - min) as usize * self.strides[i];
        }
        Ok(NodeId(id as u32))
    }

    /// Sum of levels (total generalization level), FLASH's primary
    /// traversal order.
    pub fn total_level(&self, id: NodeId) -> u32 {
        self.levels(id).iter().sum()
    }

    /// Whether `a ≤ b` componentwise, the lattice's partial order.
    pub fn le(&self, a: NodeId, b: NodeId) -> bool {
        let la = self.levels(a);
        let lb = self.levels(b);
        la.iter().zip(lb.iter()).all(|(x, y)| x <= y)
    }

    /// Immediate successors: each dimension bumped by one level, when
    /// that stays within its upper bound.
    pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
        let levels = self.levels(id);
        let mut out = Vec::new();
        for i in 0..levels.len() {
            if levels[i] < self.bounds[i].1 {
                let mut next = levels.clone();
                next[i] += 1;
                out.push(self.node_id(&next).expect("within bounds by construction"));
            }
        }
        out
    }

    /// Immediate predecessors: each dimension dropped by one level, when
    /// that stays within its lower bound.
    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        let levels = self.levels(id);
        let mut out = Vec::new();
        for i in 0..levels.len() {
            if levels[i] > self.bounds[i].0 {
                let mut prev = levels.clone();
                prev[i] -= 1;
                out.push(self.node_id(&prev).expect("within bounds by construction"));
            }
        }
        out
    }

    /// All node ids, grouped by total generalization level, ascending —
    /// FLASH's primary sweep order.
    pub fn nodes_by_total_level(&self) -> Vec<Vec<NodeId>> {
        let max_total: usize = self.bounds.iter().map(|&(_, max)| max as usize).sum();
        let mut buckets = vec![Vec::new(); max_total + 1];
        for idx in 0..self.total_nodes {
            let id = NodeId(idx as u32);
            buckets[self.total_level(id) as usize].push(id);
        }
        buckets
    }

    /// Iterates every node id in ascending id order.
    pub fn iter_all(&self) -> impl Iterator<Item = NodeId> {
        (0..self.total_nodes as u32).map(NodeId)
    }

    /// Current lifecycle state of `id`.
    pub fn state(&self, id: NodeId) -> NodeState {
        self.nodes[id.index()].state
    }

    /// Sets the lifecycle state of `id`.
    pub fn set_state(&mut self, id: NodeId, state: NodeState) {
        self.nodes[id.index()].state = state;
    }

    /// The achieved quality of `id`, if it has been checked.
    pub fn quality(&self, id: NodeId) -> Option<f64> {
        self.nodes[id.index()].quality
    }

    /// Records the achieved quality of `id`.
    pub fn set_quality(&mut self, id: NodeId, quality: f64) {
        self.nodes[id.index()].quality = Some(quality);
    }

    /// The quality lower bound of `id`, if the metric supplied one.
    pub fn lower_bound(&self, id: NodeId) -> Option<f64> {
        self.nodes[id.index()].lower_bound
    }

    /// Records the quality lower bound of `id`.
    pub fn set_lower_bound(&mut self, id: NodeId, bound: f64) {
        self.nodes[id.index()].lower_bound = Some(bound);
    }

    /// Whether History currently holds a snapshot for `id`.
    pub fn has_snapshot(&self, id: NodeId) -> bool {
        self.nodes[id.index()].has_snapshot
    }

    /// Marks whether History currently holds a snapshot for `id`.
    pub fn set_has_snapshot(&mut self, id: NodeId, has: bool) {
        self.nodes[id.index()].has_snapshot = has;
    }

    /// The outlier count from `id`'s last check, if any.
    pub fn outliers(&self, id: NodeId) -> Option<usize> {
        self.nodes[id.index()].outliers
    }

    /// Records the outlier count from checking `id`.
    pub fn set_outliers(&mut self, id: NodeId, outliers: usize) {
        self.nodes[id.index()].outliers = Some(outliers);
    }

    /// Renders the full per-node state table as a serializable snapshot,
    /// for callers that need to draw or report on the whole lattice rather
    /// than just the optimum.
    pub fn annotated_view(&self) -> AnnotatedLattice {
        let nodes = self
            .iter_all()
            .map(|id| AnnotatedNode {
                id,
                levels: self.levels(id),
                state: self.state(id),
                quality: self.quality(id),
                lower_bound: self.lower_bound(id),
                outliers: self.outliers(id),
            })
            .collect();
        AnnotatedLattice { nodes }
    }
}

/// One row of an [`AnnotatedLattice`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnnotatedNode {
    /// The node's identity.
    pub id: NodeId,
    /// The node's level vector.
    pub levels: Vec<u32>,
    /// The node's lifecycle state.
    pub state: NodeState,
    /// Achieved quality, if checked.
    pub quality: Option<f64>,
    /// Quality lower bound, if the metric supplied one.
    pub lower_bound: Option<f64>,
    /// Outlier count from the last check, if any.
    pub outliers: Option<usize>,
}

/// A full, serializable rendering of every node's lifecycle state.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnnotatedLattice {
    /// One entry per node, in ascending [`NodeId`] order.
    pub nodes: Vec<AnnotatedNode>,
}
