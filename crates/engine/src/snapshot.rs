// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Snapshot & Snapshot History.
//!
//! A snapshot is a compact, descendant-reconstructible encoding of a
//! node's groupify result. History is a bounded cache of snapshots
//! keyed by node id, with an admission policy driven by two size
//! ratios and an eviction policy favoring nodes with the most
//! still-unchecked descendants.

use std::collections::HashMap;

use ahash::AHashMap;
use panonym_core::Config;
use panonym_lattice::{Lattice, NodeId};

use crate::groupify::GroupifyResult;

/// One class as carried inside a [`Snapshot`]: the generalized QI tuple
/// at the snapshot's own level, plus whatever counters/distribution the
/// requesting predicate needed.
#[derive(Debug, Clone)]
pub struct SnapshotRecord {
    /// The class's key, generalized to `Snapshot::levels`.
    pub key: Vec<u32>,
    /// Row ids in the class, insertion order preserved.
    pub rows: Vec<u32>,
    /// Secondary counter, `0` if not requested.
    pub secondary_counter: usize,
    /// Per-sensitive-value distribution, if requested.
    pub distribution: Option<AHashMap<u32, usize>>,
}

/// A cached groupify result for one node, sufficient to reconstruct the
/// groupify result of any descendant.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// The node this snapshot was captured at.
    pub node: NodeId,
    /// The node's level vector at capture time.
    pub levels: Vec<u32>,
    /// One record per equivalence class.
    pub records: Vec<SnapshotRecord>,
    /// The [`crate::predicate::requirements`] mask this snapshot was
    /// built to satisfy.
    pub requirements: u8,
}

impl Snapshot {
    /// Captures `result` (computed at `levels`) as a snapshot for
    /// `node`.
    pub fn from_groupify(
        node: NodeId,
        levels: &[u32],
        result: &GroupifyResult,
        requirements: u8,
    ) -> Self {
        let records = result
            .classes
            .iter()
            .map(|c| SnapshotRecord {
                key: c.key.clone(),
                rows: c.rows.clone(),
                secondary_counter: c.secondary_counter,
                distribution: c.distribution.clone(),
            })
            .collect();
        Self {
            node,
            levels: levels.to_vec(),
            records,
            requirements,
        }
    }

    /// Number of records, `|snapshot|`.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot carries no records at all.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Bounded cache of [`Snapshot`]s keyed by node id.
pub struct History {
    capacity: usize,
    snapshot_size_dataset: f64,
    snapshot_size_snapshot: f64,
    entries: HashMap<NodeId, Snapshot>,
    /// Insertion/access order, most-recently-used last; used to break
    /// eviction ties in favor of the more recently accessed entry.
    recency: Vec<NodeId>,
}

impl History {
    /// Builds a history sized per `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            capacity: config.history_size,
            snapshot_size_dataset: config.snapshot_size_dataset,
            snapshot_size_snapshot: config.snapshot_size_snapshot,
            entries: HashMap::new(),
            recency: Vec::new(),
        }
    }

    /// Returns the closest stored ancestor snapshot of `node`, if any.
    /// `lattice.le` determines ancestry; "closest" is the one
    /// maximizing `total_level` among eligible ancestors, ties broken by
    /// node id so the choice does not depend on `HashMap`'s randomized
    /// iteration order (I5 determinism).
    pub fn closest_ancestor(&mut self, lattice: &Lattice, node: NodeId) -> Option<&Snapshot> {
        let candidate = self
            .entries
            .keys()
            .copied()
            .filter(|&a| a != node && lattice.le(a, node))
            .max_by_key(|&a| (lattice.total_level(a), a.index()))?;
        self.touch(candidate);
        self.entries.get(&candidate)
    }

    /// Direct lookup by node id.
    pub fn get(&mut self, node: NodeId) -> Option<&Snapshot> {
        if self.entries.contains_key(&node) {
            self.touch(node);
        }
        self.entries.get(&node)
    }

    /// Admits `snapshot` for `node` if the admission policy allows it,
    /// evicting if at capacity. Returns whether it was admitted.
    /// Keeps `lattice`'s per-node `has_snapshot` flag in sync with
    /// admission and any resulting eviction.
    pub fn put(&mut self, lattice: &mut Lattice, n_rows: usize, node: NodeId, snapshot: Snapshot) -> bool {
        if snapshot.len() as f64 > self.snapshot_size_dataset * n_rows as f64 {
            tracing::debug!(?node, "snapshot rejected: exceeds snapshotSizeDataset");
            return false;
        }
        for ancestor in self.entries.keys().copied().filter(|&a| lattice.le(a, node)) {
            let ancestor_len = self.entries[&ancestor].len() as f64;
            if ancestor_len > 0.0 && snapshot.len() as f64 > self.snapshot_size_snapshot * ancestor_len {
                tracing::debug!(?node, ?ancestor, "snapshot rejected: exceeds snapshotSizeSnapshot");
                return false;
            }
        }

        if self.entries.len() >= self.capacity && !self.entries.contains_key(&node) {
            self.evict_one(lattice);
        }

        tracing::debug!(?node, records = snapshot.len(), "snapshot admitted");
        self.entries.insert(node, snapshot);
        self.touch(node);
        lattice.set_has_snapshot(node, true);
        true
    }

    /// Clears every cached snapshot, clearing `lattice`'s `has_snapshot`
    /// flag for each one.
    pub fn reset(&mut self, lattice: &mut Lattice) {
        for node in self.entries.keys().copied().collect::<Vec<_>>() {
            lattice.set_has_snapshot(node, false);
        }
        self.entries.clear();
        self.recency.clear();
    }

    /// Changes the cache capacity, evicting immediately if the new
    /// size is smaller than the current count.
    pub fn set_size(&mut self, lattice: &mut Lattice, n: usize) {
        self.capacity = n;
        while self.entries.len() > self.capacity {
            self.evict_one(lattice);
        }
    }

    /// Current number of cached snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn touch(&mut self, node: NodeId) {
        self.recency.retain(|&n| n != node);
        self.recency.push(node);
    }

    /// Evicts the entry whose node has the fewest still-unchecked
    /// descendants, ties broken by least-recent access.
    fn evict_one(&mut self, lattice: &mut Lattice) {
        let least_recent_rank: HashMap<NodeId, usize> = self
            .recency
            .iter()
            .enumerate()
            .map(|(rank, &n)| (n, rank))
            .collect();

        let victim = self
            .entries
            .keys()
            .copied()
            .min_by_key(|&node| {
                let unchecked_descendants = unchecked_descendant_count(lattice, node);
                let recency_rank = least_recent_rank.get(&node).copied().unwrap_or(0);
                (unchecked_descendants, recency_rank)
            });

        if let Some(victim) = victim {
            tracing::debug!(node = ?victim, "snapshot evicted");
            self.entries.remove(&victim);
            self.recency.retain(|&n| n != victim);
            lattice.set_has_snapshot(victim, false);
        }
    }
}

fn unchecked_descendant_count(lattice: &Lattice, node: NodeId) -> usize {
    lattice
        .iter_all()
        .filter(|&other| other != node && lattice.le(node, other) && lattice.state(other).is_open())
        .count()
}
