// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Generalization Hierarchy.
//!
//! For one quasi-identifier column, `gen[level]` maps a base value id to
//! its level-`level` generalization. Level 0 is always the identity.

use crate::{Error, Result};

/// One attribute's value-generalization hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    /// `levels[l][v]` is the level-`l` generalization of base value `v`.
    /// Every level has the same length (the column's cardinality).
    levels: Vec<Vec<u32>>,
}

impl Hierarchy {
    /// Builds a hierarchy from a `(height × cardinality)` matrix of value
    /// ids, rejecting it unless level 0 is the identity and the
    /// monotonicity condition of §4.2 holds at every level.
    pub fn from_levels(levels: Vec<Vec<u32>>) -> Result<Self> {
        if levels.is_empty() {
            return Err(Error::InvalidHierarchy(
                "hierarchy must have at least one level".into(),
            ));
        }
        let cardinality = levels[0].len();
        if cardinality == 0 {
            return Err(Error::InvalidHierarchy(
                "hierarchy must cover at least one value".into(),
            ));
        }
        for (l, level) in levels.iter().enumerate() {
            if level.len() != cardinality {
                return Err(Error::InvalidHierarchy(format!(
                    "level {l} has {} entries, expected {cardinality}",
                    level.len()
                )));
            }
            for &g in level {
                if g as usize >= cardinality {
                    return Err(Error::InvalidHierarchy(format!(
                        "level {l} maps to out-of-range id {g} (cardinality {cardinality})"
                    )));
                }
            }
        }
        for (v, &g) in levels[0].iter().enumerate() {
            if g as usize != v {
                return Err(Error::InvalidHierarchy(
                    "level 0 must be the identity mapping".into(),
                ));
            }
        }

        let h = Self { levels };
        h.check_monotonic()?;
        Ok(h)
    }

    /// Verifies monotonicity: two values merged at level `l-1` must
    /// remain merged at level `l` (`gen[l][v] ==
    /// gen[l][gen[l-1][v]]` for every base id `v`).
    fn check_monotonic(&self) -> Result<()> {
        for l in 1..self.levels.len() {
            let (prev, cur) = (&self.levels[l - 1], &self.levels[l]);
            for v in 0..cur.len() {
                let lifted = cur[prev[v] as usize];
                if lifted != cur[v] {
                    return Err(Error::InvalidHierarchy(format!(
                        "hierarchy is not monotone at level {l}, value {v}: \
                         gen[{l}][{v}] = {} but gen[{l}][gen[{}][{v}]] = {lifted}",
                        cur[v],
                        l - 1
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of levels, `h`. Valid levels are `0..height-1`.
    #[inline]
    pub fn height(&self) -> usize {
        self.levels.len()
    }

    /// Cardinality of the base domain this hierarchy covers.
    #[inline]
    pub fn cardinality(&self) -> usize {
        self.levels[0].len()
    }

    /// The level-`level` generalization of base value `value`.
    #[inline]
    pub fn generalize(&self, level: usize, value: u32) -> u32 {
        self.levels[level][value as usize]
    }

    /// Builds the identity hierarchy of a given height and cardinality:
    /// every level maps every value to itself. Useful for attributes
    /// whose only generalization is full suppression at the top level,
    /// or as a test fixture.
    pub fn identity(height: usize, cardinality: usize) -> Result<Self> {
        let levels = (0..height)
            .map(|_| (0..cardinality as u32).collect())
            .collect();
        Self::from_levels(levels)
    }
}
