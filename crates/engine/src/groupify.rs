// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Equivalence-class builder.
//!
//! Given a node's level vector, partitions row ids into equivalence
//! classes keyed by `T_L(r)`, either from scratch or by lifting an
//! ancestor's cached [`crate::snapshot::Snapshot`].

use ahash::AHashMap;
use panonym_core::DataManager;
use panonym_lattice::InterruptFlag;

use crate::predicate::requirements;
use crate::snapshot::Snapshot;
use crate::{Error, Result};

/// One equivalence class: the rows sharing a generalized QI tuple.
#[derive(Debug, Clone)]
pub struct ClassSummary {
    /// The generalized QI tuple, `T_L(r)` for every `r` in this class.
    pub key: Vec<u32>,
    /// Row ids belonging to this class, in first-seen (insertion) order.
    pub rows: Vec<u32>,
    /// Secondary counter, populated when
    /// [`requirements::SECONDARY_COUNTER`] is requested. Left at `0`
    /// when not requested.
    pub secondary_counter: usize,
    /// Per-sensitive-value counts, populated when
    /// [`requirements::DISTRIBUTION`] is requested.
    pub distribution: Option<AHashMap<u32, usize>>,
}

impl ClassSummary {
    fn new(key: Vec<u32>) -> Self {
        Self {
            key,
            rows: Vec::new(),
            secondary_counter: 0,
            distribution: None,
        }
    }

    /// The class's size, `|class|`.
    #[inline]
    pub fn size(&self) -> usize {
        self.rows.len()
    }
}

/// The full output of a Groupify pass over one node.
#[derive(Debug, Clone, Default)]
pub struct GroupifyResult {
    /// Classes in insertion order, for reproducible iteration.
    pub classes: Vec<ClassSummary>,
}

impl GroupifyResult {
    /// `N`, the sum of every class's size — must equal the table's row
    /// count for every node visited.
    pub fn total_rows(&self) -> usize {
        self.classes.iter().map(ClassSummary::size).sum()
    }
}

/// Builds the groupify result for `levels` by scanning every row of
/// `data`.
pub fn build_from_scratch(
    data: &DataManager,
    levels: &[u32],
    se_index: Option<usize>,
    needs: u8,
    interrupt: &InterruptFlag,
) -> Result<GroupifyResult> {
    let mut index: AHashMap<Vec<u32>, usize> = AHashMap::default();
    let mut classes: Vec<ClassSummary> = Vec::new();

    for row in 0..data.n_rows() {
        if row % 4096 == 0 && interrupt.is_triggered() {
            return Err(panonym_lattice::Error::Interrupted.into());
        }

        let key: Vec<u32> = (0..data.n_qi())
            .map(|qi| data.generalize(qi, levels[qi] as usize, row))
            .collect();

        let class_idx = *index.entry(key.clone()).or_insert_with(|| {
            classes.push(ClassSummary::new(key.clone()));
            classes.len() - 1
        });
        let class = &mut classes[class_idx];
        class.rows.push(row as u32);

        if needs & requirements::DISTRIBUTION != 0 {
            let se = se_index.ok_or(Error::MissingSensitiveAttribute)?;
            let value = data
                .sensitive_value(row, se)
                .ok_or(Error::MissingSensitiveAttribute)?;
            *class
                .distribution
                .get_or_insert_with(AHashMap::default)
                .entry(value)
                .or_insert(0) += 1;
        }
        if needs & requirements::SECONDARY_COUNTER != 0 {
            class.secondary_counter += 1;
        }
    }

    Ok(GroupifyResult { classes })
}

/// Builds the groupify result for `levels` by lifting `snapshot`
/// (captured at `snapshot.levels`, an ancestor of `levels`) instead of
/// rescanning raw rows.
///
/// Correctness rests on the hierarchy monotonicity check in
/// `panonym-core`: applying `gen[col][levels[col]]` to a value already
/// generalized to `snapshot.levels[col]` yields the same result as
/// applying it to the original base value, for every `levels[col] >=
/// snapshot.levels[col]`.
pub fn build_from_snapshot(
    data: &DataManager,
    levels: &[u32],
    snapshot: &Snapshot,
    interrupt: &InterruptFlag,
) -> Result<GroupifyResult> {
    let mut index: AHashMap<Vec<u32>, usize> = AHashMap::default();
    let mut classes: Vec<ClassSummary> = Vec::new();

    for (i, record) in snapshot.records.iter().enumerate() {
        if i % 4096 == 0 && interrupt.is_triggered() {
            return Err(panonym_lattice::Error::Interrupted.into());
        }

        let key: Vec<u32> = (0..data.n_qi())
            .map(|qi| {
                data.hierarchy(qi)
                    .generalize(levels[qi] as usize, record.key[qi])
            })
            .collect();

        let class_idx = *index.entry(key.clone()).or_insert_with(|| {
            classes.push(ClassSummary::new(key.clone()));
            classes.len() - 1
        });
        let class = &mut classes[class_idx];
        class.rows.extend_from_slice(&record.rows);
        class.secondary_counter += record.secondary_counter;
        if let Some(dist) = &record.distribution {
            let target = class.distribution.get_or_insert_with(AHashMap::default);
            for (&value, &count) in dist {
                *target.entry(value).or_insert(0) += count;
            }
        }
    }

    Ok(GroupifyResult { classes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use panonym_core::{AttributeRole as R, Dictionary, EncodedTable, Hierarchy};

    fn fixture() -> DataManager {
        let mut dict = Dictionary::new(2);
        let rows = vec![
            vec!["25".into(), "a".into()],
            vec!["27".into(), "a".into()],
            vec!["40".into(), "b".into()],
        ];
        let table = EncodedTable::from_rows(&mut dict, &rows).unwrap();
        let levels = vec![
            vec![0, 1, 2, 3], // level 0: identity, ids 1..3 are 25/27/40
            vec![0, 1, 1, 1], // level 1: 25/27/40 all merge into id 1
        ];
        let hierarchy = Hierarchy::from_levels(levels).unwrap();
        DataManager::new(table, &[R::Qi, R::Se], vec![hierarchy], vec![0], vec![1]).unwrap()
    }

    #[test]
    fn scratch_groups_by_generalized_tuple() {
        let dm = fixture();
        let flag = InterruptFlag::new();
        let result = build_from_scratch(&dm, &[0], Some(0), 0, &flag).unwrap();
        assert_eq!(result.classes.len(), 3);
        assert_eq!(result.total_rows(), 3);
    }

    #[test]
    fn coarser_level_merges_every_row_into_one_class() {
        let dm = fixture();
        let flag = InterruptFlag::new();
        let result = build_from_scratch(&dm, &[1], Some(0), 0, &flag).unwrap();
        assert_eq!(result.classes.len(), 1);
        assert_eq!(result.classes[0].size(), 3);
    }

    #[test]
    fn distribution_tracks_sensitive_values() {
        let dm = fixture();
        let flag = InterruptFlag::new();
        let result =
            build_from_scratch(&dm, &[1], Some(0), requirements::DISTRIBUTION, &flag).unwrap();
        let dist = result.classes[0].distribution.as_ref().unwrap();
        assert_eq!(dist.values().sum::<usize>(), 3);
    }

    /// Builds a `bits`-wide QI hierarchy over domain `[0, 2^bits)` where
    /// level `l` zeroes out the low `l` bits of the base value. Masking
    /// more bits as `l` grows only ever merges classes further, so this
    /// construction is monotone by construction for any `bits`.
    fn bitmask_hierarchy(bits: u32) -> Hierarchy {
        let cardinality = 1usize << bits;
        let levels: Vec<Vec<u32>> = (0..=bits)
            .map(|l| {
                let mask: u32 = if l == 0 { u32::MAX } else { !((1u32 << l) - 1) };
                (0..cardinality as u32).map(|v| v & mask).collect()
            })
            .collect();
        Hierarchy::from_levels(levels).unwrap()
    }

    fn single_qi_data(values: &[u32], bits: u32) -> DataManager {
        let table = EncodedTable::from_encoded(values.to_vec(), values.len(), 1).unwrap();
        let hierarchy = bitmask_hierarchy(bits);
        DataManager::new(table, &[R::Qi], vec![hierarchy], vec![0], vec![bits as usize]).unwrap()
    }

    proptest::proptest! {
        /// For any node, the sum of class sizes built from scratch
        /// equals the total row count.
        #[test]
        fn totality_of_classes_built_from_scratch(
            bits in 1u32..4,
            values in proptest::collection::vec(0u32..16, 1..20),
            level in 0u32..4,
        ) {
            let bits = bits.max(1);
            let values: Vec<u32> = values.iter().map(|&v| v % (1 << bits)).collect();
            let level = level.min(bits);
            let dm = single_qi_data(&values, bits);
            let flag = InterruptFlag::new();
            let result = build_from_scratch(&dm, &[level], None, 0, &flag).unwrap();
            proptest::prop_assert_eq!(result.total_rows(), values.len());
        }

        /// For `L <= L'`, any two rows in the same class at `L`
        /// remain in the same class at `L'`.
        #[test]
        fn refining_levels_never_splits_a_class(
            bits in 1u32..4,
            values in proptest::collection::vec(0u32..16, 2..20),
            lo in 0u32..4,
            delta in 0u32..4,
        ) {
            let bits = bits.max(1);
            let values: Vec<u32> = values.iter().map(|&v| v % (1 << bits)).collect();
            let lo = lo.min(bits);
            let hi = (lo + delta).min(bits);
            let dm = single_qi_data(&values, bits);
            let flag = InterruptFlag::new();
            let at_lo = build_from_scratch(&dm, &[lo], None, 0, &flag).unwrap();
            let at_hi = build_from_scratch(&dm, &[hi], None, 0, &flag).unwrap();

            let class_of = |result: &GroupifyResult, row: u32| -> Vec<u32> {
                result
                    .classes
                    .iter()
                    .find(|c| c.rows.contains(&row))
                    .unwrap()
                    .key
                    .clone()
            };
            for r1 in 0..values.len() as u32 {
                for r2 in (r1 + 1)..values.len() as u32 {
                    if class_of(&at_lo, r1) == class_of(&at_lo, r2) {
                        proptest::prop_assert_eq!(class_of(&at_hi, r1), class_of(&at_hi, r2));
                    }
                }
            }
        }
    }

    #[test]
    fn snapshot_reconstruction_matches_from_scratch() {
        let dm = fixture();
        let flag = InterruptFlag::new();
        let from_scratch = build_from_scratch(&dm, &[1], Some(0), 0, &flag).unwrap();

        let ancestor = build_from_scratch(&dm, &[0], Some(0), 0, &flag).unwrap();
        let lattice = panonym_lattice::Lattice::new(vec![(0, 1)]).unwrap();
        let snapshot = Snapshot::from_groupify(lattice.bottom(), &[0], &ancestor, 0);
        let from_snapshot = build_from_snapshot(&dm, &[1], &snapshot, &flag).unwrap();

        let mut a: Vec<usize> = from_scratch.classes.iter().map(ClassSummary::size).collect();
        let mut b: Vec<usize> = from_snapshot
            .classes
            .iter()
            .map(ClassSummary::size)
            .collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
        assert_eq!(from_scratch.total_rows(), from_snapshot.total_rows());
    }
}
