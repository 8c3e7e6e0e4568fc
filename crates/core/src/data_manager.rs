// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Data Manager: binds an encoded table to its column roles and
//! per-attribute generalization bounds.
//!
//! Splits the encoded table's columns by [`AttributeRole`], pairs each QI
//! column with its hierarchy, and validates/holds the per-attribute
//! `[minLevel, maxLevel]` bounds that define the search space.

use crate::{AttributeRole, Dictionary, EncodedTable, Error, Hierarchy, Result};

/// The curse-of-dimensionality guard: more than this many
/// quasi-identifiers is rejected outright.
pub const MAX_QI_ATTRIBUTES: usize = 15;

/// Owns the encoded table and hierarchy metadata, split by role.
pub struct DataManager {
    table: EncodedTable,
    qi_columns: Vec<usize>,
    se_columns: Vec<usize>,
    is_columns: Vec<usize>,
    hierarchies: Vec<Hierarchy>,
    min_level: Vec<usize>,
    max_level: Vec<usize>,
}

impl DataManager {
    /// Builds a data manager from an encoded table plus one role per
    /// column and one hierarchy per QI column (in the same order QI
    /// columns appear in `roles`).
    ///
    /// `min_level`/`max_level` bound the lattice per QI attribute:
    /// `0 ≤ minLevel ≤ maxLevel ≤ height-1`.
    pub fn new(
        table: EncodedTable,
        roles: &[AttributeRole],
        hierarchies: Vec<Hierarchy>,
        min_level: Vec<usize>,
        max_level: Vec<usize>,
    ) -> Result<Self> {
        if roles.len() != table.n_cols() {
            return Err(Error::InvalidInput(format!(
                "{} roles given for a table with {} columns",
                roles.len(),
                table.n_cols()
            )));
        }

        let mut qi_columns = Vec::new();
        let mut se_columns = Vec::new();
        let mut is_columns = Vec::new();
        for (col, role) in roles.iter().enumerate() {
            match role {
                AttributeRole::Qi => qi_columns.push(col),
                AttributeRole::Se => se_columns.push(col),
                AttributeRole::Is => is_columns.push(col),
                AttributeRole::Id => {
                    return Err(Error::InvalidInput(
                        "ID columns must be dropped before reaching the engine".into(),
                    ))
                }
            }
        }

        if qi_columns.is_empty() {
            return Err(Error::InvalidConfiguration(
                "at least one quasi-identifier is required".into(),
            ));
        }
        if qi_columns.len() > MAX_QI_ATTRIBUTES {
            return Err(Error::InvalidConfiguration(format!(
                "{} quasi-identifiers exceeds the maximum of {MAX_QI_ATTRIBUTES}",
                qi_columns.len()
            )));
        }
        if hierarchies.len() != qi_columns.len() {
            return Err(Error::InvalidInput(format!(
                "{} hierarchies given for {} quasi-identifiers",
                hierarchies.len(),
                qi_columns.len()
            )));
        }
        if min_level.len() != qi_columns.len() || max_level.len() != qi_columns.len() {
            return Err(Error::InvalidInput(
                "minLevel/maxLevel must have one entry per quasi-identifier".into(),
            ));
        }

        for (i, h) in hierarchies.iter().enumerate() {
            let height = h.height();
            if min_level[i] > max_level[i] || max_level[i] > height - 1 {
                return Err(Error::InvalidHierarchy(format!(
                    "quasi-identifier {i}: minLevel={} maxLevel={} out of [0, {}]",
                    min_level[i],
                    max_level[i],
                    height - 1
                )));
            }
        }

        Ok(Self {
            table,
            qi_columns,
            se_columns,
            is_columns,
            hierarchies,
            min_level,
            max_level,
        })
    }

    /// `N`, the row count.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.table.n_rows()
    }

    /// `d`, the number of quasi-identifiers.
    #[inline]
    pub fn n_qi(&self) -> usize {
        self.qi_columns.len()
    }

    /// The raw base-value id of QI `qi_index` for `row`.
    #[inline]
    pub fn qi_value(&self, row: usize, qi_index: usize) -> u32 {
        self.table.get(row, self.qi_columns[qi_index])
    }

    /// `gen[qi_index][level][row[r][qi_index]]`: the level-`level`
    /// generalization of QI `qi_index` for `row` (one coordinate of the
    /// generalized tuple `T_L(r)`).
    #[inline]
    pub fn generalize(&self, qi_index: usize, level: usize, row: usize) -> u32 {
        self.hierarchies[qi_index].generalize(level, self.qi_value(row, qi_index))
    }

    /// Height of QI `qi_index`'s hierarchy.
    #[inline]
    pub fn height(&self, qi_index: usize) -> usize {
        self.hierarchies[qi_index].height()
    }

    /// The hierarchy backing QI `qi_index`. Exposed so a cached,
    /// already-generalized value can be pushed further up the levels
    /// without rescanning raw rows.
    #[inline]
    pub fn hierarchy(&self, qi_index: usize) -> &Hierarchy {
        &self.hierarchies[qi_index]
    }

    /// Lower bound of the lattice range for QI `qi_index`.
    #[inline]
    pub fn min_level(&self, qi_index: usize) -> usize {
        self.min_level[qi_index]
    }

    /// Upper bound of the lattice range for QI `qi_index`.
    #[inline]
    pub fn max_level(&self, qi_index: usize) -> usize {
        self.max_level[qi_index]
    }

    /// The sensitive-attribute value id at `(row, se_index)`, or `None`
    /// if there are fewer than `se_index + 1` sensitive columns.
    pub fn sensitive_value(&self, row: usize, se_index: usize) -> Option<u32> {
        self.se_columns
            .get(se_index)
            .map(|&col| self.table.get(row, col))
    }

    /// Number of sensitive columns.
    pub fn n_se(&self) -> usize {
        self.se_columns.len()
    }

    /// Insensitive column indices, unchanged from input to output.
    pub fn is_columns(&self) -> &[usize] {
        &self.is_columns
    }

    /// Original column index of QI `qi_index` in the encoded table.
    pub fn qi_column(&self, qi_index: usize) -> usize {
        self.qi_columns[qi_index]
    }

    /// Original column index of sensitive attribute `se_index`.
    pub fn se_column(&self, se_index: usize) -> usize {
        self.se_columns[se_index]
    }

    /// The underlying encoded table.
    pub fn table(&self) -> &EncodedTable {
        &self.table
    }

    /// Decodes row `row` of the encoded table, applying `transform` to
    /// each column's raw id first (e.g. to substitute the suppression
    /// sentinel before decoding). Used to build the anonymized output
    /// table.
    pub fn decode_row_with<'a>(
        &'a self,
        dict: &'a Dictionary,
        row: usize,
        mut transform: impl FnMut(usize, u32) -> u32,
    ) -> Vec<&'a str> {
        self.table
            .row(row)
            .iter()
            .enumerate()
            .map(|(col, &id)| dict.decode(col, transform(col, id)))
            .collect()
    }
}
