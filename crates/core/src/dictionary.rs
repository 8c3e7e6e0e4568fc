// Copyright 2026 PANONYM Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Dictionary & Encoded Table: per-column string interning and the
//! resulting dense integer-keyed table.
//!
//! Interns every string value to a dense per-column integer id so the rest
//! of the engine can work entirely in integer hot paths. Id `0` is reserved
//! per column for the suppression sentinel and is never returned by
//! [`Dictionary::intern`].

use std::collections::HashMap;

/// Per-column string <-> id mapping.
///
/// Ids are stable for the lifetime of a `Dictionary`: once assigned, a
/// string's id never changes for the lifetime of the dictionary.
#[derive(Debug, Clone)]
pub struct Dictionary {
    columns: Vec<ColumnDict>,
}

#[derive(Debug, Clone)]
struct ColumnDict {
    /// `values[0]` is the suppression string; `values[id]` is the interned
    /// string for `id`.
    values: Vec<String>,
    lookup: HashMap<String, u32>,
}

impl ColumnDict {
    fn new(suppression_string: &str) -> Self {
        Self {
            values: vec![suppression_string.to_string()],
            lookup: HashMap::new(),
        }
    }
}

impl Dictionary {
    /// Creates an empty dictionary for `num_columns` columns, using `"*"`
    /// as the suppression string.
    pub fn new(num_columns: usize) -> Self {
        Self::with_suppression_string(num_columns, "*")
    }

    /// Creates an empty dictionary using a caller-supplied suppression
    /// string.
    pub fn with_suppression_string(num_columns: usize, suppression_string: &str) -> Self {
        Self {
            columns: (0..num_columns)
                .map(|_| ColumnDict::new(suppression_string))
                .collect(),
        }
    }

    /// Number of columns this dictionary covers.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Interns `s` in column `col`, returning its dense id. Repeated calls
    /// with the same string return the same id.
    pub fn intern(&mut self, col: usize, s: &str) -> u32 {
        let column = &mut self.columns[col];
        if let Some(&id) = column.lookup.get(s) {
            return id;
        }
        let id = column.values.len() as u32;
        column.values.push(s.to_string());
        column.lookup.insert(s.to_string(), id);
        id
    }

    /// Decodes `id` back to its string in column `col`. `decode(col, 0)`
    /// always yields the suppression string.
    pub fn decode(&self, col: usize, id: u32) -> &str {
        &self.columns[col].values[id as usize]
    }

    /// Decodes a full row of ids, one per column, in column order.
    pub fn decode_row(&self, row: &[u32]) -> Vec<&str> {
        row.iter()
            .enumerate()
            .map(|(col, &id)| self.decode(col, id))
            .collect()
    }

    /// Cardinality of column `col`, including the reserved sentinel id 0.
    pub fn cardinality(&self, col: usize) -> usize {
        self.columns[col].values.len()
    }
}

/// The encoded table: a row-major matrix of dense value ids.
///
/// `0 ≤ row < n_rows`, `0 ≤ col < n_cols`; `get(row, col)` is the id
/// produced by [`Dictionary::intern`] for that cell.
#[derive(Debug, Clone)]
pub struct EncodedTable {
    data: Vec<u32>,
    n_rows: usize,
    n_cols: usize,
}

impl EncodedTable {
    /// Builds an encoded table from string rows, interning every cell
    /// through `dict`. All rows must have `dict.num_columns()` entries.
    pub fn from_rows(dict: &mut Dictionary, rows: &[Vec<String>]) -> crate::Result<Self> {
        let n_cols = dict.num_columns();
        let mut data = Vec::with_capacity(rows.len() * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(crate::Error::InvalidInput(format!(
                    "row has {} columns, expected {n_cols}",
                    row.len()
                )));
            }
            for (col, value) in row.iter().enumerate() {
                data.push(dict.intern(col, value));
            }
        }
        Ok(Self {
            data,
            n_rows: rows.len(),
            n_cols,
        })
    }

    /// Builds an already-encoded table directly from row-major ids.
    pub fn from_encoded(data: Vec<u32>, n_rows: usize, n_cols: usize) -> crate::Result<Self> {
        if data.len() != n_rows * n_cols {
            return Err(crate::Error::InvalidInput(format!(
                "encoded data has {} cells, expected {} x {} = {}",
                data.len(),
                n_rows,
                n_cols,
                n_rows * n_cols
            )));
        }
        Ok(Self {
            data,
            n_rows,
            n_cols,
        })
    }

    /// Number of rows, `N`.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns, `C`.
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// The id at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.data[row * self.n_cols + col]
    }

    /// The full row at `row`, as a slice of column ids.
    #[inline]
    pub fn row(&self, row: usize) -> &[u32] {
        &self.data[row * self.n_cols..(row + 1) * self.n_cols]
    }

    /// Iterates all rows in row id order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[u32]> {
        (0..self.n_rows).map(move |r| self.row(r))
    }
}
