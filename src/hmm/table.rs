use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sparse two-level matrix: one row per source id, each row mapping a
/// destination id to a value.
///
/// Rows are iterated in ascending destination id, which keeps decoding
/// deterministic for a given interning order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    rows: Vec<BTreeMap<usize, f64>>,
}

impl Table {
    /// Adds one to the count of (`src`, `dst`), creating the row on demand.
    pub(crate) fn increment(&mut self, src: usize, dst: usize) {
        if self.rows.len() <= src {
            self.rows.resize_with(src + 1, BTreeMap::new);
        }
        *self.rows[src].entry(dst).or_insert(0.0) += 1.0;
    }

    /// Replaces every count by the natural log of its share of the row total.
    pub(crate) fn normalize_log(&mut self) {
        for row in &mut self.rows {
            let total: f64 = row.values().sum();
            for value in row.values_mut() {
                *value = (*value / total).ln();
            }
        }
    }

    pub fn get(&self, src: usize, dst: usize) -> Option<f64> {
        self.rows.get(src).and_then(|row| row.get(&dst)).copied()
    }

    /// The recorded entries of `src`, or `None` when nothing was recorded.
    pub fn row(&self, src: usize) -> Option<&BTreeMap<usize, f64>> {
        self.rows.get(src).filter(|row| !row.is_empty())
    }

    /// Non-empty rows with their source ids, in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeMap<usize, f64>)> {
        self.rows.iter().enumerate().filter(|(_, row)| !row.is_empty())
    }

    pub fn sources(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter().map(|(i, _)| i)
    }

    pub fn num_entries(&self) -> usize {
        self.rows.iter().map(|row| row.len()).sum()
    }
}
