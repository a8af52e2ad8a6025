// ============================================================
// Layer 5 - Sparse Feature Matrix (CSR)
// ============================================================
// Bag-of-words matrices are almost entirely zeros: a message has
// a couple of dozen distinct tokens out of a vocabulary of tens of
// thousands. Compressed Sparse Row storage keeps only non-zeros:
//
//   row i's entries live in  indices[indptr[i]..indptr[i+1]]
//                            data   [indptr[i]..indptr[i+1]]
//
// Column indices within a row are strictly increasing, which lets
// `get` binary-search and lets the tree walk rows in order.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix {
    n_cols:  usize,
    indptr:  Vec<usize>,
    indices: Vec<u32>,
    data:    Vec<f64>,
}

impl CsrMatrix {
    /// Empty matrix with `n_cols` columns and no rows
    pub fn new(n_cols: usize) -> Self {
        Self { n_cols, indptr: vec![0], indices: Vec::new(), data: Vec::new() }
    }

    /// Append a row given as (column, value) pairs.
    ///
    /// Pairs are sorted by column, zeros are skipped. Columns must be
    /// unique and below `n_cols`.
    pub fn push_row(&mut self, mut entries: Vec<(u32, f64)>) {
        entries.sort_unstable_by_key(|&(col, _)| col);
        for (col, value) in entries {
            debug_assert!((col as usize) < self.n_cols, "column {col} out of range");
            if value != 0.0 {
                self.indices.push(col);
                self.data.push(value);
            }
        }
        self.indptr.push(self.indices.len());
    }

    pub fn n_rows(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored (non-zero) entries
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Column indices and values of row `i`
    pub fn row(&self, i: usize) -> (&[u32], &[f64]) {
        let span = self.indptr[i]..self.indptr[i + 1];
        (&self.indices[span.clone()], &self.data[span])
    }

    /// Value at (row, col); zero when not stored
    pub fn get(&self, row: usize, col: u32) -> f64 {
        let (cols, values) = self.row(row);
        match cols.binary_search(&col) {
            Ok(pos) => values[pos],
            Err(_)  => 0.0,
        }
    }

    /// Number of rows in which each column is non-zero
    pub fn document_frequency(&self) -> Vec<usize> {
        let mut df = vec![0usize; self.n_cols];
        for &col in &self.indices {
            df[col as usize] += 1;
        }
        df
    }

    /// Multiply every stored value of column `j` by `weights[j]`
    pub fn scale_columns(&mut self, weights: &[f64]) {
        for (value, &col) in self.data.iter_mut().zip(&self.indices) {
            *value *= weights[col as usize];
        }
    }

    /// Scale every row to unit Euclidean length. All-zero rows stay zero.
    pub fn normalize_rows_l2(&mut self) {
        for i in 0..self.n_rows() {
            let span = self.indptr[i]..self.indptr[i + 1];
            let norm = self.data[span.clone()]
                .iter()
                .map(|v| v * v)
                .sum::<f64>()
                .sqrt();
            if norm > 0.0 {
                for v in &mut self.data[span] {
                    *v /= norm;
                }
            }
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CsrMatrix {
        let mut m = CsrMatrix::new(4);
        m.push_row(vec![(3, 1.0), (0, 2.0)]);
        m.push_row(vec![]);
        m.push_row(vec![(1, 3.0), (2, 0.0), (3, 4.0)]);
        m
    }

    #[test]
    fn test_rows_are_sorted_and_zeros_dropped() {
        let m = sample();
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.nnz(), 4);
        assert_eq!(m.row(0), (&[0u32, 3][..], &[2.0, 1.0][..]));
        assert_eq!(m.row(1).0.len(), 0);
        assert_eq!(m.row(2), (&[1u32, 3][..], &[3.0, 4.0][..]));
    }

    #[test]
    fn test_get_defaults_to_zero() {
        let m = sample();
        assert_eq!(m.get(0, 3), 1.0);
        assert_eq!(m.get(0, 1), 0.0);
        assert_eq!(m.get(1, 0), 0.0);
    }

    #[test]
    fn test_document_frequency() {
        assert_eq!(sample().document_frequency(), vec![1, 1, 0, 2]);
    }

    #[test]
    fn test_l2_normalisation() {
        let mut m = sample();
        m.normalize_rows_l2();
        let (_, row2) = m.row(2);
        assert!((row2[0] - 0.6).abs() < 1e-12);
        assert!((row2[1] - 0.8).abs() < 1e-12);
        // empty row untouched
        assert_eq!(m.row(1).1.len(), 0);
    }
}
