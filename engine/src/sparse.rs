//! Minimal compressed-sparse-row matrix, just enough for document-by-term
//! count and weight matrices. Rows are documents, columns are vocabulary ids;
//! only entries for tokens actually present in a document are stored.

use crate::TermId;

#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<T> {
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<TermId>,
    data: Vec<T>,
}

impl<T: Copy> CsrMatrix<T> {
    pub fn new(n_cols: usize) -> Self {
        Self {
            n_cols,
            indptr: vec![0],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Append a row. Entries are sorted by column in place; duplicate
    /// columns must not occur (one entry per token per document).
    pub fn push_row(&mut self, entries: &mut Vec<(TermId, T)>) {
        entries.sort_unstable_by_key(|&(col, _)| col);
        debug_assert!(entries.iter().all(|&(col, _)| (col as usize) < self.n_cols));
        for &(col, value) in entries.iter() {
            self.indices.push(col);
            self.data.push(value);
        }
        self.indptr.push(self.indices.len());
    }

    pub fn n_rows(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Stored entries, including any explicitly stored zeros.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Column ids and values of row `row`, column-sorted.
    pub fn row(&self, row: usize) -> (&[TermId], &[T]) {
        let span = self.indptr[row]..self.indptr[row + 1];
        (&self.indices[span.clone()], &self.data[span])
    }

    /// Stored value at (row, col), if any. Absent entries are zero by
    /// construction.
    pub fn get(&self, row: usize, col: TermId) -> Option<T> {
        let (cols, vals) = self.row(row);
        cols.binary_search(&col).ok().map(|i| vals[i])
    }

    /// Transform every stored entry, keeping the sparsity structure.
    pub fn map<U: Copy>(&self, mut f: impl FnMut(usize, TermId, T) -> U) -> CsrMatrix<U> {
        let mut data = Vec::with_capacity(self.data.len());
        for row in 0..self.n_rows() {
            for i in self.indptr[row]..self.indptr[row + 1] {
                data.push(f(row, self.indices[i], self.data[i]));
            }
        }
        CsrMatrix {
            n_cols: self.n_cols,
            indptr: self.indptr.clone(),
            indices: self.indices.clone(),
            data,
        }
    }
}
