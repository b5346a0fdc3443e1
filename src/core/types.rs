//! Core type definitions for categorical points and kernel outputs

use crate::core::{KernelError, Result};

/// Rectangular batch of categorical points stored row-major
///
/// Each row is one point; column `i` holds the category index chosen on
/// dimension `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointBatch {
    data: Vec<usize>,
    n_points: usize,
    dim: usize,
}

impl PointBatch {
    /// Create a batch from a list of rows, all of which must share one length
    ///
    /// The dimensionality is taken from the first row, so an empty `rows`
    /// yields a 0-dimensional batch. Use [`PointBatch::with_dim`] when the
    /// row list may be empty.
    pub fn new(rows: Vec<Vec<usize>>) -> Result<Self> {
        let dim = rows.first().map(|r| r.len()).unwrap_or(0);
        Self::with_dim(dim, rows)
    }

    /// Create a batch of `dim`-dimensional points from a list of rows
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if any row does not have length `dim`
    pub fn with_dim(dim: usize, rows: Vec<Vec<usize>>) -> Result<Self> {
        let n_points = rows.len();
        let mut data = Vec::with_capacity(n_points * dim);

        for row in rows {
            if row.len() != dim {
                return Err(KernelError::ShapeMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }

        Ok(Self {
            data,
            n_points,
            dim,
        })
    }

    /// Create a batch from flat row-major storage
    pub fn from_flat(data: Vec<usize>, n_points: usize, dim: usize) -> Result<Self> {
        if data.len() != n_points * dim {
            return Err(KernelError::ShapeMismatch {
                expected: n_points * dim,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            n_points,
            dim,
        })
    }

    /// Create an empty batch with a fixed dimensionality
    pub fn empty(dim: usize) -> Self {
        Self {
            data: Vec::new(),
            n_points: 0,
            dim,
        }
    }

    /// Number of points in the batch
    pub fn len(&self) -> usize {
        self.n_points
    }

    /// Check if the batch holds no points
    pub fn is_empty(&self) -> bool {
        self.n_points == 0
    }

    /// Number of dimensions per point
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get a single point
    ///
    /// # Panics
    /// Panics if index >= len()
    pub fn point(&self, i: usize) -> &[usize] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Iterate over points in order
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        (0..self.n_points).map(move |i| self.point(i))
    }

    /// Extract dimension `j` as a single-column batch
    pub fn column(&self, j: usize) -> PointBatch {
        let data = self.iter().map(|p| p[j]).collect();
        PointBatch {
            data,
            n_points: self.n_points,
            dim: 1,
        }
    }

    /// Flat row-major view of the indices
    pub fn as_slice(&self) -> &[usize] {
        &self.data
    }
}

/// Dense row-major matrix of kernel values
#[derive(Clone, Debug, PartialEq)]
pub struct KernelMatrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl KernelMatrix {
    /// Create a matrix with every entry set to `value`
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            data: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    /// Create a matrix from row-major storage
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(KernelError::ShapeMismatch {
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get entry (i, j)
    ///
    /// # Panics
    /// Panics if the position is out of bounds
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.rows && j < self.cols, "Index ({i}, {j}) out of bounds");
        self.data[i * self.cols + j]
    }

    pub(crate) fn get_mut(&mut self, i: usize, j: usize) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }

    /// Get row `i`
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Main diagonal (length min(rows, cols))
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.rows.min(self.cols)).map(|i| self.get(i, i)).collect()
    }

    /// Exact symmetry check; non-square matrices are never symmetric
    pub fn is_symmetric(&self) -> bool {
        if self.rows != self.cols {
            return false;
        }
        (0..self.rows).all(|i| (0..i).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Flat row-major view of the values
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Result of a kernel evaluation: full cross matrix or paired diagonal
#[derive(Clone, Debug, PartialEq)]
pub enum KernelOutput {
    Full(KernelMatrix),
    Diagonal(Vec<f64>),
}

impl KernelOutput {
    /// Number of values held
    pub fn len(&self) -> usize {
        match self {
            KernelOutput::Full(m) => m.as_slice().len(),
            KernelOutput::Diagonal(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All values in row-major order
    pub fn values(&self) -> &[f64] {
        match self {
            KernelOutput::Full(m) => m.as_slice(),
            KernelOutput::Diagonal(d) => d,
        }
    }

    pub fn as_matrix(&self) -> Option<&KernelMatrix> {
        match self {
            KernelOutput::Full(m) => Some(m),
            KernelOutput::Diagonal(_) => None,
        }
    }

    pub fn as_diagonal(&self) -> Option<&[f64]> {
        match self {
            KernelOutput::Full(_) => None,
            KernelOutput::Diagonal(d) => Some(d),
        }
    }

    pub fn into_matrix(self) -> Option<KernelMatrix> {
        match self {
            KernelOutput::Full(m) => Some(m),
            KernelOutput::Diagonal(_) => None,
        }
    }

    pub fn into_diagonal(self) -> Option<Vec<f64>> {
        match self {
            KernelOutput::Full(_) => None,
            KernelOutput::Diagonal(d) => Some(d),
        }
    }
}
