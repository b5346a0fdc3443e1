//! Kernel trait definition

use crate::core::{KernelError, KernelMatrix, KernelOutput, PointBatch, Result};
use crate::params::Lengthscale;

/// Pairwise covariance function over batches of categorical points
///
/// A kernel K(x, y) must be positive definite to be usable as a GP covariance.
/// The learnable lengthscale is passed in on every call; implementations only
/// read it.
pub trait Kernel: Send + Sync {
    /// Number of input dimensions the kernel expects
    fn dim(&self) -> usize;

    /// Compute kernel value K(a, b) for a single pair of points
    fn compute(&self, lengthscale: &Lengthscale, a: &[usize], b: &[usize]) -> Result<f64>;

    /// Evaluate the kernel over two batches
    ///
    /// With `diag` set, only the paired values K(x1[k], x2[k]) are returned and
    /// both batches must hold the same number of points.
    fn evaluate(
        &self,
        lengthscale: &Lengthscale,
        x1: &PointBatch,
        x2: &PointBatch,
        diag: bool,
    ) -> Result<KernelOutput> {
        // Default implementation goes pair by pair
        if diag {
            if x1.len() != x2.len() {
                return Err(KernelError::DiagonalMismatch {
                    n1: x1.len(),
                    n2: x2.len(),
                });
            }
            let values = x1
                .iter()
                .zip(x2.iter())
                .map(|(a, b)| self.compute(lengthscale, a, b))
                .collect::<Result<Vec<_>>>()?;
            return Ok(KernelOutput::Diagonal(values));
        }

        let mut values = Vec::with_capacity(x1.len() * x2.len());
        for a in x1.iter() {
            for b in x2.iter() {
                values.push(self.compute(lengthscale, a, b)?);
            }
        }
        Ok(KernelOutput::Full(KernelMatrix::from_vec(
            x1.len(),
            x2.len(),
            values,
        )?))
    }
}
