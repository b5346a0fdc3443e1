//! Diffusion kernel over categorical input spaces
//!
//! Each dimension `i` is treated as a complete graph on `c_i` categories. The
//! heat kernel on that graph gives, relative to the diagonal, an off-diagonal
//! similarity of
//!
//! ```text
//! base_i = (1 - exp(-ℓ_i c_i)) / (1 + (c_i - 1) exp(-ℓ_i c_i))
//! ```
//!
//! and the kernel on the product space is
//! `K(a, b) = Π_i base_i ^ [a_i ≠ b_i]`.

use crate::core::{KernelError, KernelMatrix, KernelOutput, PointBatch, Result};
use crate::kernel::Kernel;
use crate::params::Lengthscale;
use log::{debug, trace, warn};

/// Diffusion kernel on a product of complete graphs
///
/// The category counts are fixed at construction. The lengthscale is supplied
/// by the caller on every evaluation and must be strictly positive, which the
/// log-space [`Lengthscale`] record guarantees.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionKernel {
    categories: Vec<usize>,
    last_dim_is_batch: bool,
}

impl DiffusionKernel {
    /// Create a diffusion kernel from per-dimension category counts
    ///
    /// # Errors
    /// Returns `Configuration` if the list is empty or any count is below 2
    pub fn new(categories: Vec<usize>) -> Result<Self> {
        Self::builder().categories(categories).build()
    }

    /// Start building a kernel
    pub fn builder() -> DiffusionKernelBuilder {
        DiffusionKernelBuilder::default()
    }

    /// Category count per dimension
    pub fn categories(&self) -> &[usize] {
        &self.categories
    }

    /// Whether evaluations treat the trailing feature axis as a batch axis
    pub fn last_dim_is_batch(&self) -> bool {
        self.last_dim_is_batch
    }

    /// Default initial lengthscale for this kernel's dimensionality
    pub fn default_lengthscale(&self) -> Lengthscale {
        Lengthscale::default_for(self.categories.len())
    }

    /// Per-dimension off-diagonal similarity `base_i`
    pub fn base(&self, lengthscale: &Lengthscale) -> Result<Vec<f64>> {
        self.check_lengthscale(lengthscale)?;
        let bases: Vec<f64> = self
            .categories
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let base = base_value(c, lengthscale.get(i));
                trace!("dimension {i}: categories={c}, base={base}");
                if base <= 0.0 || base >= 1.0 {
                    warn!(
                        "Diffusion base for dimension {i} saturated at {base} (lengthscale {})",
                        lengthscale.get(i)
                    );
                }
                base
            })
            .collect();
        Ok(bases)
    }

    /// Evaluate the kernel as a running product over dimensions
    ///
    /// Returns the full `n1 × n2` matrix, or with `diag` set the paired values
    /// for equally sized batches.
    pub fn evaluate(
        &self,
        lengthscale: &Lengthscale,
        x1: &PointBatch,
        x2: &PointBatch,
        diag: bool,
    ) -> Result<KernelOutput> {
        self.check_inputs(lengthscale, x1, x2, diag)?;
        let bases = self.base(lengthscale)?;
        debug!(
            "Evaluating diffusion kernel: n1={}, n2={}, d={}, diag={diag}",
            x1.len(),
            x2.len(),
            self.categories.len()
        );

        if diag {
            let mut values = vec![1.0; x1.len()];
            for (i, &base) in bases.iter().enumerate() {
                for (k, value) in values.iter_mut().enumerate() {
                    *value *= base.powf(mismatch(x1.point(k)[i], x2.point(k)[i]));
                }
            }
            return Ok(KernelOutput::Diagonal(values));
        }

        let mut matrix = KernelMatrix::filled(x1.len(), x2.len(), 1.0);
        for (i, &base) in bases.iter().enumerate() {
            for (j, a) in x1.iter().enumerate() {
                for (k, b) in x2.iter().enumerate() {
                    *matrix.get_mut(j, k) *= base.powf(mismatch(a[i], b[i]));
                }
            }
        }
        Ok(KernelOutput::Full(matrix))
    }

    /// Evaluate independent problems stacked along a leading batch axis
    ///
    /// Batch `b` pairs `x1s[b]` with `x2s[b]` under `lengthscales[b]`.
    pub fn evaluate_batched(
        &self,
        lengthscales: &[Lengthscale],
        x1s: &[PointBatch],
        x2s: &[PointBatch],
        diag: bool,
    ) -> Result<Vec<KernelOutput>> {
        for actual in [x1s.len(), x2s.len()] {
            if actual != lengthscales.len() {
                return Err(KernelError::BatchMismatch {
                    expected: lengthscales.len(),
                    actual,
                });
            }
        }

        lengthscales
            .iter()
            .zip(x1s.iter().zip(x2s.iter()))
            .map(|(ls, (x1, x2))| self.evaluate(ls, x1, x2, diag))
            .collect()
    }

    /// Evaluate each dimension as its own one-dimensional kernel
    ///
    /// The trailing feature axis is moved to a batch axis: output `i` holds
    /// `base_i ^ [x1[j][i] ≠ x2[k][i]]` for every pair.
    pub fn evaluate_last_dim_is_batch(
        &self,
        lengthscale: &Lengthscale,
        x1: &PointBatch,
        x2: &PointBatch,
        diag: bool,
    ) -> Result<Vec<KernelOutput>> {
        self.check_inputs(lengthscale, x1, x2, diag)?;

        self.categories
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let kernel = DiffusionKernel {
                    categories: vec![c],
                    last_dim_is_batch: false,
                };
                let ls = Lengthscale::from_log(vec![lengthscale.log_values()[i]])?;
                kernel.evaluate(&ls, &x1.column(i), &x2.column(i), diag)
            })
            .collect()
    }

    /// Evaluate honouring the kernel's `last_dim_is_batch` setting
    ///
    /// Returns a single output in the joint mode and one output per dimension
    /// otherwise.
    pub fn evaluate_with_mode(
        &self,
        lengthscale: &Lengthscale,
        x1: &PointBatch,
        x2: &PointBatch,
        diag: bool,
    ) -> Result<Vec<KernelOutput>> {
        if self.last_dim_is_batch {
            self.evaluate_last_dim_is_batch(lengthscale, x1, x2, diag)
        } else {
            Ok(vec![self.evaluate(lengthscale, x1, x2, diag)?])
        }
    }

    /// Derivative of the kernel output with respect to each lengthscale
    ///
    /// Output `i` has the shape of [`evaluate`](Self::evaluate) and holds
    /// `∂K/∂ℓ_i = K · [a_i ≠ b_i] · c_i² e_i / ((1 - e_i)(1 + (c_i - 1) e_i))`
    /// with `e_i = exp(-ℓ_i c_i)`.
    pub fn gradient(
        &self,
        lengthscale: &Lengthscale,
        x1: &PointBatch,
        x2: &PointBatch,
        diag: bool,
    ) -> Result<Vec<KernelOutput>> {
        let k = self.evaluate(lengthscale, x1, x2, diag)?;

        let outputs = self
            .categories
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let slope = log_base_slope(c, lengthscale.get(i));
                match &k {
                    KernelOutput::Diagonal(values) => {
                        let grad = values
                            .iter()
                            .enumerate()
                            .map(|(p, v)| v * mismatch(x1.point(p)[i], x2.point(p)[i]) * slope)
                            .collect();
                        KernelOutput::Diagonal(grad)
                    }
                    KernelOutput::Full(matrix) => {
                        let mut grad = KernelMatrix::filled(x1.len(), x2.len(), 0.0);
                        for (j, a) in x1.iter().enumerate() {
                            for (l, b) in x2.iter().enumerate() {
                                *grad.get_mut(j, l) = matrix.get(j, l) * mismatch(a[i], b[i]) * slope;
                            }
                        }
                        KernelOutput::Full(grad)
                    }
                }
            })
            .collect();
        Ok(outputs)
    }

    /// Derivative with respect to the log-space lengthscale, `ℓ_i · ∂K/∂ℓ_i`
    pub fn log_gradient(
        &self,
        lengthscale: &Lengthscale,
        x1: &PointBatch,
        x2: &PointBatch,
        diag: bool,
    ) -> Result<Vec<KernelOutput>> {
        let grads = self.gradient(lengthscale, x1, x2, diag)?;
        Ok(grads
            .into_iter()
            .enumerate()
            .map(|(i, g)| scale_output(g, lengthscale.get(i)))
            .collect())
    }

    fn check_lengthscale(&self, lengthscale: &Lengthscale) -> Result<()> {
        if lengthscale.len() != self.categories.len() {
            return Err(KernelError::ShapeMismatch {
                expected: self.categories.len(),
                actual: lengthscale.len(),
            });
        }
        Ok(())
    }

    fn check_point(&self, point: &[usize]) -> Result<()> {
        if point.len() != self.categories.len() {
            return Err(KernelError::ShapeMismatch {
                expected: self.categories.len(),
                actual: point.len(),
            });
        }
        for (dim, (&value, &categories)) in point.iter().zip(&self.categories).enumerate() {
            if value >= categories {
                return Err(KernelError::CategoryOutOfRange {
                    dim,
                    value,
                    categories,
                });
            }
        }
        Ok(())
    }

    fn check_inputs(
        &self,
        lengthscale: &Lengthscale,
        x1: &PointBatch,
        x2: &PointBatch,
        diag: bool,
    ) -> Result<()> {
        self.check_lengthscale(lengthscale)?;
        for batch in [x1, x2] {
            if batch.dim() != self.categories.len() {
                return Err(KernelError::ShapeMismatch {
                    expected: self.categories.len(),
                    actual: batch.dim(),
                });
            }
        }
        if diag && x1.len() != x2.len() {
            return Err(KernelError::DiagonalMismatch {
                n1: x1.len(),
                n2: x2.len(),
            });
        }
        x1.iter().chain(x2.iter()).try_for_each(|p| self.check_point(p))
    }
}

impl Kernel for DiffusionKernel {
    fn dim(&self) -> usize {
        self.categories.len()
    }

    fn compute(&self, lengthscale: &Lengthscale, a: &[usize], b: &[usize]) -> Result<f64> {
        self.check_point(a)?;
        self.check_point(b)?;
        let bases = self.base(lengthscale)?;
        Ok(bases
            .iter()
            .enumerate()
            .fold(1.0, |acc, (i, base)| acc * base.powf(mismatch(a[i], b[i]))))
    }

    fn evaluate(
        &self,
        lengthscale: &Lengthscale,
        x1: &PointBatch,
        x2: &PointBatch,
        diag: bool,
    ) -> Result<KernelOutput> {
        DiffusionKernel::evaluate(self, lengthscale, x1, x2, diag)
    }
}

/// Builder for [`DiffusionKernel`]
#[derive(Debug, Clone, Default)]
pub struct DiffusionKernelBuilder {
    categories: Option<Vec<usize>>,
    last_dim_is_batch: bool,
}

impl DiffusionKernelBuilder {
    /// Set the category count of every dimension
    pub fn categories(mut self, categories: Vec<usize>) -> Self {
        self.categories = Some(categories);
        self
    }

    /// Treat the trailing feature axis as a batch axis
    pub fn last_dim_is_batch(mut self, enabled: bool) -> Self {
        self.last_dim_is_batch = enabled;
        self
    }

    /// Build the kernel
    ///
    /// # Errors
    /// Returns `Configuration` when no categories were given, the list is empty
    /// or any dimension has fewer than two categories
    pub fn build(self) -> Result<DiffusionKernel> {
        let categories = self.categories.ok_or_else(|| {
            KernelError::Configuration("category counts must be provided".to_string())
        })?;
        if categories.is_empty() {
            return Err(KernelError::Configuration(
                "category counts must not be empty".to_string(),
            ));
        }
        if let Some((dim, &c)) = categories.iter().enumerate().find(|(_, c)| **c < 2) {
            return Err(KernelError::Configuration(format!(
                "dimension {dim} needs at least 2 categories, got {c}"
            )));
        }
        debug!("Built diffusion kernel with categories {categories:?}");
        Ok(DiffusionKernel {
            categories,
            last_dim_is_batch: self.last_dim_is_batch,
        })
    }
}

/// 0.0 where the categories agree, 1.0 where they differ
#[inline]
fn mismatch(a: usize, b: usize) -> f64 {
    f64::from(u8::from(a != b))
}

/// Off-diagonal similarity for one dimension
#[inline]
pub(crate) fn base_value(categories: usize, lengthscale: f64) -> f64 {
    let c = categories as f64;
    let x = -lengthscale * c;
    // 1 - e^x, accurate for small lengthscales
    let numerator = -x.exp_m1();
    numerator / (1.0 + (c - 1.0) * x.exp())
}

/// d ln(base) / dℓ for one dimension
#[inline]
fn log_base_slope(categories: usize, lengthscale: f64) -> f64 {
    let c = categories as f64;
    let x = -lengthscale * c;
    let e = x.exp();
    c * c * e / (-x.exp_m1() * (1.0 + (c - 1.0) * e))
}

fn scale_output(output: KernelOutput, factor: f64) -> KernelOutput {
    match output {
        KernelOutput::Diagonal(values) => {
            KernelOutput::Diagonal(values.into_iter().map(|v| v * factor).collect())
        }
        KernelOutput::Full(matrix) => {
            let (rows, cols) = (matrix.rows(), matrix.cols());
            let mut scaled = matrix;
            for j in 0..rows {
                for k in 0..cols {
                    *scaled.get_mut(j, k) *= factor;
                }
            }
            KernelOutput::Full(scaled)
        }
    }
}
