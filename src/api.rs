//! High-level API for diffusion kernel evaluation
//!
//! This module ties together configuration files, CSV point loading and the
//! kernel itself for callers that work with files rather than in-memory
//! batches.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rdkernel::api::quick;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Evaluate the kernel between two CSV files of category indices
//! let outputs = quick::evaluate_files("kernel.json", "train.csv", Some("test.csv"), false)?;
//! println!("{} outputs", outputs.len());
//! # Ok(())
//! # }
//! ```

use crate::core::{KernelOutput, Result};
use crate::data::CsvPoints;
use crate::kernel::DiffusionKernel;
use crate::params::Lengthscale;
use crate::persistence::KernelConfig;
use std::path::Path;

/// Description of a kernel together with a lengthscale
#[derive(Debug, Clone)]
pub struct KernelSummary {
    pub dim: usize,
    pub categories: Vec<usize>,
    pub lengthscale: Vec<f64>,
    pub base: Vec<f64>,
    pub last_dim_is_batch: bool,
}

impl KernelSummary {
    /// Summarize a kernel under the given lengthscale
    pub fn new(kernel: &DiffusionKernel, lengthscale: &Lengthscale) -> Result<Self> {
        Ok(Self {
            dim: kernel.categories().len(),
            categories: kernel.categories().to_vec(),
            lengthscale: lengthscale.values(),
            base: kernel.base(lengthscale)?,
            last_dim_is_batch: kernel.last_dim_is_batch(),
        })
    }

    /// Summarize the kernel and initial lengthscale held by a loaded configuration
    pub fn from_config(config: &KernelConfig) -> Result<Self> {
        Self::new(&config.to_kernel()?, &config.lengthscale()?)
    }

    /// Smallest off-diagonal similarity any pair of points can reach
    pub fn min_similarity(&self) -> f64 {
        self.base.iter().product()
    }
}

/// Convenience functions for file-based operations
pub mod quick {
    use super::*;

    /// Evaluate the configured kernel between two CSV point files
    ///
    /// When `x2` is `None` the kernel is evaluated between `x1` and itself.
    /// Returns one output in joint mode, one per dimension when the
    /// configuration sets `last_dim_is_batch`.
    pub fn evaluate_files<C, P1, P2>(
        config: C,
        x1: P1,
        x2: Option<P2>,
        diag: bool,
    ) -> Result<Vec<KernelOutput>>
    where
        C: AsRef<Path>,
        P1: AsRef<Path>,
        P2: AsRef<Path>,
    {
        let (kernel, lengthscale, x1, x2) = load_inputs(config, x1, x2)?;
        kernel.evaluate_with_mode(&lengthscale, x1.batch(), x2.batch(), diag)
    }

    /// Gradient of the configured kernel with respect to each lengthscale
    pub fn gradient_files<C, P1, P2>(
        config: C,
        x1: P1,
        x2: Option<P2>,
        diag: bool,
        log_space: bool,
    ) -> Result<Vec<KernelOutput>>
    where
        C: AsRef<Path>,
        P1: AsRef<Path>,
        P2: AsRef<Path>,
    {
        let (kernel, lengthscale, x1, x2) = load_inputs(config, x1, x2)?;
        if log_space {
            kernel.log_gradient(&lengthscale, x1.batch(), x2.batch(), diag)
        } else {
            kernel.gradient(&lengthscale, x1.batch(), x2.batch(), diag)
        }
    }

    /// Summarize a configuration file
    pub fn summarize<C: AsRef<Path>>(config: C) -> Result<KernelSummary> {
        KernelSummary::from_config(&KernelConfig::load_from_file(config)?)
    }

    fn load_inputs<C, P1, P2>(
        config: C,
        x1: P1,
        x2: Option<P2>,
    ) -> Result<(DiffusionKernel, Lengthscale, CsvPoints, CsvPoints)>
    where
        C: AsRef<Path>,
        P1: AsRef<Path>,
        P2: AsRef<Path>,
    {
        let config = KernelConfig::load_from_file(config)?;
        let kernel = config.to_kernel()?;
        let lengthscale = config.lengthscale()?;
        let x1 = CsvPoints::from_file(x1)?;
        let x2 = match x2 {
            Some(path) => CsvPoints::from_file(path)?,
            None => x1.clone(),
        };
        Ok((kernel, lengthscale, x1, x2))
    }
}
