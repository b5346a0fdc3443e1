//! Rust implementation of diffusion kernels over categorical input spaces
//!
//! Based on "Diffusion Kernels on Graphs and Other Discrete Input Spaces" by
//! Kondor and Lafferty, applied to a product of complete graphs.

pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod kernel;
pub mod params;
pub mod persistence;

// Re-export main types for convenience
pub use crate::api::KernelSummary;
pub use crate::cache::{CacheStats, MismatchCache, TrainingGram};
pub use crate::core::*;
pub use crate::data::CsvPoints;
pub use crate::kernel::{DiffusionKernel, DiffusionKernelBuilder, Kernel};
pub use crate::params::Lengthscale;
pub use crate::persistence::KernelConfig;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
