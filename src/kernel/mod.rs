//! Kernel functions over categorical inputs

pub mod diffusion;
pub mod traits;

pub use self::diffusion::*;
pub use self::traits::*;
