//! Data loading for categorical point batches

pub mod csv;

pub use self::csv::*;
