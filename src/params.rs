//! Learnable kernel parameters
//!
//! The lengthscale is owned by the training loop, not by the kernel. It is
//! stored in log-space so that an optimizer can move the raw values freely
//! while the natural values stay strictly positive.

use crate::core::{KernelError, Result};
use serde::{Deserialize, Serialize};

/// Initial lengthscale used when none is supplied: softplus(0) = ln 2
pub const DEFAULT_LENGTHSCALE: f64 = std::f64::consts::LN_2;

/// Per-dimension lengthscale record held as `ln ℓ`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lengthscale {
    raw: Vec<f64>,
}

impl Lengthscale {
    /// Create a lengthscale from natural (positive) values
    ///
    /// # Errors
    /// Returns `InvalidParameter` if any value is not finite and positive
    pub fn new(values: Vec<f64>) -> Result<Self> {
        let raw = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                if is_valid_lengthscale(v) {
                    Ok(v.ln())
                } else {
                    Err(KernelError::InvalidParameter(format!(
                        "Lengthscale must be positive and finite, got {v} for dimension {i}"
                    )))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { raw })
    }

    /// Same value on every dimension
    pub fn constant(dim: usize, value: f64) -> Result<Self> {
        Self::new(vec![value; dim])
    }

    /// Default initial lengthscale for `dim` dimensions
    pub fn default_for(dim: usize) -> Self {
        Self {
            raw: vec![DEFAULT_LENGTHSCALE.ln(); dim],
        }
    }

    /// Create a lengthscale from log-space values
    ///
    /// # Errors
    /// Returns `InvalidParameter` if any `exp(raw)` underflows to zero, is
    /// subnormal or overflows
    pub fn from_log(raw: Vec<f64>) -> Result<Self> {
        if let Some(v) = raw.iter().find(|v| !is_valid_lengthscale(v.exp())) {
            return Err(KernelError::InvalidParameter(format!(
                "Log-lengthscale {v} does not map to a positive normal lengthscale"
            )));
        }
        Ok(Self { raw })
    }

    /// Number of dimensions
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Natural value for dimension `i`
    pub fn get(&self, i: usize) -> f64 {
        self.raw[i].exp()
    }

    /// Natural values for all dimensions
    pub fn values(&self) -> Vec<f64> {
        self.raw.iter().map(|r| r.exp()).collect()
    }

    /// Log-space values as seen by an optimizer
    pub fn log_values(&self) -> &[f64] {
        &self.raw
    }

    /// Replace the log-space values, keeping the dimensionality
    pub fn set_log_values(&mut self, raw: &[f64]) -> Result<()> {
        if raw.len() != self.raw.len() {
            return Err(KernelError::ShapeMismatch {
                expected: self.raw.len(),
                actual: raw.len(),
            });
        }
        let updated = Self::from_log(raw.to_vec())?;
        self.raw = updated.raw;
        Ok(())
    }

    /// Set the natural value of a single dimension
    pub fn set(&mut self, i: usize, value: f64) -> Result<()> {
        if i >= self.raw.len() {
            return Err(KernelError::InvalidParameter(format!(
                "Dimension {i} out of range for lengthscale of length {}",
                self.raw.len()
            )));
        }
        if !is_valid_lengthscale(value) {
            return Err(KernelError::InvalidParameter(format!(
                "Lengthscale must be positive and finite, got {value} for dimension {i}"
            )));
        }
        self.raw[i] = value.ln();
        Ok(())
    }
}

/// Positive, finite and not subnormal, so `ln` and `exp` round-trip safely
fn is_valid_lengthscale(value: f64) -> bool {
    value.is_normal() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lengthscale_roundtrip_values() {
        let ls = Lengthscale::new(vec![0.5, 1.0, 2.0]).unwrap();
        assert_eq!(ls.len(), 3);
        assert_relative_eq!(ls.get(0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(ls.get(2), 2.0, epsilon = 1e-12);
        assert_relative_eq!(ls.log_values()[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lengthscale_rejects_non_positive() {
        assert!(Lengthscale::new(vec![1.0, 0.0]).is_err());
        assert!(Lengthscale::new(vec![-1.0]).is_err());
        assert!(Lengthscale::new(vec![f64::NAN]).is_err());
        assert!(Lengthscale::new(vec![f64::INFINITY]).is_err());
    }

    #[test]
    fn test_default_lengthscale() {
        let ls = Lengthscale::default_for(4);
        assert_eq!(ls.len(), 4);
        for v in ls.values() {
            assert_relative_eq!(v, std::f64::consts::LN_2, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_log_space_updates_stay_positive() {
        let mut ls = Lengthscale::constant(2, 1.0).unwrap();
        ls.set_log_values(&[-30.0, 5.0]).unwrap();
        assert!(ls.get(0) > 0.0);
        assert_relative_eq!(ls.get(1), 5.0_f64.exp(), epsilon = 1e-9);

        assert!(ls.set_log_values(&[0.0]).is_err());
        assert!(ls.set_log_values(&[0.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_from_log_rejects_underflow_and_overflow() {
        assert!(matches!(
            Lengthscale::from_log(vec![-800.0, 0.0]),
            Err(KernelError::InvalidParameter(_))
        ));
        assert!(matches!(
            Lengthscale::from_log(vec![800.0]),
            Err(KernelError::InvalidParameter(_))
        ));
        assert!(Lengthscale::from_log(vec![-700.0, 700.0]).is_ok());
    }

    #[test]
    fn test_log_update_cannot_collapse_lengthscale() {
        let mut ls = Lengthscale::constant(2, 1.0).unwrap();
        assert!(ls.set_log_values(&[-800.0, 0.0]).is_err());
        assert!(ls.set_log_values(&[0.0, 750.0]).is_err());
        // A rejected update leaves the record untouched
        assert_eq!(ls.values(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_new_rejects_subnormal() {
        assert!(Lengthscale::new(vec![1e-320]).is_err());
    }

    #[test]
    fn test_set_single_dimension() {
        let mut ls = Lengthscale::constant(2, 1.0).unwrap();
        ls.set(1, 3.0).unwrap();
        assert_relative_eq!(ls.get(1), 3.0, epsilon = 1e-12);
        assert!(ls.set(2, 1.0).is_err());
        assert!(ls.set(0, -1.0).is_err());
    }
}
