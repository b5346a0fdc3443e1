//! Mismatch cache for repeated Gram matrix evaluation
//!
//! The per-dimension disagreement pattern between two points does not depend
//! on the lengthscale, so a training loop that rebuilds the Gram matrix of a
//! fixed batch after every parameter update can reuse it. The pattern is
//! symmetric, so we only cache pairs (i, j) where i <= j.

use crate::core::{KernelMatrix, PointBatch, Result};
use crate::kernel::DiffusionKernel;
use crate::params::Lengthscale;
use log::debug;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache key for point pairs, normalized so that i <= j
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    i: usize,
    j: usize,
}

impl CacheKey {
    /// Create a normalized cache key where i <= j
    fn new(i: usize, j: usize) -> Self {
        if i <= j {
            Self { i, j }
        } else {
            Self { i: j, j: i }
        }
    }
}

/// LRU cache of per-dimension mismatch indicators (0.0 / 1.0)
pub struct MismatchCache {
    cache: LruCache<CacheKey, Vec<f64>>,
    hits: u64,
    misses: u64,
}

impl MismatchCache {
    /// Create a new cache holding at most `capacity` point pairs
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Create a cache sized from a memory budget in bytes
    /// Assumes 8 bytes per indicator plus fixed per-entry overhead
    pub fn with_memory_limit(memory_bytes: usize, dim: usize) -> Self {
        let entry_bytes = 8 * dim + 48;
        Self::new((memory_bytes / entry_bytes).max(1))
    }

    /// Get the indicators for a pair
    pub fn get(&mut self, i: usize, j: usize) -> Option<&Vec<f64>> {
        let key = CacheKey::new(i, j);
        match self.cache.get(&key) {
            Some(value) => {
                self.hits += 1;
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store the indicators for a pair
    pub fn put(&mut self, i: usize, j: usize, indicators: Vec<f64>) {
        self.cache.put(CacheKey::new(i, j), indicators);
    }

    /// Get cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.cache.cap().get(),
            size: self.cache.len(),
        }
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.cache.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub capacity: usize,
    pub size: usize,
}

/// Gram matrix of a fixed training batch, rebuilt per lengthscale update
pub struct TrainingGram {
    points: PointBatch,
    cache: MismatchCache,
}

impl TrainingGram {
    /// Cache every pair of the batch
    pub fn new(points: PointBatch) -> Self {
        let n = points.len();
        let capacity = n * (n + 1) / 2;
        Self::with_capacity(points, capacity)
    }

    /// Cache at most `capacity` pairs
    pub fn with_capacity(points: PointBatch, capacity: usize) -> Self {
        Self {
            points,
            cache: MismatchCache::new(capacity),
        }
    }

    pub fn points(&self) -> &PointBatch {
        &self.points
    }

    /// Compute the symmetric `n × n` Gram matrix for the given lengthscale
    ///
    /// Equal to `kernel.evaluate(lengthscale, x, x, false)`.
    pub fn gram(
        &mut self,
        kernel: &DiffusionKernel,
        lengthscale: &Lengthscale,
    ) -> Result<KernelMatrix> {
        // Validates shapes and category ranges on the batch once
        kernel.evaluate(lengthscale, &PointBatch::empty(self.points.dim()), &self.points, false)?;
        let bases = kernel.base(lengthscale)?;
        let n = self.points.len();
        let mut gram = KernelMatrix::filled(n, n, 1.0);

        for i in 0..n {
            for j in i..n {
                let value = match self.cache.get(i, j) {
                    Some(indicators) => indicator_product(&bases, indicators),
                    None => {
                        let indicators: Vec<f64> = self
                            .points
                            .point(i)
                            .iter()
                            .zip(self.points.point(j))
                            .map(|(a, b)| f64::from(u8::from(a != b)))
                            .collect();
                        let value = indicator_product(&bases, &indicators);
                        self.cache.put(i, j, indicators);
                        value
                    }
                };
                *gram.get_mut(i, j) = value;
                *gram.get_mut(j, i) = value;
            }
        }

        debug!(
            "Training Gram rebuilt: n={n}, cache hit rate {:.3}",
            self.cache.hit_rate()
        );
        Ok(gram)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// `Π base_i^ind_i` over one cached pair
fn indicator_product(bases: &[f64], indicators: &[f64]) -> f64 {
    bases
        .iter()
        .zip(indicators)
        .fold(1.0, |acc, (base, &ind)| acc * base.powf(ind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_normalization() {
        let key1 = CacheKey::new(1, 5);
        let key2 = CacheKey::new(5, 1);
        assert_eq!(key1, key2);
        assert_eq!(key1.i, 1);
        assert_eq!(key1.j, 5);
    }

    #[test]
    fn test_mismatch_cache_basic() {
        let mut cache = MismatchCache::new(3);

        assert!(cache.get(0, 1).is_none());
        assert_eq!(cache.stats().misses, 1);

        cache.put(0, 1, vec![1.0, 0.0]);
        assert_eq!(cache.get(0, 1), Some(&vec![1.0, 0.0]));
        assert_eq!(cache.stats().hits, 1);

        // Symmetric access
        assert_eq!(cache.get(1, 0), Some(&vec![1.0, 0.0]));
        assert_eq!(cache.stats().hits, 2);
    }

    #[test]
    fn test_mismatch_cache_lru_eviction() {
        let mut cache = MismatchCache::new(2);

        cache.put(0, 1, vec![1.0]);
        cache.put(1, 2, vec![0.0]);
        cache.put(2, 3, vec![1.0]); // Should evict (0,1)

        assert!(cache.get(0, 1).is_none());
        assert!(cache.get(1, 2).is_some());
        assert!(cache.get(2, 3).is_some());
    }

    #[test]
    fn test_hit_rate_calculation() {
        let mut cache = MismatchCache::new(10);
        assert_eq!(cache.hit_rate(), 0.0);

        cache.get(0, 1);
        cache.get(1, 2);
        cache.put(0, 1, vec![0.0]);
        cache.get(0, 1);
        cache.get(0, 1);

        // 2 hits, 2 misses
        assert_eq!(cache.hit_rate(), 0.5);
    }

    #[test]
    fn test_cache_with_memory_limit() {
        let cache = MismatchCache::with_memory_limit(1000, 4);
        assert!(cache.stats().capacity > 0);

        let tiny = MismatchCache::with_memory_limit(0, 4);
        assert_eq!(tiny.stats().capacity, 1);
    }

    #[test]
    fn test_cache_clear() {
        let mut cache = MismatchCache::new(10);
        cache.put(0, 1, vec![1.0]);
        cache.get(0, 1);

        cache.clear();

        assert!(cache.get(0, 1).is_none());
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_training_gram_matches_evaluate() {
        let kernel = DiffusionKernel::new(vec![3, 2, 4]).unwrap();
        let points = PointBatch::new(vec![
            vec![0, 1, 3],
            vec![2, 0, 1],
            vec![0, 1, 0],
            vec![1, 1, 3],
        ])
        .unwrap();
        let mut training = TrainingGram::new(points.clone());

        for values in [vec![0.3, 1.0, 2.0], vec![1.5, 0.2, 0.7]] {
            let ls = Lengthscale::new(values).unwrap();
            let expected = kernel
                .evaluate(&ls, &points, &points, false)
                .unwrap()
                .into_matrix()
                .unwrap();
            let gram = training.gram(&kernel, &ls).unwrap();
            assert_eq!(gram, expected);
        }
    }

    #[test]
    fn test_training_gram_reuses_indicators() {
        let kernel = DiffusionKernel::new(vec![2, 2]).unwrap();
        let points = PointBatch::new(vec![vec![0, 0], vec![0, 1], vec![1, 1]]).unwrap();
        let mut training = TrainingGram::new(points);

        training
            .gram(&kernel, &Lengthscale::constant(2, 1.0).unwrap())
            .unwrap();
        // Each of the 6 upper-triangle pairs is looked up exactly once
        let first = training.stats();
        assert_eq!(first.size, 6);
        assert_eq!(first.hits, 0);
        assert_eq!(first.misses, 6);

        training
            .gram(&kernel, &Lengthscale::constant(2, 0.5).unwrap())
            .unwrap();
        let second = training.stats();
        assert_eq!(second.misses, 6);
        assert_eq!(second.hits, 6);
    }

    #[test]
    fn test_training_gram_rejects_bad_lengthscale() {
        let kernel = DiffusionKernel::new(vec![2, 2]).unwrap();
        let points = PointBatch::new(vec![vec![0, 0]]).unwrap();
        let mut training = TrainingGram::new(points);

        let result = training.gram(&kernel, &Lengthscale::constant(3, 1.0).unwrap());
        assert!(result.is_err());
    }
}
