//! Kernel configuration files
//!
//! A JSON document describing a diffusion kernel and an initial lengthscale,
//! used by the CLI and by callers that want to seed a training loop from disk.
//! The lengthscale stored here is a starting value; the trained value is owned
//! by whatever loop updates it.

use crate::core::{KernelError, Result};
use crate::kernel::DiffusionKernel;
use crate::params::Lengthscale;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable kernel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Category count per dimension
    pub categories: Vec<usize>,
    /// Initial lengthscale in natural units, one per dimension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lengthscale: Option<Vec<f64>>,
    /// Treat the trailing feature axis as a batch axis
    #[serde(default)]
    pub last_dim_is_batch: bool,
    /// Configuration metadata
    #[serde(default)]
    pub metadata: ConfigMetadata,
}

/// Metadata for tracking where a configuration came from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Library version used to write the file
    pub library_version: String,
    /// Creation timestamp
    pub created_at: String,
}

impl ConfigMetadata {
    fn current() -> Self {
        Self {
            library_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl KernelConfig {
    /// Create a configuration for the given categories
    pub fn new(categories: Vec<usize>) -> Self {
        Self {
            categories,
            lengthscale: None,
            last_dim_is_batch: false,
            metadata: ConfigMetadata::current(),
        }
    }

    /// Set the initial lengthscale
    pub fn with_lengthscale(mut self, lengthscale: Vec<f64>) -> Self {
        self.lengthscale = Some(lengthscale);
        self
    }

    /// Set the batch reshaping mode
    pub fn with_last_dim_is_batch(mut self, enabled: bool) -> Self {
        self.last_dim_is_batch = enabled;
        self
    }

    /// Capture a kernel and lengthscale
    pub fn from_kernel(kernel: &DiffusionKernel, lengthscale: &Lengthscale) -> Self {
        Self::new(kernel.categories().to_vec())
            .with_lengthscale(lengthscale.values())
            .with_last_dim_is_batch(kernel.last_dim_is_batch())
    }

    /// Build the kernel described by this configuration
    pub fn to_kernel(&self) -> Result<DiffusionKernel> {
        DiffusionKernel::builder()
            .categories(self.categories.clone())
            .last_dim_is_batch(self.last_dim_is_batch)
            .build()
    }

    /// Initial lengthscale, defaulting to ln 2 per dimension
    pub fn lengthscale(&self) -> Result<Lengthscale> {
        match &self.lengthscale {
            Some(values) => {
                if values.len() != self.categories.len() {
                    return Err(KernelError::ShapeMismatch {
                        expected: self.categories.len(),
                        actual: values.len(),
                    });
                }
                Lengthscale::new(values.clone())
            }
            None => Ok(Lengthscale::default_for(self.categories.len())),
        }
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(KernelError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| KernelError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(KernelError::IoError)?;
        let reader = BufReader::new(file);
        let config = serde_json::from_reader(reader)
            .map_err(|e| KernelError::SerializationError(e.to_string()))?;
        Ok(config)
    }

    /// Print configuration summary
    pub fn print_summary(&self) -> Result<()> {
        let kernel = self.to_kernel()?;
        let lengthscale = self.lengthscale()?;
        let bases = kernel.base(&lengthscale)?;

        println!("=== Diffusion Kernel Configuration ===");
        println!("Dimensions: {}", self.categories.len());
        println!("Last dim is batch: {}", self.last_dim_is_batch);
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Per-dimension parameters:");
        for (i, (c, base)) in self.categories.iter().zip(&bases).enumerate() {
            println!(
                "  [{i}] categories={c} lengthscale={:.6} base={base:.6}",
                lengthscale.get(i)
            );
        }
        Ok(())
    }
}
