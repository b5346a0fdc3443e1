//! CSV format point loader
//!
//! Supports loading categorical point batches from CSV files where:
//! - Every column is one input dimension
//! - Every field is a non-negative integer category index
//! - First row can be headers (automatically detected)

use crate::core::{KernelError, PointBatch, Result};
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Point batch loaded from a CSV file
#[derive(Debug, Clone)]
pub struct CsvPoints {
    batch: PointBatch,
}

impl CsvPoints {
    /// Load points from a CSV file
    ///
    /// Headers are automatically detected if present.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading points from {path:?}");
        let file = File::open(path).map_err(KernelError::IoError)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Load points from a reader with header auto-detection
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, true)
    }

    /// Load points from a reader with explicit header option
    pub fn from_reader_with_options<R: BufRead>(reader: R, auto_detect_header: bool) -> Result<Self> {
        let mut rows: Vec<Vec<usize>> = Vec::new();
        let mut first_content_line = true;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(KernelError::IoError)?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if first_content_line {
                first_content_line = false;
                if auto_detect_header && Self::is_header_line(line) {
                    continue;
                }
            }

            let row = Self::parse_data_line(line, line_no + 1)?;
            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(KernelError::ParseError(format!(
                        "Line {} has {} fields, expected {}",
                        line_no + 1,
                        row.len(),
                        first.len()
                    )));
                }
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(KernelError::EmptyDataset);
        }

        let batch = PointBatch::new(rows)?;
        debug!("Loaded {} points with {} dimensions", batch.len(), batch.dim());
        Ok(Self { batch })
    }

    /// Check if a line appears to be a header
    fn is_header_line(line: &str) -> bool {
        let fields: Vec<&str> = line.split(',').collect();
        let non_numeric_count = fields
            .iter()
            .filter(|field| field.trim().parse::<f64>().is_err())
            .count();

        non_numeric_count * 2 > fields.len()
    }

    /// Parse a CSV data line into category indices
    fn parse_data_line(line: &str, line_no: usize) -> Result<Vec<usize>> {
        line.split(',')
            .map(|f| f.trim())
            .enumerate()
            .map(|(col, field)| {
                field.parse::<usize>().map_err(|_| {
                    KernelError::ParseError(format!(
                        "Invalid category index at line {line_no}, column {}: {field}",
                        col + 1
                    ))
                })
            })
            .collect()
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Number of dimensions
    pub fn dim(&self) -> usize {
        self.batch.dim()
    }

    /// Borrow the loaded batch
    pub fn batch(&self) -> &PointBatch {
        &self.batch
    }

    /// Take ownership of the loaded batch
    pub fn into_batch(self) -> PointBatch {
        self.batch
    }
}
