//! Integration tests for the CLI application
//!
//! These tests verify that the CLI commands work correctly with real data files.

use std::io::Write;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

/// Helper to create test data files
struct TestDataFiles {
    pub points_file: NamedTempFile,
    pub other_points_file: NamedTempFile,
    pub wide_points_file: NamedTempFile,
}

impl TestDataFiles {
    fn new() -> std::io::Result<Self> {
        let mut points_file = NamedTempFile::with_suffix(".csv")?;
        writeln!(points_file, "a,b")?;
        writeln!(points_file, "0,0")?;
        writeln!(points_file, "0,1")?;
        writeln!(points_file, "1,1")?;
        points_file.flush()?;

        let mut other_points_file = NamedTempFile::with_suffix(".csv")?;
        writeln!(other_points_file, "1,0")?;
        writeln!(other_points_file, "1,1")?;
        other_points_file.flush()?;

        let mut wide_points_file = NamedTempFile::with_suffix(".csv")?;
        writeln!(wide_points_file, "0,1,0")?;
        wide_points_file.flush()?;

        Ok(TestDataFiles {
            points_file,
            other_points_file,
            wide_points_file,
        })
    }
}

/// Path to the compiled CLI binary
fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rdkernel"))
}

/// Write a configuration with the init command
fn init_config(dir: &TempDir, categories: &str, lengthscale: Option<&str>) -> std::path::PathBuf {
    let config_path = dir.path().join("kernel.json");
    let mut args = vec![
        "init".to_string(),
        "--categories".to_string(),
        categories.to_string(),
        "--output".to_string(),
        config_path.to_str().unwrap().to_string(),
    ];
    if let Some(ls) = lengthscale {
        args.push("--lengthscale".to_string());
        args.push(ls.to_string());
    }

    let output = cli().args(&args).output().expect("Failed to run init");
    assert!(
        output.status.success(),
        "Init command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    config_path
}

fn parse_rows(stdout: &[u8]) -> Vec<Vec<f64>> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| !l.starts_with('#') && !l.trim().is_empty())
        .map(|l| {
            l.split(',')
                .map(|v| v.parse::<f64>().expect("numeric output"))
                .collect()
        })
        .collect()
}

#[test]
fn test_cli_init_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = init_config(&temp_dir, "2,3,4", Some("0.5,1.0,2.0"));

    assert!(config_path.exists(), "Config file was not created");
    let content = std::fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("categories"));
    assert!(content.contains("lengthscale"));
}

#[test]
fn test_cli_init_rejects_single_category() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("kernel.json");

    let output = cli()
        .args([
            "init",
            "--categories",
            "2,1",
            "--output",
            config_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run init");

    assert!(!output.status.success());
    assert!(!config_path.exists());
}

#[test]
fn test_cli_evaluate_full_matrix() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = init_config(&temp_dir, "2,2", Some("0.5,0.5"));

    let output = cli()
        .args([
            "evaluate",
            "--config",
            config_path.to_str().unwrap(),
            "--x1",
            test_data.points_file.path().to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run evaluate");

    assert!(
        output.status.success(),
        "Evaluate command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let rows = parse_rows(&output.stdout);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].len(), 3);
    assert_eq!(rows[0][0], 1.0);
    assert!((rows[0][1] - 0.4621).abs() < 1e-4);
    assert!((rows[0][2] - 0.2135).abs() < 1e-4);
    assert_eq!(rows[0][1], rows[1][0]);
}

#[test]
fn test_cli_evaluate_cross_to_file() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = init_config(&temp_dir, "2,2", None);
    let output_path = temp_dir.path().join("k.csv");

    let output = cli()
        .args([
            "evaluate",
            "--config",
            config_path.to_str().unwrap(),
            "--x1",
            test_data.points_file.path().to_str().unwrap(),
            "--x2",
            test_data.other_points_file.path().to_str().unwrap(),
            "--output",
            output_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run evaluate");

    assert!(output.status.success());
    let content = std::fs::read(&output_path).expect("Failed to read output");
    let rows = parse_rows(&content);
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.len() == 2));
    // (1,1) against (1,1)
    assert_eq!(rows[2][1], 1.0);
}

#[test]
fn test_cli_evaluate_diag_mismatch_fails() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = init_config(&temp_dir, "2,2", None);

    let output = cli()
        .args([
            "evaluate",
            "--config",
            config_path.to_str().unwrap(),
            "--x1",
            test_data.points_file.path().to_str().unwrap(),
            "--x2",
            test_data.other_points_file.path().to_str().unwrap(),
            "--diag",
        ])
        .output()
        .expect("Failed to run evaluate");

    assert!(!output.status.success());
}

#[test]
fn test_cli_evaluate_shape_mismatch_fails() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = init_config(&temp_dir, "2,2", None);

    let output = cli()
        .args([
            "evaluate",
            "--config",
            config_path.to_str().unwrap(),
            "--x1",
            test_data.wide_points_file.path().to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run evaluate");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Shape mismatch"));
}

#[test]
fn test_cli_gradient_command() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = init_config(&temp_dir, "2,2", Some("1.0,1.0"));

    let output = cli()
        .args([
            "gradient",
            "--config",
            config_path.to_str().unwrap(),
            "--x1",
            test_data.points_file.path().to_str().unwrap(),
            "--diag",
        ])
        .output()
        .expect("Failed to run gradient");

    assert!(
        output.status.success(),
        "Gradient command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# d/dlengthscale[0]"));
    assert!(stdout.contains("# d/dlengthscale[1]"));

    // Self-pairs never differ, so every diagonal gradient is zero
    let rows = parse_rows(&output.stdout);
    assert_eq!(rows.len(), 6);
    assert!(rows.iter().all(|r| r[0] == 0.0));
}

#[test]
fn test_cli_info_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = init_config(&temp_dir, "2,5", None);

    let output = cli()
        .args(["info", config_path.to_str().unwrap()])
        .output()
        .expect("Failed to run info");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Dimensions: 2"));
    assert!(stdout.contains("categories=5"));
    assert!(stdout.contains("Minimum similarity"));
}

#[test]
fn test_cli_missing_config_fails() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");

    let output = cli()
        .args([
            "evaluate",
            "--config",
            "/nonexistent/kernel.json",
            "--x1",
            test_data.points_file.path().to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run evaluate");

    assert!(!output.status.success());
}
