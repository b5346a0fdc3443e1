//! rdkernel Command Line Interface
//!
//! A command-line interface for evaluating diffusion kernels between CSV files
//! of categorical points, inspecting kernel configurations and writing new ones.

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use rdkernel::api::{quick, KernelSummary};
use rdkernel::core::{KernelError, KernelOutput, Result};
use rdkernel::persistence::KernelConfig;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "rdkernel")]
#[command(about = "Diffusion kernels over categorical input spaces")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "rdkernel contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the kernel between two point files
    Evaluate(EvaluateArgs),
    /// Compute the kernel gradient with respect to each lengthscale
    Gradient(GradientArgs),
    /// Display kernel configuration
    Info(InfoArgs),
    /// Write a new kernel configuration file
    Init(InitArgs),
}

#[derive(Args)]
struct EvaluateArgs {
    /// Kernel configuration file (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// First point file (CSV of category indices)
    #[arg(long)]
    x1: PathBuf,

    /// Second point file (defaults to the first)
    #[arg(long)]
    x2: Option<PathBuf>,

    /// Only compute the paired diagonal
    #[arg(long)]
    diag: bool,

    /// Output file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct GradientArgs {
    /// Kernel configuration file (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// First point file (CSV of category indices)
    #[arg(long)]
    x1: PathBuf,

    /// Second point file (defaults to the first)
    #[arg(long)]
    x2: Option<PathBuf>,

    /// Only compute the paired diagonal
    #[arg(long)]
    diag: bool,

    /// Differentiate with respect to log-lengthscale
    #[arg(long)]
    log_space: bool,

    /// Output file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct InfoArgs {
    /// Kernel configuration file
    config: PathBuf,
}

#[derive(Args)]
struct InitArgs {
    /// Category count per dimension, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    categories: Vec<usize>,

    /// Initial lengthscale per dimension, comma separated
    #[arg(long, value_delimiter = ',')]
    lengthscale: Option<Vec<f64>>,

    /// Treat the trailing feature axis as a batch axis
    #[arg(long)]
    last_dim_is_batch: bool,

    /// Output configuration file
    #[arg(short, long)]
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Gradient(args) => gradient_command(args),
        Commands::Info(args) => info_command(args),
        Commands::Init(args) => init_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    info!("Evaluating kernel from {:?}", args.config);
    info!("Points: x1={:?}, x2={:?}, diag={}", args.x1, args.x2, args.diag);

    let outputs = quick::evaluate_files(&args.config, &args.x1, args.x2.as_ref(), args.diag)?;
    let labels: Vec<String> = if outputs.len() == 1 {
        vec![String::new()]
    } else {
        (0..outputs.len()).map(|i| format!("dimension {i}")).collect()
    };

    write_outputs(&outputs, &labels, args.output.as_ref())?;
    info!("Wrote {} output block(s)", outputs.len());
    Ok(())
}

fn gradient_command(args: GradientArgs) -> Result<()> {
    info!("Computing kernel gradient from {:?}", args.config);

    let outputs = quick::gradient_files(
        &args.config,
        &args.x1,
        args.x2.as_ref(),
        args.diag,
        args.log_space,
    )?;
    let prefix = if args.log_space {
        "d/dlog(lengthscale)"
    } else {
        "d/dlengthscale"
    };
    let labels: Vec<String> = (0..outputs.len())
        .map(|i| format!("{prefix}[{i}]"))
        .collect();

    write_outputs(&outputs, &labels, args.output.as_ref())
}

fn info_command(args: InfoArgs) -> Result<()> {
    let config = KernelConfig::load_from_file(&args.config)?;
    config.print_summary()?;

    let summary = KernelSummary::from_config(&config)?;
    println!("Minimum similarity: {:.6}", summary.min_similarity());
    Ok(())
}

fn init_command(args: InitArgs) -> Result<()> {
    let mut config = KernelConfig::new(args.categories).with_last_dim_is_batch(args.last_dim_is_batch);
    if let Some(lengthscale) = args.lengthscale {
        config = config.with_lengthscale(lengthscale);
    }

    // Fail before writing anything invalid
    config.to_kernel()?;
    config.lengthscale()?;

    config.save_to_file(&args.output)?;
    println!("Configuration saved to {:?}", args.output);
    Ok(())
}

fn write_outputs(
    outputs: &[KernelOutput],
    labels: &[String],
    path: Option<&PathBuf>,
) -> Result<()> {
    let mut writer: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(KernelError::IoError)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    for (output, label) in outputs.iter().zip(labels) {
        if !label.is_empty() {
            writeln!(writer, "# {label}")?;
        }
        match output {
            KernelOutput::Full(matrix) => {
                for i in 0..matrix.rows() {
                    let row: Vec<String> = matrix.row(i).iter().map(|v| v.to_string()).collect();
                    writeln!(writer, "{}", row.join(","))?;
                }
            }
            KernelOutput::Diagonal(values) => {
                for v in values {
                    writeln!(writer, "{v}")?;
                }
            }
        }
    }

    writer.flush()?;
    Ok(())
}
