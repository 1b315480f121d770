//! Facade extraction command-line tool.
//!
//! Reads an ASCII PCD scan, finds the dominant upright plane, removes sparse
//! clutter from it, and writes the remaining points as a PCD file with the
//! input's header.
//!
//! # Usage
//!
//! ```text
//! facade-extract scan.pcd facade.pcd
//! facade-extract scan.pcd facade.pcd --config facade.toml --seed 42 -v
//! ```
//!
//! # Exit status
//!
//! - `0` on success, and when called with the wrong number of positional
//!   arguments (the usage line is printed)
//! - `1` on I/O, parse, or configuration errors
//! - `2` when no upright plane was found; no output is written

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser};
use facade::{FacadeError, PipelineConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit status when the search finished without an upright plane.
const EXIT_NO_PLANE: u8 = 2;

/// Extract the dominant upright plane from a PCD point cloud
#[derive(Parser, Debug)]
#[command(name = "facade-extract")]
#[command(about = "Extract the dominant upright plane from a PCD point cloud", long_about = None)]
#[command(version)]
struct Cli {
    /// Input PCD file (ascii)
    #[arg(name = "INPUT")]
    input: PathBuf,

    /// Output PCD file
    #[arg(name = "OUTPUT")]
    output: PathBuf,

    /// TOML configuration file
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Random seed; overrides the configuration file
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Log debug output, including the density grid
    #[arg(long, short, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, short)]
    quiet: bool,
}

impl Cli {
    /// Log filter directive implied by the flags, if any.
    const fn level_override(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("warn")
        } else {
            None
        }
    }

    fn load_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if is_arity_error(&err) => {
            println!("{}", Cli::command().render_usage());
            return ExitCode::SUCCESS;
        }
        Err(err) => err.exit(),
    };

    init_logging(cli.level_override());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if is_no_plane(&err) => {
            eprintln!("no upright plane found; no output written");
            debug!("{err:#}");
            ExitCode::from(EXIT_NO_PLANE)
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    if let Some(seed) = config.seed {
        info!(seed, "Using fixed seed");
    }

    let result = facade::process_file(&cli.input, &cli.output, &config).with_context(|| {
        format!(
            "processing {} -> {}",
            cli.input.display(),
            cli.output.display()
        )
    })?;
    info!("{result}");

    println!(
        "Output file: {} was generated successfully",
        cli.output.display()
    );
    Ok(())
}

/// Missing or surplus positional arguments. Unknown flags are not arity
/// errors.
fn is_arity_error(err: &clap::Error) -> bool {
    match err.kind() {
        ErrorKind::MissingRequiredArgument
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => true,
        ErrorKind::UnknownArgument => !matches!(
            err.get(ContextKind::InvalidArg),
            Some(ContextValue::String(arg)) if arg.starts_with('-')
        ),
        _ => false,
    }
}

fn is_no_plane(err: &anyhow::Error) -> bool {
    err.downcast_ref::<FacadeError>()
        .is_some_and(FacadeError::is_no_plane)
}

/// Flags win over `RUST_LOG`; with neither, log at info.
fn init_logging(level_override: Option<&str>) {
    let filter = match level_override {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
