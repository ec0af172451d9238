use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::{debug, LevelFilter};

use tensorlab::core::DevicePreference;
use tensorlab::exercises::{run_all, Exercise, ExerciseConfig};

/// Run the TensorLab tensor fundamentals exercises.
#[derive(Parser)]
#[command(name = "tensorlab", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Random seed every exercise starts from (default 7).
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Device for new tensors: auto, cpu, cuda or cuda:N.
    #[arg(long, global = true)]
    device: Option<DevicePreference>,

    /// JSON configuration file; flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Run every exercise in order.
    All,
    /// 7×7 random matrix times the transpose of a 1×7 random row.
    Matmul,
    /// 2×3 @ (2×3)ᵀ product with argmin/argmax.
    Extrema,
    /// Random integers of shape (1, 1, 1, 10) squeezed to (10,).
    Squeeze,
}

#[derive(ValueEnum, Clone, Copy)]
enum Format {
    Text,
    Json,
}

impl Command {
    fn exercises(self) -> Vec<Exercise> {
        match self {
            Command::All => Exercise::ALL.to_vec(),
            Command::Matmul => vec![Exercise::Matmul],
            Command::Extrema => vec![Exercise::Extrema],
            Command::Squeeze => vec![Exercise::Squeeze],
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG, when set, takes precedence over -v.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_config(cli: &Cli) -> Result<ExerciseConfig> {
    let mut config = match &cli.config {
        Some(path) => ExerciseConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExerciseConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(device) = cli.device {
        config.device = device;
    }
    debug!("effective config: {config:?}");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let exercises = cli.command.unwrap_or(Command::All).exercises();
    let report = run_all(&config, &exercises).context("running exercises")?;

    match cli.format {
        Format::Text => println!("{report}"),
        Format::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing report")?
        ),
    }
    Ok(())
}
