//! Command-line interface for logsynth
//!
//! # Usage Examples
//!
//! ```bash
//! # Run a configuration with a fixed master seed
//! logsynth run -c logsynth.yml --seed 42
//!
//! # Run with a master seed drawn from OS entropy (logged at startup)
//! logsynth run -c logsynth.yml --randomize
//!
//! # Print ten generic CEF records using a generator section from a file
//! logsynth generate --type generic:cef -c cef.yml --count 10
//!
//! # List generator types
//! logsynth list
//! ```
//!
//! Set `RUST_LOG=info` to see per-runner metrics.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use logsynth::{build_runners, run_all, Config};
use logsynth_generator::{derive_rng, Registry};
use rand::rngs::OsRng;
use rand::RngCore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Master seed when neither the command line nor the config sets one.
const DEFAULT_SEED: u64 = 1;

#[derive(Parser)]
#[command(name = "logsynth")]
#[command(about = "Generate synthetic log records for ingest pipeline testing")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every runner in a configuration file
    Run {
        /// Path to the YAML run configuration
        #[arg(short, long, env = "LOGSYNTH_CONFIG")]
        config: PathBuf,

        /// Master seed (overrides the config's `seed`)
        #[arg(long, conflicts_with = "randomize")]
        seed: Option<u64>,

        /// Draw the master seed from OS entropy
        #[arg(long)]
        randomize: bool,
    },

    /// Print records from one generator to stdout
    Generate {
        /// Generator type, e.g. aws:vpcflow
        #[arg(short = 't', long = "type", required_unless_present = "config")]
        generator_type: Option<String>,

        /// Number of records to print
        #[arg(short = 'n', long, default_value_t = 10)]
        count: u64,

        /// Seed for the generator's random stream
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// YAML file holding the generator section (`--type` overrides its `type`)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the registered generator types
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Logs go to stderr so `generate` output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = Registry::builtin()?;

    match cli.command {
        Commands::Run {
            config,
            seed,
            randomize,
        } => run_config(&registry, &config, seed, randomize).await?,
        Commands::Generate {
            generator_type,
            count,
            seed,
            config,
        } => {
            let section = generator_section(generator_type, config.as_deref())?;
            let mut generator = registry
                .build(&section, derive_rng(seed, 0))
                .context("Failed to build generator")?;

            let stdout = std::io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            for _ in 0..count {
                let record = generator.next_record()?;
                out.write_all(&record)?;
                out.write_all(b"\n")?;
            }
            out.flush()?;
        }
        Commands::List => {
            for name in registry.names() {
                println!("{name}");
            }
        }
    }

    Ok(())
}

async fn run_config(
    registry: &Registry,
    path: &Path,
    seed: Option<u64>,
    randomize: bool,
) -> anyhow::Result<()> {
    let config = Config::from_file(path)
        .with_context(|| format!("Failed to load config from {path:?}"))?;

    let master_seed = if randomize {
        OsRng.next_u64()
    } else {
        seed.or(config.seed).unwrap_or(DEFAULT_SEED)
    };
    info!("Using master seed {master_seed}");

    let runners = build_runners(&config, registry, master_seed).await?;
    info!("Starting {} runners", runners.len());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received interrupt signal (Ctrl+C)");
                on_interrupt.cancel();
            }
            Err(e) => warn!("Failed to install Ctrl+C handler: {e}"),
        }
    });

    let metrics = run_all(runners, cancel).await?;
    let records: u64 = metrics.iter().map(|m| m.records).sum();
    let bytes: u64 = metrics.iter().map(|m| m.bytes).sum();
    info!("Wrote {records} records ({bytes} bytes) across {} runners", metrics.len());
    Ok(())
}

/// The generator section for `generate`: the file's mapping, if any, with
/// `type` replaced by `--type`.
fn generator_section(
    generator_type: Option<String>,
    config: Option<&Path>,
) -> anyhow::Result<serde_yaml::Value> {
    let mut section = match config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read generator config {path:?}"))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse generator config {path:?}"))?
        }
        None => serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
    };

    if let Some(name) = generator_type {
        if section.is_null() {
            section = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());
        }
        section
            .as_mapping_mut()
            .context("generator config must be a YAML mapping")?
            .insert("type".into(), name.into());
    }
    Ok(section)
}
