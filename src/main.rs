//! ferrite-gan CLI
//!
//! Trains a DCGAN on MNIST, or renders a grid of digits from a saved
//! generator.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ferrite_gan::output::{grid, load_generator};
use ferrite_gan::{Dataset, DiskSampler, GanConfig, GanSession};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "ferrite-gan")]
#[command(about = "From-scratch DCGAN trainer for MNIST", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a generator/discriminator pair
    Train {
        /// JSON config file; missing fields take their defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding the MNIST IDX files
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Root directory for samples, models and loss records
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        #[arg(short, long)]
        epochs: Option<usize>,

        #[arg(short, long)]
        batch_size: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        sample_interval: Option<usize>,

        #[arg(long)]
        report_interval: Option<usize>,

        /// Write the effective config to this file and exit
        #[arg(long)]
        dump_config: Option<PathBuf>,
    },

    /// Render a grid of digits from a saved generator
    Sample {
        /// generator.json or gan.json
        #[arg(short, long)]
        model: PathBuf,

        /// Output PNG
        #[arg(short, long, default_value = "samples.png")]
        out: PathBuf,

        #[arg(long, default_value = "5")]
        rows: usize,

        #[arg(long, default_value = "5")]
        cols: usize,

        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Train {
            config,
            data_dir,
            output_dir,
            epochs,
            batch_size,
            seed,
            sample_interval,
            report_interval,
            dump_config,
        } => {
            let mut config = match config {
                Some(path) => GanConfig::load_json(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => GanConfig::default(),
            };
            if let Some(dir) = output_dir {
                config.paths = config.paths.with_output_root(dir);
            }
            if let Some(dir) = data_dir {
                config.paths.data_dir = dir;
            }
            if let Some(v) = epochs {
                config.epochs = v;
            }
            if let Some(v) = batch_size {
                config.batch_size = v;
            }
            if let Some(v) = seed {
                config.seed = v;
            }
            if let Some(v) = sample_interval {
                config.sample_interval = v;
            }
            if let Some(v) = report_interval {
                config.report_interval = v;
            }
            config.validate()?;

            if let Some(path) = dump_config {
                config.save_json(&path)?;
                info!("Wrote config to {}", path.display());
                return Ok(());
            }

            train(config)
        }

        Commands::Sample { model, out, rows, cols, seed } => {
            let generator = load_generator(&model)
                .with_context(|| format!("loading generator {}", model.display()))?;
            let mut rng = StdRng::seed_from_u64(seed);
            let images = generator.generate_random(rows * cols, &mut rng)?;
            grid::save_grid(&images, rows, cols, &out)?;
            info!("Saved {}x{} grid to {}", rows, cols, out.display());
            Ok(())
        }
    }
}

fn train(config: GanConfig) -> Result<()> {
    let dataset = Dataset::load_mnist(&config.paths.data_dir)
        .with_context(|| format!("loading MNIST from {}", config.paths.data_dir.display()))?;

    // Preview latents get their own stream, offset from the training seed.
    let mut sampler = DiskSampler::new(config.paths.clone(), config.grid, config.seed.wrapping_add(1))?;

    let epochs = config.epochs;
    let mut session = GanSession::new(config, dataset)?;
    session.run(epochs, &mut sampler)?;
    let summary = session.finalize(&mut sampler)?;

    info!("Training complete: {} epochs", summary.epochs);
    Ok(())
}
