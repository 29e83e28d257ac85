mod colors;
mod config;
mod error;
mod globe;
mod help;
mod render;
mod settings;
mod terminal;
mod viz;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::GlobeConfig;
use settings::Settings;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "termglobe")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.1.0")]
#[command(about = "Animated dot globe with country connectors, drawn in braille", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the live globe animation
    Run {
        /// Animation speed (seconds per frame)
        #[arg(short, long, default_value = "0.016")]
        time: f32,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Dataset JSON (map size, countries, points)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Starting country key
        #[arg(short, long)]
        country: Option<String>,

        /// Number of traveling dots
        #[arg(long)]
        dots: Option<usize>,

        /// Color scheme (0-9)
        #[arg(long)]
        scheme: Option<u8>,

        /// Write logs to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Render one frame off-screen and print it
    Print {
        /// Frames to advance before printing (default: until the intro ends)
        #[arg(short, long)]
        frames: Option<u32>,

        /// Width in terminal columns
        #[arg(short = 'W', long, default_value = "80")]
        width: u16,

        /// Height in terminal rows
        #[arg(short = 'H', long, default_value = "24")]
        height: u16,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Dataset JSON (map size, countries, points)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Starting country key
        #[arg(short, long)]
        country: Option<String>,

        /// Color scheme (0-9)
        #[arg(long)]
        scheme: Option<u8>,

        /// Plain text, no ANSI colors
        #[arg(short, long)]
        mono: bool,
    },

    /// List the dataset's countries
    Countries {
        /// Dataset JSON (map size, countries, points)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

/// Logs go to `log_file` when given, else to stderr when allowed, else nowhere
fn init_logging(log_file: Option<&Path>, stderr: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None if stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}

/// Defaults, then the settings file
fn base_config() -> GlobeConfig {
    let mut config = GlobeConfig::default();
    Settings::load().apply(&mut config);
    config
}

fn override_common(config: &mut GlobeConfig, seed: Option<u64>, data: Option<PathBuf>, country: Option<String>, scheme: Option<u8>) {
    if seed.is_some() {
        config.seed = seed;
    }
    if data.is_some() {
        config.data_path = data;
    }
    if let Some(country) = country {
        config.props.starting_country = country;
    }
    if let Some(scheme) = scheme {
        config.color_scheme = scheme.min(9);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { time, seed, data, country, dots, scheme, log_file } => {
            init_logging(log_file.as_deref(), false)?;
            let mut config = base_config();
            override_common(&mut config, seed, data, country, scheme);
            config.time_step = time.max(0.0);
            if let Some(dots) = dots {
                config.props.dots_amount = dots;
            }
            config.validate().context("invalid configuration")?;
            viz::run(&config).context("globe animation failed")?;
        }
        Commands::Print { frames, width, height, seed, data, country, scheme, mono } => {
            init_logging(None, true)?;
            let mut config = base_config();
            override_common(&mut config, seed, data, country, scheme);
            config.validate().context("invalid configuration")?;
            viz::print(&config, frames, width, height, !mono).context("printing frame failed")?;
        }
        Commands::Countries { data } => {
            init_logging(None, true)?;
            let mut config = base_config();
            override_common(&mut config, None, data, None, None);
            viz::countries(&config).context("listing countries failed")?;
        }
    }

    Ok(())
}
