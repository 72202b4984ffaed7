//! Brickworth - collectible set valuation engine

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

// Use the library crate
use brickworth::cli::commands;
use brickworth::config::ValuationConfig;

/// Brickworth - intrinsic value and deal analysis for collectible sets
#[derive(Parser)]
#[command(name = "brickworth")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "brickworth.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full valuation pipeline on a listing and print the verdict
    Evaluate {
        /// Listing JSON file ("-" for stdin)
        input: String,

        /// Quoted price to judge, in minor currency units
        /// (defaults to the listing's marketplace average)
        #[arg(long)]
        price: Option<u64>,

        /// Margin preset: conservative, balanced, or aggressive
        #[arg(long)]
        preset: Option<String>,

        /// Explicit margin-of-safety override, 0.05-0.50
        #[arg(long)]
        margin: Option<f64>,

        /// Expected holding period in years, for holding cost
        #[arg(long, default_value = "1.0")]
        holding_years: f64,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print demand/quality scores and the data-quality assessment
    Score {
        /// Listing JSON file ("-" for stdin)
        input: String,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Project value 1/3/5 years out
    Project {
        /// Listing JSON file ("-" for stdin)
        input: String,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("brickworth=info".parse().unwrap()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match ValuationConfig::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Evaluate {
            input,
            price,
            preset,
            margin,
            holding_years,
            json,
        } => commands::evaluate(
            &config,
            &input,
            price,
            preset.as_deref(),
            margin,
            holding_years,
            json,
        ),
        Commands::Score { input, json } => commands::score(&config, &input, json),
        Commands::Project { input, json } => commands::project(&config, &input, json),
        Commands::Config { json } => commands::show_config(&config, json),
    };

    if let Err(e) = result {
        error!("Command failed: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}
