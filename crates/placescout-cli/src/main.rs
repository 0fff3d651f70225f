mod lookup;
mod seed;


use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "placescout-cli")]
#[command(about = "PlaceScout operator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load activities from a YAML file into the local store
    Seed {
        /// Path to a YAML file containing a list of activities
        #[arg(long)]
        file: PathBuf,
    },
    /// Resolve nearby activities for a coordinate and print them as JSON
    Resolve {
        /// Origin latitude in degrees
        #[arg(long)]
        lat: f64,
        /// Origin longitude in degrees
        #[arg(long)]
        lng: f64,
        /// Initial search radius in meters
        #[arg(long, default_value = "2000.0")]
        radius: f64,
        /// Maximum number of activities to print
        #[arg(long, default_value = "3")]
        limit: usize,
        /// Candidate source ("external" or "local")
        #[arg(long, default_value = "local")]
        source: String,
        /// Filter candidates by category
        #[arg(long)]
        category: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Seed { file } => seed::run(&file).await,
        Commands::Resolve {
            lat,
            lng,
            radius,
            limit,
            source,
            category,
        } => lookup::run(lat, lng, radius, limit, &source, category).await,
    }
}
