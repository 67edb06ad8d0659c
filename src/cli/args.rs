use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "water-quality-processor")]
#[command(about = "Water-quality sensor CSV cleaner and query API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        help = "Config file layered over water-quality.toml and defaults"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean raw CSV exports and load them into the store
    Etl {
        #[command(flatten)]
        etl: EtlArgs,
    },

    /// Serve the query API
    Serve {
        #[command(flatten)]
        server: ServeArgs,
    },

    /// Run the ETL, then serve the query API from the same store
    Run {
        #[command(flatten)]
        etl: EtlArgs,

        #[command(flatten)]
        server: ServeArgs,
    },

    /// Print summary statistics for everything in the store
    Stats,
}

/// ETL overrides; anything left unset comes from configuration
#[derive(Args, Debug, Clone, Default)]
pub struct EtlArgs {
    #[arg(short, long, help = "Directory of raw CSV exports [default: data/raw]")]
    pub raw_dir: Option<PathBuf>,

    #[arg(long, help = "Directory for cleaned CSV copies [default: data/cleaned]")]
    pub cleaned_dir: Option<PathBuf>,

    #[arg(long, help = "Skip writing cleaned CSV copies")]
    pub no_export: bool,

    #[arg(long, help = "Worker threads for file cleaning [default: CPU count]")]
    pub max_workers: Option<usize>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Listen host [default: 127.0.0.1]")]
    pub host: Option<String>,

    #[arg(short, long, help = "Listen port [default: 5001]")]
    pub port: Option<u16>,
}
