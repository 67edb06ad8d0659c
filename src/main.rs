use anyhow::Context;
use clap::Parser;
use water_quality_processor::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional .env; a missing file is not an error
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    run(cli).await.context("water-quality-processor failed")
}
