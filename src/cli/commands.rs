use crate::analyzers::SummaryStatistics;
use crate::cli::args::{Cli, Commands, EtlArgs, ServeArgs};
use crate::config::{AppConfig, EtlConfig, ServerConfig, StoreBackend};
use crate::error::Result;
use crate::processors::{EtlPipeline, EtlSummary};
use crate::query::Predicate;
use crate::readers::CsvTableReader;
use crate::server;
use crate::store::{open_store, RecordStore};
use crate::utils::progress::ProgressReporter;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber; `RUST_LOG` wins over `--verbose`
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", default_level)));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Etl { etl } => {
            let etl_config = apply_etl_args(config.etl.clone(), &etl);
            if config.store.backend == StoreBackend::Memory {
                warn!("memory store selected; loaded records are discarded on exit");
            }

            let store = open_store(&config.store)?;
            let summary = run_etl(etl_config, store).await?;
            println!("\n{}", summary.generate_summary());
        }

        Commands::Serve { server } => {
            let server_config = apply_serve_args(config.server.clone(), &server);
            let store = open_store(&config.store)?;
            info!(documents = store.count(&Predicate::all())?, "serving existing records");
            server::serve(&server_config, store).await?;
        }

        Commands::Run { etl, server } => {
            let etl_config = apply_etl_args(config.etl.clone(), &etl);
            let server_config = apply_serve_args(config.server.clone(), &server);

            let store = open_store(&config.store)?;
            let summary = run_etl(etl_config, Arc::clone(&store)).await?;
            println!("\n{}", summary.generate_summary());

            server::serve(&server_config, store).await?;
        }

        Commands::Stats => {
            let store = open_store(&config.store)?;
            let observations = store.find_all(&Predicate::all())?;

            println!("Store: {}", store.describe());
            println!("Documents: {}\n", observations.len());
            println!("{}", SummaryStatistics::new().summarize(&observations).detailed_summary());
        }
    }

    Ok(())
}

fn apply_etl_args(mut config: EtlConfig, args: &EtlArgs) -> EtlConfig {
    if let Some(dir) = &args.raw_dir {
        config.raw_dir = dir.clone();
    }
    if let Some(dir) = &args.cleaned_dir {
        config.cleaned_dir = dir.clone();
    }
    if args.no_export {
        config.export_cleaned = false;
    }
    if let Some(workers) = args.max_workers {
        config.max_workers = workers;
    }
    config
}

fn apply_serve_args(mut config: ServerConfig, args: &ServeArgs) -> ServerConfig {
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    config
}

/// File cleaning is CPU-bound rayon work, so it runs off the async runtime
async fn run_etl(config: EtlConfig, store: Arc<dyn RecordStore>) -> Result<EtlSummary> {
    info!(
        raw_dir = %config.raw_dir.display(),
        workers = config.max_workers,
        export = config.export_cleaned,
        "starting ETL"
    );

    tokio::task::spawn_blocking(move || {
        let file_count = CsvTableReader::new().find_csv_files(&config.raw_dir)?.len();
        let progress =
            ProgressReporter::new_files(file_count as u64, "Cleaning raw exports...", false);

        let cleaned_dir = config.export_cleaned.then(|| config.cleaned_dir.clone());
        EtlPipeline::new(config.max_workers)
            .with_cleaned_dir(cleaned_dir)
            .run(&config.raw_dir, store.as_ref(), Some(&progress))
    })
    .await?
}
