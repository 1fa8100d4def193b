//! SsakDB command line: lookup server, bulk upload and one-off lookups.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use ssakdb::config::Config;
use ssakdb::gateway::{GatewayState, create_router};
use ssakdb::ingest::{BulkUploader, UploadConfig};
use ssakdb::{CollectionStats, FirestoreClient, KnowledgeCaches, KnowledgeResolver, LabelTable};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Parser)]
#[command(name = "ssakdb", version, about = "Rubric and exemplar knowledge base")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP lookup gateway.
    Serve,
    /// Upload a tree of markdown sources.
    Upload {
        dir: PathBuf,
        /// Parse and report without writing.
        #[arg(long)]
        dry_run: bool,
    },
    /// Resolve one rubric and print it as JSON.
    Rubric {
        #[arg(long)]
        grade_level: String,
        #[arg(long)]
        genre: String,
        #[arg(long)]
        domain: String,
    },
    /// Resolve one exemplar and print it as JSON.
    Example {
        #[arg(long)]
        grade_level: String,
        #[arg(long)]
        genre: String,
        #[arg(long)]
        level: String,
    },
    /// Print the summary written by the last upload.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    match cli.command {
        Command::Serve => serve(&config).await,
        Command::Upload { dir, dry_run } => upload(&config, dir, dry_run).await,
        Command::Rubric {
            grade_level,
            genre,
            domain,
        } => {
            let resolver = build_resolver(&config)?;
            let resolution = resolver
                .resolve_rubric_traced(&grade_level, &genre, &domain)
                .await;
            tracing::info!(source = %resolution.source, "rubric lookup finished");
            println!("{}", serde_json::to_string_pretty(&resolution.record)?);
            Ok(())
        }
        Command::Example {
            grade_level,
            genre,
            level,
        } => {
            let resolver = build_resolver(&config)?;
            let resolution = resolver
                .resolve_example_traced(&grade_level, &genre, &level)
                .await;
            tracing::info!(source = %resolution.source, "example lookup finished");
            println!("{}", serde_json::to_string_pretty(&resolution.record)?);
            Ok(())
        }
        Command::Stats => {
            let store = open_store(&config)?;
            match CollectionStats::fetch(&store).await? {
                Some(stats) => println!("{}", serde_json::to_string_pretty(&stats)?),
                None => tracing::warn!("no upload summary found"),
            }
            Ok(())
        }
    }
}

fn open_store(config: &Config) -> anyhow::Result<FirestoreClient> {
    config.require_project_id()?;
    Ok(FirestoreClient::from_config(config)?)
}

fn build_resolver(config: &Config) -> anyhow::Result<KnowledgeResolver<FirestoreClient>> {
    let labels = match &config.labels_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading label table");
            LabelTable::load(path)?
        }
        None => LabelTable::builtin(),
    };
    let store = open_store(config)?;

    Ok(KnowledgeResolver::new(
        store,
        labels,
        KnowledgeCaches::new(config.cache_ttl),
    ))
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config.socket_addr().parse()?;
    let resolver = Arc::new(build_resolver(config)?);

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        emulator = config.emulator_host.is_some(),
        "SsakDB gateway starting"
    );

    let app = create_router(GatewayState::new(resolver));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("SsakDB shutdown complete");
    Ok(())
}

async fn upload(config: &Config, dir: PathBuf, dry_run: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let uploader = BulkUploader::new(store, UploadConfig::from_config(config))?;

    if dry_run {
        let plan = uploader.plan(&dir)?;
        for planned in &plan.documents {
            println!("{}/{}", planned.collection, planned.document.id);
        }
        for skipped in &plan.skipped {
            println!("skipped {}: {}", skipped.path.display(), skipped.reason);
        }
        tracing::info!(
            documents = plan.len(),
            skipped = plan.skipped.len(),
            "dry run complete, nothing written"
        );
        return Ok(());
    }

    let report = uploader.upload(&dir).await?;
    for (collection, count) in &report.stats.collections {
        println!("{collection}: {count}");
    }
    println!(
        "{} documents in {} batches, {} skipped",
        report.documents_written,
        report.batches_committed,
        report.skipped.len()
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
