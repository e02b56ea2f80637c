use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use solver_core::{Config, Extractor, FileContentMap, Ingestor, Orchestrator, Upload};
use solver_gateway::GatewayServer;
use solver_sandbox::CodeRunner;
use tokio::sync::watch;

#[derive(Parser)]
#[command(name = "tds-solver")]
#[command(about = "Answer data science assignment questions from a pattern bank or an LLM", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the TOML config (falls back to TDS_SOLVER_CONFIG, then config/default.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a single question and print the answer
    Ask {
        question: String,
        /// File to attach; repeat for several files
        #[arg(long = "file", short = 'f')]
        files: Vec<PathBuf>,
    },
    /// Run the fenced code blocks of a text or markdown file
    Run { file: PathBuf },
    /// Serve the HTTP API
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config);
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let ingestor = Ingestor::new(Extractor::new(config.extract));

    match cli.command {
        Command::Ask { question, files } => {
            let files = ingest_paths(ingestor, &files)?;
            let orchestrator = Orchestrator::from_config(&config);
            let answer = orchestrator.answer(&question, &files).await;
            println!("{answer}");
        }
        Command::Run { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let runner = CodeRunner::new(&config.sandbox);
            println!("{}", runner.execute_and_get_result(&text).await);
        }
        Command::Serve => serve(&config, ingestor).await?,
    }

    Ok(())
}

async fn serve(config: &Config, ingestor: Ingestor) -> anyhow::Result<()> {
    let orchestrator = Arc::new(Orchestrator::from_config(config));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let gateway = &config.gateway;
    GatewayServer::new(
        &gateway.bind,
        gateway.port,
        orchestrator,
        ingestor,
        shutdown_rx,
    )
    .with_auth(gateway.auth_token.as_ref().map(|t| t.expose().to_owned()))
    .with_rate_limit(gateway.rate_limit)
    .with_max_body_size(gateway.max_body_size)
    .serve()
    .await
    .context("gateway stopped with an error")
}

fn ingest_paths(ingestor: Ingestor, paths: &[PathBuf]) -> anyhow::Result<FileContentMap> {
    if paths.is_empty() {
        return Ok(FileContentMap::new());
    }
    let uploads = paths
        .iter()
        .map(|path| read_upload(path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    ingestor
        .ingest_uploads(&uploads)
        .context("failed to process attached files")
}

fn read_upload(path: &Path) -> anyhow::Result<Upload> {
    let data = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;
    Ok(Upload::new(name, data))
}

fn resolve_config_path(cli_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_path {
        return path;
    }
    if let Ok(path) = std::env::var("TDS_SOLVER_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // stdout carries the answer, keep logs on stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
