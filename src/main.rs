use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use docrag_core::ChunkAnnotations;
use docrag_core::bootstrap::{AppContext, create_drive_client, create_provider, load_config};
use docrag_core::config::Config;
use docrag_gateway::{AppState, GatewayServer};
use docrag_llm::any::AnyProvider;
use docrag_memory::document::MimeType;
use tokio::sync::watch;

/// Ask questions about your documents.
///
/// Uploaded files and Google Drive files are split into overlapping chunks,
/// embedded into a local vector index and answered from the closest passages.
#[derive(Parser)]
#[command(name = "docrag", version)]
struct Cli {
    /// Config file (TOML). Falls back to `DOCRAG_CONFIG`, then `config/default.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load, chunk and index a local file.
    Ingest {
        path: PathBuf,
        /// MIME type; guessed from the file extension when omitted.
        #[arg(long)]
        mime: Option<String>,
    },
    /// Index the files listed in the Drive metadata manifest.
    IngestDrive {
        /// Manifest path; defaults to `[drive] metadata_path`.
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// Download Drive files by id and write the metadata manifest.
    SyncDrive {
        #[arg(required = true)]
        file_ids: Vec<String>,
        /// Index the downloaded files afterwards.
        #[arg(long)]
        ingest: bool,
    },
    /// Answer a question from the index.
    Query {
        question: String,
        /// Number of passages to retrieve.
        #[arg(long)]
        k: Option<usize>,
    },
    /// Run the HTTP gateway.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Ingest { path, mime } => {
            let mime = match mime {
                Some(m) => m,
                None => guess_mime(&path)
                    .with_context(|| format!("cannot guess MIME type of {}, pass --mime", path.display()))?
                    .as_str()
                    .to_owned(),
            };
            let ctx = build_context(&config)?;
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            let report = ctx
                .ingest
                .ingest_file(
                    &path,
                    &mime,
                    ChunkAnnotations {
                        document_name: name,
                        web_view_link: None,
                    },
                )
                .await?;
            print_json(&report)
        }
        Command::IngestDrive { manifest } => {
            let ctx = build_context(&config)?;
            let manifest = manifest.unwrap_or_else(|| config.drive.metadata_path.clone());
            let report = ctx.ingest.ingest_drive(&manifest).await?;
            print_json(&report)
        }
        Command::SyncDrive { file_ids, ingest } => {
            let client = create_drive_client(&config)?;
            let files = client.sync(&file_ids).await?;
            tracing::info!(count = files.len(), "drive files synced");
            if ingest {
                let ctx = build_context(&config)?;
                let report = ctx.ingest.ingest_drive(client.metadata_path()).await?;
                print_json(&report)
            } else {
                print_json(&files)
            }
        }
        Command::Query { question, k } => {
            let ctx = build_context(&config)?;
            let answer = ctx.query.answer(&question, k).await?;
            print_json(&answer)
        }
        Command::Serve => serve(&config).await,
    }
}

fn build_context(config: &Config) -> anyhow::Result<AppContext<AnyProvider>> {
    let provider = create_provider(config)?;
    AppContext::build(config, provider)
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let ctx = build_context(config)?;
    if ctx.index.exists() {
        let total = ctx.index.count().await?;
        tracing::info!(chunks = total, "vector index loaded");
    } else {
        tracing::info!("no vector index yet, the first upload creates it");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let state = AppState::new(ctx, config.gateway.upload_dir.clone());
    GatewayServer::new(&config.gateway.bind, config.gateway.port, state, shutdown_rx)
        .with_max_body_size(config.gateway.max_body_size)
        .serve()
        .await?;
    Ok(())
}

fn guess_mime(path: &Path) -> Option<MimeType> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "htm" | "xhtml" => Some(MimeType::Html),
        other => MimeType::ALL.into_iter().find(|m| m.extension() == other),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_query_with_k() {
        let cli = Cli::try_parse_from(["docrag", "query", "What is the refund policy?", "--k", "5"])
            .unwrap();
        match cli.command {
            Command::Query { question, k } => {
                assert_eq!(question, "What is the refund policy?");
                assert_eq!(k, Some(5));
            }
            _ => panic!("expected query command"),
        }
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["docrag", "serve", "--config", "custom.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("custom.toml")));
    }

    #[test]
    fn sync_drive_requires_ids() {
        assert!(Cli::try_parse_from(["docrag", "sync-drive"]).is_err());
    }

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(guess_mime(Path::new("a/report.PDF")), Some(MimeType::Pdf));
        assert_eq!(guess_mime(Path::new("rows.csv")), Some(MimeType::Csv));
        assert_eq!(guess_mime(Path::new("page.htm")), Some(MimeType::Html));
        assert_eq!(guess_mime(Path::new("notes.txt")), Some(MimeType::PlainText));
        assert_eq!(guess_mime(Path::new("archive.zip")), None);
        assert_eq!(guess_mime(Path::new("README")), None);
    }
}
