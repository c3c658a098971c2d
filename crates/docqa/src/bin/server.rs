//! docqa server binary
//!
//! Run with: cargo run -p docqa --bin docqa-server -- --config docqa.toml

use clap::Parser;
use docqa::{config::QaConfig, server::QaServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Single-document question answering server
#[derive(Debug, Parser)]
#[command(name = "docqa-server", version, about)]
struct Args {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Override server.host
    #[arg(long, env = "DOCQA_HOST")]
    host: Option<String>,

    /// Override server.port
    #[arg(short, long, env = "DOCQA_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docqa=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                          docqa                            ║
║          Ask questions about a single document            ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let mut config = match &args.config {
        Some(path) => QaConfig::from_file(path)?,
        None => QaConfig::default(),
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Service: {}", config.openai.base_url);
    tracing::info!("  - Chat model: {}", config.openai.chat_model);
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!(
        "  - Chunk size: {} (overlap {})",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Locale: {:?}", config.ui.locale);

    let server = QaServer::new(config)?;

    println!("\nServer starting...");
    println!("  Page: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
