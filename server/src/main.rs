use anyhow::Result;
use axum::Router;
use clap::Parser;
use concierge_core::config::{DEFAULT_MIN_SIMILARITY, DEFAULT_TOP_K};
use concierge_core::{IdfWeighting, IndexConfig};
use server::{build_app, AppConfig, DEFAULT_CHAT_TOP_K};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "server", about = "Digital concierge chat and knowledge-base API")]
struct Args {
    /// Asset records (.json / .jsonl file or directory); sample assets when omitted
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Knowledge-base results passed to the responder per chat message
    #[arg(long, default_value_t = DEFAULT_CHAT_TOP_K)]
    chat_top_k: usize,
    /// Default result count for index searches
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
    /// Results must score strictly above this cosine similarity
    #[arg(long, default_value_t = DEFAULT_MIN_SIMILARITY)]
    min_similarity: f64,
    /// IDF weighting: classic or smoothed
    #[arg(long, default_value_t = IdfWeighting::default())]
    idf: IdfWeighting,
    /// Token required in X-ADMIN-TOKEN for mutating endpoints
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = AppConfig {
        index: IndexConfig { min_similarity: args.min_similarity, default_top_k: args.top_k, idf: args.idf },
        chat_top_k: args.chat_top_k,
        assets_path: args.assets,
        admin_token: args.admin_token,
    };
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
