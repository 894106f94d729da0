use anyhow::Result;
use axum::Router;
use clap::Parser;
use docsearch_core::persist::DEFAULT_INDEX_FILE;
use docsearch_server::{build_app, ServerConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Document root
    #[arg(long, default_value = "./docs")]
    root: String,
    /// Index file path
    #[arg(long, default_value = DEFAULT_INDEX_FILE)]
    index: String,
    /// Host to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = ServerConfig::from_env(&args.root, &args.index);
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, root = %args.root, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
