use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod archive;
mod config;
mod fsutil;
mod scdl;
mod server;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0:8000")]
    listen: SocketAddr,

    /// Seconds to allow each scdl invocation before giving up
    #[arg(long, default_value_t = 900)]
    scdl_timeout: u64,

    /// Emit logs as JSON instead of plain text
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    if args.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    info!("Starting scdl-api...");

    let config = config::Config::new(args.listen, args.scdl_timeout);
    if config.auth_token.is_some() {
        info!("auth token loaded from SCDL_AUTH_TOKEN");
    }

    server::run(config).await
}
