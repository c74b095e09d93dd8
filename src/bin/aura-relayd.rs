use std::path::PathBuf;

use aura_relay::config::{Config, BASE_URL_ENV};
use aura_relay::daemon;
use aura_relay::error::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "aura-relayd")]
#[command(about = "Aura gateway queue relay and heartbeat daemon")]
struct Cli {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 7171)]
    port: u16,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, env = BASE_URL_ENV)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,aura_relay=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    daemon::run_with_shutdown(&cli.host, cli.port, config, shutdown).await
}
