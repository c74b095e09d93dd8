use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use aura_relay::config::{Config, BASE_URL_ENV};
use aura_relay::domains::envelope::{DeliveryContext, InboundMessage};
use aura_relay::error::{AuraRelayError, Result};
use aura_relay::factories::relay_factory::RelayFactory;
use aura_relay::interfaces::queue::QueuePublisher;
use aura_relay::services::queue::ChannelPublisher;

#[derive(Parser, Debug)]
#[command(name = "aura-relay")]
#[command(about = "Run Aura gateway relay handlers once from the command line")]
struct Cli {
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, env = BASE_URL_ENV)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Handle one queue message and print what would be published.
    Dispatch {
        #[arg(long)]
        message: String,

        #[arg(long, default_value_t = 1)]
        attempts: u32,
    },
    /// Send a single heartbeat.
    Heartbeat,
    /// Print the endpoint a type tag maps to.
    Resolve {
        #[arg(long = "type")]
        type_tag: String,
    },
    /// Print upcoming heartbeat times (UTC).
    Schedule {
        #[arg(long, default_value_t = 5)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }

    let (channel, mut outbound) = ChannelPublisher::new();
    let publisher: Arc<dyn QueuePublisher> = match RelayFactory::publisher_from_config(&config) {
        Some(publisher) => publisher,
        None => Arc::new(channel),
    };
    let relay = RelayFactory::create_from_config(&config, publisher)?;

    match cli.command {
        Commands::Dispatch { message, attempts } => {
            let ctx = DeliveryContext::with_delivery_count(attempts);
            let outcome = relay
                .handle_message(InboundMessage::Text(message), &ctx)
                .await?;
            print_json(&outcome)?;
            while let Ok(published) = outbound.try_recv() {
                print_json(&published)?;
            }
        }
        Commands::Heartbeat => {
            relay.heartbeat().await?;
            println!("heartbeat ok: {}", relay.heartbeat_url());
        }
        Commands::Resolve { type_tag } => {
            println!("{}", relay.resolve(&type_tag));
        }
        Commands::Schedule { count } => {
            let schedule = relay.heartbeat_schedule();
            println!("schedule: {schedule}");
            for at in schedule.upcoming(OffsetDateTime::now_utc(), count) {
                let formatted = at
                    .format(&Rfc3339)
                    .map_err(|e| AuraRelayError::Runtime(e.to_string()))?;
                println!("{formatted}");
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| AuraRelayError::Serialization(e.to_string()))?;
    println!("{text}");
    Ok(())
}
