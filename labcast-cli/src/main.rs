//! labcast - command-line WHIP publisher.
//!
//! Posts a prepared SDP offer to the configured ingest origin and prints the
//! answer, or shows the endpoint a stream key publishes to.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use labcast_engine::BroadcastConfig;
use labcast_ipc::{StreamKey, StreamKeyError};
use labcast_transport::{IngestPublisher, WhipClient};

/// labcast - live broadcast publisher
#[derive(Parser, Debug)]
#[command(name = "labcast")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stream key issued by the live-streaming provider
    #[arg(long, env = "LABCAST_STREAM_KEY", hide_env_values = true, value_parser = parse_stream_key)]
    stream_key: StreamKey,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Publish an SDP offer and print the ingest answer
    Publish {
        /// File containing the local SDP offer
        #[arg(long)]
        offer: PathBuf,

        /// Write the answer SDP here instead of stdout
        #[arg(long)]
        answer_out: Option<PathBuf>,
    },

    /// Show the publish endpoint (stream key masked)
    Endpoint,
}

#[derive(Serialize)]
struct PublishOutput {
    status: u16,
    resource_url: Option<String>,
    answer: String,
}

#[derive(Serialize)]
struct EndpointOutput {
    endpoint: String,
}

fn parse_stream_key(raw: &str) -> Result<StreamKey, StreamKeyError> {
    StreamKey::new(raw.trim())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "labcast=debug,labcast_engine=debug,labcast_transport=debug,labcast_capture=debug"
                .into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = BroadcastConfig::load(cli.config.as_deref())?;
    let client = WhipClient::new(&config.ingest).context("Invalid ingest configuration")?;

    match cli.command {
        Commands::Publish { offer, answer_out } => {
            let offer_sdp = fs::read_to_string(&offer)
                .with_context(|| format!("Failed to read offer from {}", offer.display()))?;

            info!(stream_key = %cli.stream_key, "Publishing offer");
            let answer = client
                .publish(&cli.stream_key, &offer_sdp)
                .await
                .context("Publish failed")?;

            if let Some(path) = &answer_out {
                fs::write(path, &answer.sdp)
                    .with_context(|| format!("Failed to write answer to {}", path.display()))?;
                info!(path = %path.display(), "Answer written");
            }

            if cli.json {
                let output = PublishOutput {
                    status: answer.status,
                    resource_url: answer.resource_url.map(String::from),
                    answer: answer.sdp,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if answer_out.is_none() {
                print!("{}", answer.sdp);
            }
        }
        Commands::Endpoint => {
            let endpoint = client.masked_endpoint(&cli.stream_key)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&EndpointOutput { endpoint })?);
            } else {
                println!("{endpoint}");
            }
        }
    }

    Ok(())
}
