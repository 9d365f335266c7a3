//! caipgate CLI
//!
//! Command-line interface for inspecting CAIP identifiers, encoded payloads
//! and gateway routing configs.

use anyhow::Result;
use caipgate_lib::digester::Algorithm;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod ui;

#[derive(Parser)]
#[command(name = "caipgate")]
#[command(about = "caipgate - Inspect chain-agnostic identifiers, payloads and routes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an identifier and show its parts and JSON form
    Parse {
        /// Identifier (e.g., eip155:1:0xab16...)
        identifier: String,
    },

    /// Match an identifier against a pattern where * stands for any value
    Match {
        /// Identifier to test
        identifier: String,

        /// Pattern (e.g., eip155:*:*)
        pattern: String,
    },

    /// Encode a value as <algorithm>.<data>
    Encode {
        /// Encoding algorithm (base64, json)
        #[arg(short, long, default_value = "base64")]
        algo: Algorithm,

        /// Value to encode; JSON text is parsed when encoding as json
        data: String,
    },

    /// Decode a payload, unwrapping nested layers
    Decode {
        /// Encoded payload (e.g., base64.ZWlwMTU1OjE)
        payload: String,
    },

    /// Decode key=value params and extract their CAIP data
    Select {
        /// Parameters as key=value
        #[arg(required = true)]
        params: Vec<String>,
    },

    /// Resolve the route serving an identifier's chain
    Resolve {
        /// Identifier or chain id
        identifier: String,

        /// Routing config file (defaults to CAIPGATE_CONFIG)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("caipgate=debug,caipgate_lib=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("caipgate=info,caipgate_lib=warn")
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Parse { identifier } => {
            commands::identifier::parse(&identifier, cli.verbose).await?;
        }
        Commands::Match {
            identifier,
            pattern,
        } => {
            if !commands::identifier::matches(&identifier, &pattern).await? {
                std::process::exit(1);
            }
        }
        Commands::Encode { algo, data } => {
            commands::payload::encode(&data, algo).await?;
        }
        Commands::Decode { payload } => {
            commands::payload::decode(&payload).await?;
        }
        Commands::Select { params } => {
            commands::payload::select(&params).await?;
        }
        Commands::Resolve { identifier, config } => {
            commands::route::resolve(config.as_deref(), &identifier, cli.verbose).await?;
        }
    }

    Ok(())
}
