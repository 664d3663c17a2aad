//! btc-batch-signer: command-line front end for the batch payment signer.
//!
//! The mnemonic is read from `BTC_SECRET_JSON` (`{"BTC_MNEMONIC": "..."}`),
//! the network from `--network` or `BTC_NETWORK`.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use btc_batch_signer::config::NETWORK_ENV;
use btc_batch_signer::{generate_wallet, EnvSecretStore, Network, PaymentHandler, SignerConfig};

/// Build and sign Bitcoin batch payments.
#[derive(Parser)]
#[command(name = "btc-batch-signer")]
#[command(version, about = "Build and sign Bitcoin batch payment transactions.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh mnemonic and print its wallet as JSON.
    Generate(NetworkArgs),
    /// Print the wallet address derived from the configured secret.
    Address(NetworkArgs),
    /// Sign a payment request read from a file or stdin.
    Sign(SignArgs),
}

#[derive(Args)]
struct NetworkArgs {
    /// Network (mainnet or testnet). Defaults to BTC_NETWORK.
    #[arg(short, long)]
    network: Option<Network>,
}

#[derive(Args)]
struct SignArgs {
    #[command(flatten)]
    network: NetworkArgs,

    /// JSON file holding `{ "data": <request> }` or a bare request (default: stdin).
    payload: Option<PathBuf>,
}

fn load_config(args: &NetworkArgs) -> Result<SignerConfig> {
    let config = match args.network {
        Some(network) => SignerConfig::from_lookup(|key| {
            if key == NETWORK_ENV {
                Some(network.to_string())
            } else {
                env::var(key).ok()
            }
        }),
        None => SignerConfig::from_env(),
    }
    .context("Failed to load configuration")?;

    config.apply();
    Ok(config)
}

fn read_payload(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read payload from stdin")?;
            Ok(buffer)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Generate(args) => {
            let config = load_config(&args)?;
            let wallet = generate_wallet(config.network)?;
            println!("{}", serde_json::to_string_pretty(&wallet)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Address(args) => {
            let config = load_config(&args)?;
            let handler = PaymentHandler::new(EnvSecretStore::default(), config.network);
            println!("{}", handler.wallet_address()?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Sign(args) => {
            let config = load_config(&args.network)?;
            let payload = read_payload(args.payload.as_ref())?;
            let event: Value = serde_json::from_str(&payload).context("Payload is not valid JSON")?;

            let handler = PaymentHandler::new(EnvSecretStore::default(), config.network);
            let response = match event.get("data") {
                Some(_) => handler.handle(&event),
                None => handler.handle_data(&event),
            };

            println!("{}", response.to_json());
            Ok(if response.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
