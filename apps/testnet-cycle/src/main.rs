//! Testnet cycle: mint, approve, supply, withdraw, borrow and repay every configured
//! token for each wallet in a key file, one transaction at a time.
//!
//! Usage: testnet-cycle [keys_file] [rpc_url]
//!
//! `keys_file` defaults to `data.txt` and holds one private key per line.
//! Token addresses, amounts and router addresses are fixed (see `CycleConfig::testnet`).

use std::str::FromStr;

use alloy::network::Ethereum;
use alloy::providers::RootProvider;
use anyhow::{Context, Result};
use clients_lendpool::LendPoolClient;
use cycle::{CycleConfig, CycleRunner};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_KEYS_FILE: &str = "data.txt";

#[tokio::main]
async fn main() {
    setup_logging();

    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let keys_file = args
        .get(1)
        .map(|s| s.trim())
        .unwrap_or(DEFAULT_KEYS_FILE);

    let mut config = CycleConfig::testnet()?;
    if let Some(rpc_url) = args.get(2) {
        config = config.with_rpc_url(rpc_url)?;
    }
    config.validate().context("invalid cycle configuration")?;

    let wallets = cycle::load_private_keys(keys_file)
        .with_context(|| format!("no usable private keys in {keys_file}"))?;
    info!(
        wallets = wallets.len(),
        tokens = config.tokens.len(),
        rpc = %config.rpc_url,
        "starting lending cycle"
    );

    // One connection for the whole run; each wallet layers its own signer on top.
    let connection = RootProvider::<Ethereum>::new_http(config.rpc_url.clone());
    let client_config = config.lend_pool_config();

    let mut runner = CycleRunner::new(&config, rand::rng());
    let report = runner
        .run_all(&wallets, |wallet| {
            Ok(LendPoolClient::new(
                &client_config,
                connection.clone(),
                wallet.signer.clone(),
            ))
        })
        .await;

    for wallet in &report.wallets {
        for step in wallet.failures() {
            warn!(
                wallet = %wallet.address,
                phase = %step.phase,
                symbol = %step.symbol,
                "step failed: {:?}",
                step.outcome
            );
        }
    }
    info!(
        wallets = report.wallets.len(),
        unreachable = report.unreachable.len(),
        confirmed = report.confirmed(),
        failed = report.failed(),
        "lending cycle finished"
    );
    Ok(())
}

fn setup_logging() {
    // A bare level gets the HTTP stack held at info; full directive strings are used as-is.
    let directives = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let directives = directives.trim();
    let filter_spec = if directives.contains(',') || directives.contains('=') {
        directives.to_string()
    } else {
        format!("{directives},hyper=info,hyper_util=info,reqwest=info,alloy_transport_http=info")
    };
    let filter = EnvFilter::from_str(&filter_spec).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();
}
