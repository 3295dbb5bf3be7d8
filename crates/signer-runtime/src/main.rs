//! # warp-signer
//!
//! Prints the aggregated signed attestation for a subnet-to-L1 conversion.
//!
//! ```text
//! warp-signer <TX_ID> [--host H] [--port P] [--network fuji|mainnet|local]
//!             [--endpoint URL] [--quorum N] [--max-attempts N] [--peer ADDR]...
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use signer_runtime::{format_signature, Args, SignerConfig, SignerRuntime};
use signer_telemetry::{init_logging, TelemetryConfig};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&TelemetryConfig::from_env()).context("failed to initialise logging")?;

    let mut config = SignerConfig::from_env().context("invalid environment configuration")?;
    args.apply(&mut config);

    let runtime = SignerRuntime::new(config).context("invalid configuration")?;
    let signed = runtime.sign(args.tx_id).await?;
    let bytes = signed.encode().context("failed to encode signed message")?;

    println!("Here is your signature, paste it into the toolbox:");
    println!("{}", format_signature(&bytes));

    if let Ok(metrics) = runtime.metrics_text() {
        debug!("Run metrics:\n{}", metrics);
    }
    Ok(())
}
