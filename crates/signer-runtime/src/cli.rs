//! Command-line arguments.

use crate::container::{Network, SignerConfig};
use clap::Parser;
use shared_types::Id;
use std::net::{IpAddr, SocketAddr};

/// warp-signer: collect a quorum signature for a subnet-to-L1 conversion
#[derive(Parser, Debug)]
#[command(name = "warp-signer")]
#[command(about = "Derive a conversion attestation and aggregate validator signatures over it")]
pub struct Args {
    /// ID of the conversion transaction (CB58)
    pub tx_id: Id,

    /// Host IP address of the primary peer
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// HTTP API port of the primary peer
    #[arg(long)]
    pub port: Option<u16>,

    /// Ledger network
    #[arg(long, value_enum)]
    pub network: Option<Network>,

    /// Platform API base URL
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Percentage of stake that must sign
    #[arg(short, long)]
    pub quorum: Option<u64>,

    /// Attempts before giving up
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Extra peer to contact (repeatable)
    #[arg(long = "peer")]
    pub peers: Vec<SocketAddr>,
}

impl Args {
    /// Overlay flags that were given onto `config`.
    pub fn apply(&self, config: &mut SignerConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(quorum) = self.quorum {
            config.quorum_numerator = quorum;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
        for peer in &self.peers {
            if !config.peers.contains(peer) {
                config.peers.push(*peer);
            }
        }
    }
}
