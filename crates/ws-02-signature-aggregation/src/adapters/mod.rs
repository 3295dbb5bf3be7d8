//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits for signature aggregation.

mod bls_aggregator;
mod http_peer_network;

pub use bls_aggregator::BlsCryptoAggregator;
pub use http_peer_network::{
    is_public_ip, peer_url, HttpPeerNetwork, PeerNetworkConfig, DEFAULT_REQUEST_TIMEOUT,
    INFO_API_PATH, WARP_API_PATH,
};
