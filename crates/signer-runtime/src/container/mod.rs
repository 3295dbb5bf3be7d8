//! # Signer Container
//!
//! Configuration for the signer and the values derived from it.

pub mod config;

pub use config::{bootstrap_peers, ConfigError, Network, SignerConfig, DEFAULT_PEER_PORT};
