//! # Warp Signer Runtime
//!
//! Library half of the `warp-signer` binary.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration, environment overrides, bootstrap peers
//! - `cli` - Command-line flags layered over the configuration
//! - `runtime` - Wiring of ledger client, deriver, peer network and aggregator
//!
//! ## Flow
//!
//! ```text
//! tx ID ──► ledger (platform.getTx) ──► WS-01 derive ──► unsigned message
//!                                                          │
//!                   peers ◄── warp.getMessageSignature ◄── WS-02 retry loop
//!                                                          │
//!                                                          ▼
//!                                               signed message (0x hex)
//! ```

pub mod cli;
pub mod container;
pub mod runtime;

pub use cli::Args;
pub use container::{bootstrap_peers, ConfigError, Network, SignerConfig};
pub use runtime::{format_signature, SignerRuntime};
