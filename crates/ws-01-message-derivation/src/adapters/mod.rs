//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits against a node's HTTP API.

mod json_rpc;
mod platform_client;

pub use json_rpc::{JsonRpcClient, RpcError, RpcErrorObject};
pub use platform_client::{PlatformLedgerClient, PLATFORM_API_PATH};
