//! # Signer Configuration
//!
//! Defaults, environment overrides and validation.
//!
//! Precedence is defaults, then `WS_*` environment variables, then
//! command-line flags.

use shared_types::Id;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use ws_01_message_derivation::{DEFAULT_FETCH_TIMEOUT, FUJI_ID, LOCAL_ID, MAINNET_ID};
use ws_02_signature_aggregation::adapters::{is_public_ip, DEFAULT_REQUEST_TIMEOUT};
use ws_02_signature_aggregation::{
    PeerNetworkConfig, RetryPolicy, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_QUORUM_NUMERATOR, QUORUM_DENOMINATOR,
};

/// Default HTTP API port of a peer node.
pub const DEFAULT_PEER_PORT: u16 = 9650;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Quorum numerator {0} outside 1..=100")]
    InvalidQuorum(u64),

    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("{0} must be positive")]
    ZeroTimeout(&'static str),

    #[error("Invalid endpoint URL {0:?}")]
    InvalidEndpoint(String),

    /// Peer host is private while private IPs are disallowed.
    #[error("Peer host {0} is not public and private IPs are not allowed")]
    PrivateHost(IpAddr),
}

/// Ledger network the signer talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Network {
    Mainnet,
    #[default]
    Fuji,
    Local,
}

impl Network {
    pub fn network_id(self) -> u32 {
        match self {
            Network::Mainnet => MAINNET_ID,
            Network::Fuji => FUJI_ID,
            Network::Local => LOCAL_ID,
        }
    }

    /// Public API endpoint used when none is configured.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            Network::Mainnet => "https://api.avax.network",
            Network::Fuji => "https://api.avax-test.network",
            Network::Local => "http://127.0.0.1:9650",
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "fuji" | "testnet" => Ok(Network::Fuji),
            "local" => Ok(Network::Local),
            other => Err(format!("unknown network {:?}", other)),
        }
    }
}

/// Complete signer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerConfig {
    pub network: Network,
    /// Platform API base URL. Falls back to the network's public endpoint.
    pub endpoint: Option<String>,
    /// Primary peer address.
    pub host: IpAddr,
    pub port: u16,
    /// Peers contacted in addition to the bootstrap set.
    pub peers: Vec<SocketAddr>,
    pub allow_private_ips: bool,
    /// Percentage of stake that must sign.
    pub quorum_numerator: u64,
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub retry_backoff: Duration,
    pub fetch_timeout: Duration,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            endpoint: None,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PEER_PORT,
            peers: Vec::new(),
            allow_private_ips: true,
            quorum_numerator: DEFAULT_QUORUM_NUMERATOR,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            retry_backoff: Duration::ZERO,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

fn parse_var<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

fn parse_millis(key: &'static str, value: String) -> Result<Duration, ConfigError> {
    parse_var::<u64>(key, value).map(Duration::from_millis)
}

fn parse_flag(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}

impl SignerConfig {
    /// Defaults overridden by `WS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = lookup("WS_NETWORK") {
            config.network = v
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "WS_NETWORK",
                    value: v,
                })?;
        }
        if let Some(v) = lookup("WS_ENDPOINT") {
            config.endpoint = Some(v);
        }
        if let Some(v) = lookup("WS_HOST") {
            config.host = parse_var("WS_HOST", v)?;
        }
        if let Some(v) = lookup("WS_PORT") {
            config.port = parse_var("WS_PORT", v)?;
        }
        if let Some(v) = lookup("WS_PEERS") {
            config.peers = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_var("WS_PEERS", s.to_string()))
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = lookup("WS_ALLOW_PRIVATE_IPS") {
            config.allow_private_ips = parse_flag("WS_ALLOW_PRIVATE_IPS", v)?;
        }
        if let Some(v) = lookup("WS_QUORUM") {
            config.quorum_numerator = parse_var("WS_QUORUM", v)?;
        }
        if let Some(v) = lookup("WS_MAX_ATTEMPTS") {
            config.max_attempts = parse_var("WS_MAX_ATTEMPTS", v)?;
        }
        if let Some(v) = lookup("WS_ATTEMPT_TIMEOUT_MS") {
            config.attempt_timeout = parse_millis("WS_ATTEMPT_TIMEOUT_MS", v)?;
        }
        if let Some(v) = lookup("WS_RETRY_BACKOFF_MS") {
            config.retry_backoff = parse_millis("WS_RETRY_BACKOFF_MS", v)?;
        }
        if let Some(v) = lookup("WS_FETCH_TIMEOUT_MS") {
            config.fetch_timeout = parse_millis("WS_FETCH_TIMEOUT_MS", v)?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=QUORUM_DENOMINATOR).contains(&self.quorum_numerator) {
            return Err(ConfigError::InvalidQuorum(self.quorum_numerator));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.attempt_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("attempt_timeout"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("fetch_timeout"));
        }
        if reqwest::Url::parse(self.endpoint()).is_err() {
            return Err(ConfigError::InvalidEndpoint(self.endpoint().to_string()));
        }
        if !self.allow_private_ips && !is_public_ip(self.host) {
            return Err(ConfigError::PrivateHost(self.host));
        }
        Ok(())
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.network.default_endpoint())
    }

    pub fn network_id(&self) -> u32 {
        self.network.network_id()
    }

    /// Bootstrap set followed by configured peers, without duplicates.
    pub fn peer_addresses(&self) -> Vec<SocketAddr> {
        let mut addrs = bootstrap_peers(self.host, self.port);
        for peer in &self.peers {
            if !addrs.contains(peer) {
                addrs.push(*peer);
            }
        }
        addrs
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: self.retry_backoff,
            attempt_timeout: self.attempt_timeout,
        }
    }

    /// Peer network settings that track `subnet_id`.
    pub fn peer_network_config(&self, subnet_id: Id) -> PeerNetworkConfig {
        PeerNetworkConfig {
            platform_api: self.endpoint().to_string(),
            bootstrap_peers: self.peer_addresses(),
            tracked_subnets: vec![subnet_id],
            allow_private_ips: self.allow_private_ips,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// `host:port`, plus the local default port and `port - 1` when `port`
/// is not the default.
///
/// Peers are reached over their HTTP API. A node's staking port sits one
/// above its HTTP port, so `port - 1` covers a staking port given by mistake.
pub fn bootstrap_peers(host: IpAddr, port: u16) -> Vec<SocketAddr> {
    let mut peers = vec![SocketAddr::new(host, port)];
    if port != DEFAULT_PEER_PORT {
        let local = IpAddr::V4(Ipv4Addr::LOCALHOST);
        peers.push(SocketAddr::new(local, DEFAULT_PEER_PORT));
        if let Some(http) = port.checked_sub(1).filter(|p| *p != DEFAULT_PEER_PORT) {
            peers.push(SocketAddr::new(local, http));
        }
    }
    peers
}
