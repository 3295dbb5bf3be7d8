//! HTTP Peer Network Adapter
//!
//! Implements `PeerNetwork` over node JSON-RPC APIs:
//!
//! | Call | Endpoint | Purpose |
//! |------|----------|---------|
//! | `info.getNodeID` | `<peer>/ext/info` | Resolve a bootstrap peer's identity |
//! | `platform.getCurrentValidators` | `<api>/ext/bc/P` | Validator weights and keys |
//! | `warp.getMessageSignature` | `<peer>/ext/warp` | Request one signature share |

use crate::domain::{
    AggregationError, AttemptFailure, BlsPublicKey, BlsSignature, SignatureShare, Validator,
};
use crate::ports::outbound::{PeerNetwork, ShareRequest};
use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use shared_types::formatting::decode_hex_prefixed;
use shared_types::{Id, NodeId};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::{debug, info, warn};
use ws_01_message_derivation::adapters::PLATFORM_API_PATH;
use ws_01_message_derivation::JsonRpcClient;

/// Path of the info API on a peer.
pub const INFO_API_PATH: &str = "/ext/info";

/// Path of the signature-request API on a peer.
pub const WARP_API_PATH: &str = "/ext/warp";

/// Default per-call bound for setup and roster requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Peer network configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerNetworkConfig {
    /// Base URL of the node serving the platform API.
    pub platform_api: String,
    /// Peers to contact before any discovery has happened.
    pub bootstrap_peers: Vec<SocketAddr>,
    /// Subnets whose validators may be asked to sign.
    pub tracked_subnets: Vec<Id>,
    /// Allow loopback, private and link-local peer addresses.
    pub allow_private_ips: bool,
    pub request_timeout: Duration,
}

impl PeerNetworkConfig {
    /// Check the configuration before any network activity.
    pub fn validate(&self) -> Result<(), AggregationError> {
        reqwest::Url::parse(&self.platform_api).map_err(|e| {
            AggregationError::NetworkSetup(format!(
                "invalid platform API URL {:?}: {}",
                self.platform_api, e
            ))
        })?;

        if self.tracked_subnets.is_empty() {
            return Err(AggregationError::NetworkSetup(
                "no tracked subnets configured".to_string(),
            ));
        }

        if !self.allow_private_ips {
            if let Some(addr) = self
                .bootstrap_peers
                .iter()
                .find(|addr| !is_public_ip(addr.ip()))
            {
                return Err(AggregationError::NetworkSetup(format!(
                    "bootstrap peer {} has a non-public IP and private IPs are not allowed",
                    addr
                )));
            }
        }

        if self.request_timeout.is_zero() {
            return Err(AggregationError::NetworkSetup(
                "request timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loopback, private, link-local and unspecified addresses are not public.
pub fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            !(ipv4.is_loopback()
                || ipv4.is_private()
                || ipv4.is_link_local()
                || ipv4.is_unspecified())
        }
        IpAddr::V6(ipv6) => {
            let octets = ipv6.octets();
            let unique_local = (octets[0] & 0xfe) == 0xfc;
            let link_local = octets[0] == 0xfe && (octets[1] & 0xc0) == 0x80;
            !(ipv6.is_loopback() || ipv6.is_unspecified() || unique_local || link_local)
        }
    }
}

/// HTTP API URL of `path` on the peer at `addr`.
pub fn peer_url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}{}", addr, path)
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct GetNodeIdReply {
    #[serde(rename = "nodeID")]
    node_id: String,
}

#[derive(Debug, Serialize)]
struct GetCurrentValidatorsParams {
    #[serde(rename = "subnetID")]
    subnet_id: String,
}

#[derive(Debug, Deserialize)]
struct GetCurrentValidatorsReply {
    validators: Vec<ApiValidator>,
}

/// Numbers in node APIs are usually quoted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiU64 {
    Quoted(String),
    Plain(u64),
}

impl ApiU64 {
    fn value(&self) -> Option<u64> {
        match self {
            ApiU64::Quoted(s) => s.parse().ok(),
            ApiU64::Plain(v) => Some(*v),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiSigner {
    #[serde(rename = "publicKey")]
    public_key: String,
}

#[derive(Debug, Deserialize)]
struct ApiValidator {
    #[serde(rename = "nodeID")]
    node_id: String,
    weight: Option<ApiU64>,
    #[serde(rename = "publicKey")]
    public_key: Option<String>,
    signer: Option<ApiSigner>,
}

impl ApiValidator {
    fn into_validator(self) -> Result<Validator, AttemptFailure> {
        let node_id: NodeId = self
            .node_id
            .parse()
            .map_err(|e| AttemptFailure::ValidatorSet(format!("bad node ID: {}", e)))?;

        let weight = self
            .weight
            .as_ref()
            .and_then(ApiU64::value)
            .ok_or_else(|| {
                AttemptFailure::ValidatorSet(format!("missing weight for {}", node_id))
            })?;

        let key_hex = self.public_key.or(self.signer.map(|s| s.public_key));
        let public_key = match key_hex {
            None => None,
            Some(hex) => {
                let bytes = decode_hex_prefixed(&hex).map_err(|e| {
                    AttemptFailure::ValidatorSet(format!("bad public key for {}: {}", node_id, e))
                })?;
                let key = BlsPublicKey::try_from(bytes.as_slice()).map_err(|len| {
                    AttemptFailure::ValidatorSet(format!(
                        "public key for {} has {} bytes",
                        node_id, len
                    ))
                })?;
                Some(key)
            }
        };

        Ok(Validator {
            node_id,
            weight,
            public_key,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct GetMessageSignatureParams {
    message: String,
    justification: String,
}

#[derive(Debug, Deserialize)]
struct GetMessageSignatureReply {
    signature: String,
}

fn parse_signature_reply(reply: &GetMessageSignatureReply) -> Option<BlsSignature> {
    let bytes = decode_hex_prefixed(&reply.signature).ok()?;
    BlsSignature::try_from(bytes.as_slice()).ok()
}

// =============================================================================
// Adapter
// =============================================================================

struct ConnectedPeer {
    addr: SocketAddr,
    warp: JsonRpcClient,
}

/// Peer network over node HTTP APIs.
pub struct HttpPeerNetwork {
    platform: JsonRpcClient,
    peers: HashMap<NodeId, ConnectedPeer>,
    benched: Vec<SocketAddr>,
    tracked_subnets: Vec<Id>,
    request_timeout: Duration,
}

impl HttpPeerNetwork {
    /// Validate `config` and resolve every bootstrap peer's node ID.
    ///
    /// Peers that do not answer are benched rather than failing setup.
    pub async fn connect(
        config: PeerNetworkConfig,
        http_client: reqwest::Client,
    ) -> Result<Self, AggregationError> {
        config.validate()?;

        let probes = config.bootstrap_peers.iter().map(|addr| {
            let client = JsonRpcClient::new(http_client.clone(), peer_url(*addr, INFO_API_PATH));
            let timeout = config.request_timeout;
            async move {
                let reply = client
                    .call::<_, GetNodeIdReply>("info.getNodeID", serde_json::json!({}), timeout)
                    .await
                    .map_err(|e| e.to_string())?;
                reply
                    .node_id
                    .parse::<NodeId>()
                    .map_err(|e| e.to_string())
            }
        });
        let results = futures::future::join_all(probes).await;

        let mut peers = HashMap::new();
        let mut benched = Vec::new();
        for (addr, result) in config.bootstrap_peers.iter().zip(results) {
            match result {
                Ok(node_id) => {
                    debug!("[ws-02] Bootstrap peer {} is {}", addr, node_id);
                    peers.insert(
                        node_id,
                        ConnectedPeer {
                            addr: *addr,
                            warp: JsonRpcClient::new(
                                http_client.clone(),
                                peer_url(*addr, WARP_API_PATH),
                            ),
                        },
                    );
                }
                Err(e) => {
                    warn!("[ws-02] Benching bootstrap peer {}: {}", addr, e);
                    benched.push(*addr);
                }
            }
        }

        info!(
            connected = peers.len(),
            benched = benched.len(),
            "[ws-02] Peer network ready"
        );

        let platform_url = format!(
            "{}{}",
            config.platform_api.trim_end_matches('/'),
            PLATFORM_API_PATH
        );
        Ok(Self {
            platform: JsonRpcClient::new(http_client, platform_url),
            peers,
            benched,
            tracked_subnets: config.tracked_subnets,
            request_timeout: config.request_timeout,
        })
    }

    /// Node IDs of reachable peers.
    pub fn connected(&self) -> Vec<NodeId> {
        self.peers.keys().copied().collect()
    }

    /// Bootstrap addresses that did not answer during setup.
    pub fn benched(&self) -> &[SocketAddr] {
        &self.benched
    }
}

#[async_trait]
impl PeerNetwork for HttpPeerNetwork {
    async fn validator_set(&self, subnet_id: Id) -> Result<Vec<Validator>, AttemptFailure> {
        if !self.tracked_subnets.contains(&subnet_id) {
            return Err(AttemptFailure::ValidatorSet(format!(
                "subnet {} is not tracked",
                subnet_id
            )));
        }

        let params = GetCurrentValidatorsParams {
            subnet_id: subnet_id.to_string(),
        };
        let reply: GetCurrentValidatorsReply = self
            .platform
            .call("platform.getCurrentValidators", params, self.request_timeout)
            .await
            .map_err(|e| AttemptFailure::Network(e.to_string()))?;

        let validators = reply
            .validators
            .into_iter()
            .map(ApiValidator::into_validator)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "[ws-02] Subnet {} has {} validators",
            subnet_id,
            validators.len()
        );
        Ok(validators)
    }

    async fn collect_shares(
        &self,
        request: &ShareRequest,
        timeout: Duration,
    ) -> Result<Vec<SignatureShare>, AttemptFailure> {
        let params = GetMessageSignatureParams {
            message: format!("0x{}", hex::encode(&request.message)),
            justification: format!("0x{}", hex::encode(&request.justification)),
        };

        let mut pending: FuturesUnordered<_> = request
            .targets
            .iter()
            .filter_map(|node_id| self.peers.get(node_id).map(|peer| (*node_id, peer)))
            .map(|(node_id, peer)| {
                let params = params.clone();
                async move {
                    let reply = peer
                        .warp
                        .call::<_, GetMessageSignatureReply>(
                            "warp.getMessageSignature",
                            params,
                            timeout,
                        )
                        .await;
                    (node_id, peer.addr, reply)
                }
            })
            .collect();

        if pending.is_empty() {
            return Err(AttemptFailure::Network(format!(
                "none of {} validators are connected",
                request.targets.len()
            )));
        }

        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        let mut shares = Vec::new();
        loop {
            tokio::select! {
                _ = &mut deadline => {
                    debug!(
                        "[ws-02] Share collection hit {:?} deadline with {} outstanding",
                        timeout,
                        pending.len()
                    );
                    break;
                }
                next = pending.next() => match next {
                    None => break,
                    Some((node_id, _, Ok(reply))) => match parse_signature_reply(&reply) {
                        Some(signature) => shares.push(SignatureShare { node_id, signature }),
                        None => debug!("[ws-02] Malformed signature from {}", node_id),
                    },
                    Some((node_id, addr, Err(e))) => {
                        debug!("[ws-02] Signature request to {} ({}) failed: {}", node_id, addr, e);
                    }
                }
            }
        }
        Ok(shares)
    }
}
