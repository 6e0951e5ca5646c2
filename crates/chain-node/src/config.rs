use crate::constants::{DEFAULT_LISTEN, DEFAULT_PEER_TIMEOUT_SECS};
use crate::identity::new_node_id;
use crate::peer::{validate_peer_address, PeerAddressError};
use clap::Parser;
use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;
use thiserror::Error;

#[derive(Parser, Debug, Clone)]
#[command(name = "chain-node")]
#[command(about = "Proof-of-work ledger node")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, env = "CHAIN_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Base URL peers use to reach this node. Defaults to http://<listen>
    #[arg(long, env = "CHAIN_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Identifier credited with mining rewards. Random when omitted
    #[arg(long, env = "CHAIN_NODE_ID")]
    pub node_id: Option<String>,

    /// Peer base URL to register at startup; repeatable
    #[arg(long = "peer", env = "CHAIN_PEERS", value_delimiter = ',')]
    pub peers: Vec<String>,

    /// Timeout for fetching a peer's chain, in seconds
    #[arg(long, env = "CHAIN_PEER_TIMEOUT_SECS", default_value_t = DEFAULT_PEER_TIMEOUT_SECS)]
    pub peer_timeout_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid listen address {0:?}: {1}")]
    Listen(String, AddrParseError),
    #[error(transparent)]
    Peer(#[from] PeerAddressError),
}

/// Resolved node settings.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub listen: SocketAddr,
    pub public_url: String,
    pub node_id: String,
    pub peers: Vec<String>,
    pub peer_timeout: Duration,
}

impl NodeConfig {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let listen: SocketAddr = args
            .listen
            .parse()
            .map_err(|e| ConfigError::Listen(args.listen.clone(), e))?;
        let public_url = match args.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{listen}"),
        };
        for peer in &args.peers {
            validate_peer_address(peer)?;
        }
        Ok(Self {
            listen,
            public_url,
            node_id: args.node_id.unwrap_or_else(new_node_id),
            peers: args.peers,
            peer_timeout: Duration::from_secs(args.peer_timeout_secs),
        })
    }
}
