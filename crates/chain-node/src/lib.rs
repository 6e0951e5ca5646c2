pub mod api;
pub mod config;
pub mod constants;
pub mod fetcher;
pub mod identity;
pub mod peer;

use chain_core::{Ledger, SharedLedger};
use tracing::info;

pub use api::{router, AppState};
pub use config::{Args, ConfigError, NodeConfig};
pub use fetcher::HttpChainFetcher;

/// Builds the shared state for a node: a fresh ledger seeded with the
/// configured peers, and the HTTP fetcher used during conflict resolution.
pub fn app_state(config: &NodeConfig) -> reqwest::Result<AppState> {
    let mut ledger = Ledger::new(config.node_id.clone());
    ledger.register_peers(config.peers.iter().cloned());
    info!(
        node_id = %config.node_id,
        peers = config.peers.len(),
        "ledger initialised with genesis block"
    );
    Ok(AppState {
        ledger: SharedLedger::new(ledger),
        fetcher: HttpChainFetcher::new(config.peer_timeout)?,
        public_url: config.public_url.clone(),
    })
}
