//! Peer address rules shared by `/nodes/` and startup configuration.

use crate::constants::CHAIN_PATH;
use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeerAddressError {
    #[error("no node addresses provided")]
    Empty,
    #[error("invalid node address {0:?}: expected an absolute http(s) URL")]
    Invalid(String),
    #[error("My own address ({0}) detected in the provided list of addresses")]
    SelfAddress(String),
}

/// Accepts absolute `http`/`https` URLs with a host.
pub fn validate_peer_address(address: &str) -> Result<(), PeerAddressError> {
    let invalid = || PeerAddressError::Invalid(address.to_string());
    let url = Url::parse(address).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(invalid());
    }
    Ok(())
}

/// Validates a batch of peer addresses. `own_urls` lists every base URL this
/// node answers on; none of them may appear in `addresses`.
pub fn validate_peer_list(addresses: &[String], own_urls: &[String]) -> Result<(), PeerAddressError> {
    if addresses.is_empty() {
        return Err(PeerAddressError::Empty);
    }
    for own in own_urls.iter().map(|u| u.trim_end_matches('/')) {
        if addresses.iter().any(|a| a.trim_end_matches('/') == own) {
            return Err(PeerAddressError::SelfAddress(own.to_string()));
        }
    }
    addresses.iter().try_for_each(|a| validate_peer_address(a))
}

/// Base URLs a client reached us on, derived from its `Host` header.
pub fn urls_for_host(host: &str) -> [String; 2] {
    [format!("http://{host}"), format!("https://{host}")]
}

pub fn chain_url(peer: &str) -> String {
    format!("{}{CHAIN_PATH}", peer.trim_end_matches('/'))
}
