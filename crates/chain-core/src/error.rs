use thiserror::Error;

/// Why a candidate chain was rejected. `position` is the offending block's
/// position in the chain, not its `index` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("block {position} does not link to the hash of its predecessor")]
    BrokenLink { position: usize },
    #[error("block {position} carries an invalid proof of work")]
    InvalidProof { position: usize },
}

/// Failure to obtain a peer's chain. Always recoverable: the peer is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("peer unreachable: {0}")]
    Unreachable(String),
    #[error("peer answered with status {0}")]
    Status(u16),
    #[error("malformed chain payload: {0}")]
    Malformed(String),
}
