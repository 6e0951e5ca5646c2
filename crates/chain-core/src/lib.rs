use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod codec;
pub mod consensus;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod mine;
pub mod pow;
pub mod validate;

pub use codec::{canonical_json, hash_block};
pub use consensus::{resolve_conflicts, select_longest_valid, ChainFetcher};
pub use error::{ChainError, FetchError};
pub use ledger::{Ledger, SharedLedger};
pub use validate::{is_valid_chain, validate_chain};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: f64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// The reward a miner pays itself for forging a block.
    pub fn reward(recipient: impl Into<String>) -> Self {
        Self::new(constants::REWARD_SENDER, recipient, constants::MINING_REWARD)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    /// Seconds since the Unix epoch, with sub-second precision.
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// The fixed first block of every chain. Only the timestamp varies.
    pub fn genesis() -> Self {
        Self {
            index: 0,
            timestamp: now_secs(),
            transactions: vec![],
            proof: constants::GENESIS_PROOF,
            previous_hash: constants::GENESIS_PREVIOUS_HASH.to_string(),
        }
    }

    pub fn hash(&self) -> String {
        hash_block(self)
    }
}

/// Wire shape of a node's chain, as served on `/chain/` and fetched from peers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
}

pub(crate) fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
