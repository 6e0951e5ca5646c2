pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;

/// Number of leading `0` hex characters a proof digest must start with.
pub const POW_DIFFICULTY: u32 = 4;

pub const GENESIS_PROOF: u64 = 100;
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Sender of mining rewards; "0" stands for the chain itself.
pub const REWARD_SENDER: &str = "0";
pub const MINING_REWARD: f64 = 1.0;
