pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
pub const DEFAULT_PEER_TIMEOUT_SECS: u64 = 5;

/// Path every node serves its chain on, relative to the peer's base URL.
pub const CHAIN_PATH: &str = "/chain/";
