use crate::constants::POW_DIFFICULTY;
use sha2::{Digest, Sha256};
use std::time::Instant;
use tracing::info;

/// A proof is valid when `sha256("{last_proof}{proof}{last_hash}")` starts
/// with `POW_DIFFICULTY` zero hex characters.
pub fn is_valid_proof(last_proof: u64, proof: u64, last_hash: &str) -> bool {
    let guess = format!("{last_proof}{proof}{last_hash}");
    let digest = Sha256::digest(guess.as_bytes());
    leading_zero_nibbles(&digest) >= POW_DIFFICULTY
}

/// Linear search from 0 for the first valid proof. Unbounded and blocking.
pub fn find_proof(last_proof: u64, last_hash: &str) -> u64 {
    let started = Instant::now();
    let mut proof = 0u64;
    while !is_valid_proof(last_proof, proof, last_hash) {
        proof += 1;
    }
    info!(
        proof,
        elapsed_secs = started.elapsed().as_secs_f64(),
        "proof of work found"
    );
    proof
}

/// Number of leading `0` characters in the hex encoding of `digest`.
pub fn leading_zero_nibbles(digest: &[u8]) -> u32 {
    let mut total = 0u32;
    for b in digest {
        if *b == 0 {
            total += 2;
        } else {
            if *b < 0x10 {
                total += 1;
            }
            break;
        }
    }
    total
}
