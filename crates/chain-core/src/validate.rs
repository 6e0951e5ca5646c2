use crate::{error::ChainError, hash_block, pow::is_valid_proof, Block};

/// Checks hash linkage and proof of work for every adjacent pair.
///
/// The genesis block's own shape, `index` labels, timestamps and
/// transactions are not inspected.
pub fn validate_chain(chain: &[Block]) -> Result<(), ChainError> {
    for (position, pair) in chain.windows(2).enumerate().map(|(i, w)| (i + 1, w)) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let prev_hash = hash_block(prev);
        if curr.previous_hash != prev_hash {
            return Err(ChainError::BrokenLink { position });
        }
        if !is_valid_proof(prev.proof, curr.proof, &prev_hash) {
            return Err(ChainError::InvalidProof { position });
        }
    }
    Ok(())
}

pub fn is_valid_chain(chain: &[Block]) -> bool {
    validate_chain(chain).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ledger, Transaction};

    fn mined_chain(blocks: usize) -> Vec<Block> {
        let mut ledger = Ledger::new("validator-test");
        for i in 0..blocks {
            ledger.add_transaction(Transaction::new("alice", "bob", i as f64));
            ledger.mine();
        }
        ledger.chain().to_vec()
    }

    #[test]
    fn short_chains_are_valid() {
        assert!(is_valid_chain(&[]));
        assert!(is_valid_chain(&[Block::genesis()]));
    }

    #[test]
    fn mined_chain_is_valid() {
        let chain = mined_chain(3);
        assert_eq!(chain.len(), 4);
        assert_eq!(validate_chain(&chain), Ok(()));
    }

    #[test]
    fn tampered_proof_is_rejected() {
        let mut chain = mined_chain(2);
        let prev_hash = hash_block(&chain[1]);
        let last_proof = chain[1].proof;
        chain[2].proof = (0..)
            .find(|p| !is_valid_proof(last_proof, *p, &prev_hash))
            .unwrap();
        assert_eq!(
            validate_chain(&chain),
            Err(ChainError::InvalidProof { position: 2 })
        );
    }

    #[test]
    fn tampered_inner_proof_is_rejected() {
        let mut chain = mined_chain(2);
        chain[1].proof += 1;
        assert!(!is_valid_chain(&chain));
    }

    #[test]
    fn tampered_previous_hash_is_rejected() {
        let mut chain = mined_chain(2);
        chain[1].previous_hash = "0".repeat(64);
        assert_eq!(
            validate_chain(&chain),
            Err(ChainError::BrokenLink { position: 1 })
        );
    }

    #[test]
    fn tampered_transactions_break_the_next_link() {
        let mut chain = mined_chain(2);
        chain[1].transactions[0].amount = 1_000.0;
        assert_eq!(
            validate_chain(&chain),
            Err(ChainError::BrokenLink { position: 2 })
        );
    }

    #[test]
    fn index_labels_are_not_checked() {
        let mut chain = mined_chain(1);
        chain[1].index = 42;
        // Only the last block was relabelled, so no successor hash is affected.
        assert!(is_valid_chain(&chain));
    }

    #[test]
    fn foreign_genesis_is_accepted() {
        let genesis = Block {
            index: 9,
            timestamp: 1.0,
            transactions: vec![Transaction::new("x", "y", 3.0)],
            proof: 7,
            previous_hash: "not-zero".into(),
        };
        let genesis_hash = hash_block(&genesis);
        let next = Block {
            index: 1,
            timestamp: 2.0,
            transactions: vec![],
            proof: crate::pow::find_proof(7, &genesis_hash),
            previous_hash: genesis_hash,
        };
        assert!(is_valid_chain(&[genesis, next]));
    }
}
