use crate::{pow::find_proof, Block, SharedLedger};
use tracing::debug;

/// Mines one block on a shared ledger.
///
/// The head is snapshotted under the lock, the proof search runs without it,
/// and the append happens under the lock again. If another mine or a chain
/// replacement moved the head in between, the search restarts against the
/// new head, so a block is never appended onto a stale predecessor.
///
/// Blocking and CPU-bound; async hosts should call it from a blocking task.
pub fn mine(ledger: &SharedLedger) -> Block {
    loop {
        let (last_proof, last_hash) = ledger.head();
        let proof = find_proof(last_proof, &last_hash);
        if let Some(block) = ledger.commit_mined(&last_hash, proof) {
            return block;
        }
        debug!("retrying proof search against the new head");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{is_valid_chain, Ledger, Transaction};
    use std::thread;

    #[test]
    fn mine_example() {
        let shared = SharedLedger::new(Ledger::new("miner"));
        shared.add_transaction(Transaction::new("alice", "bob", 3.0));
        let block = mine(&shared);
        assert_eq!(shared.chain_len(), 2);
        assert!(shared.pending().is_empty());
        assert_eq!(
            block.transactions,
            vec![
                Transaction::new("alice", "bob", 3.0),
                Transaction::new("0", "miner", 1.0)
            ]
        );
    }

    #[test]
    fn transaction_added_during_search_lands_in_block() {
        let shared = SharedLedger::new(Ledger::new("miner"));
        let (last_proof, last_hash) = shared.head();
        let proof = find_proof(last_proof, &last_hash);

        // Arrives after the search started but before the commit.
        shared.add_transaction(Transaction::new("late", "bob", 2.0));

        let block = shared.commit_mined(&last_hash, proof).unwrap();
        assert_eq!(block.transactions[0], Transaction::new("late", "bob", 2.0));
        assert!(shared.pending().is_empty());
    }

    #[test]
    fn replacement_during_search_forces_retry() {
        let shared = SharedLedger::new(Ledger::new("miner"));
        let (last_proof, last_hash) = shared.head();
        let proof = find_proof(last_proof, &last_hash);

        let mut peer = Ledger::new("peer");
        peer.mine();
        peer.mine();
        shared.replace_chain(peer.chain().to_vec());

        assert!(shared.commit_mined(&last_hash, proof).is_none());
        let block = mine(&shared);
        assert_eq!(block.previous_hash, peer.last_block().hash());
        assert_eq!(shared.chain_len(), 4);
        assert!(is_valid_chain(&shared.chain()));
    }

    #[test]
    fn concurrent_miners_keep_chain_valid() {
        let shared = SharedLedger::new(Ledger::new("miner"));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    shared.add_transaction(Transaction::new(format!("user-{i}"), "bob", 1.0));
                    mine(&shared)
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let chain = shared.chain();
        assert_eq!(chain.len(), 5);
        assert!(is_valid_chain(&chain));
        assert!(shared.pending().is_empty());
        let rewards = chain
            .iter()
            .flat_map(|b| &b.transactions)
            .filter(|tx| tx.sender == "0")
            .count();
        assert_eq!(rewards, 4);
        let user_txs = chain
            .iter()
            .flat_map(|b| &b.transactions)
            .filter(|tx| tx.sender.starts_with("user-"))
            .count();
        assert_eq!(user_txs, 4);
    }
}
