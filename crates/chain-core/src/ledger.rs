use crate::{hash_block, now_secs, pow::find_proof, Block, Transaction};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// A node's copy of the chain, its pending pool and the peers it knows.
///
/// `Ledger` itself is single-threaded. Hosts that serve concurrent callers
/// share it through [`SharedLedger`].
#[derive(Debug, Clone)]
pub struct Ledger {
    node_id: String,
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    peers: BTreeSet<String>,
}

impl Ledger {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            chain: vec![Block::genesis()],
            pending: Vec::new(),
            peers: BTreeSet::new(),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn peers(&self) -> &BTreeSet<String> {
        &self.peers
    }

    pub fn last_block(&self) -> &Block {
        // Never empty: starts at genesis and replace_chain refuses empty chains.
        &self.chain[self.chain.len() - 1]
    }

    /// `(proof, hash)` of the current head, the inputs to the next proof search.
    pub fn head(&self) -> (u64, String) {
        let last = self.last_block();
        (last.proof, hash_block(last))
    }

    pub fn register_peers<I, S>(&mut self, addresses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for address in addresses {
            let address = address.into();
            debug!(%address, "registering peer");
            self.peers.insert(address);
        }
    }

    /// Queues `tx` for the next block and returns that block's expected index.
    pub fn add_transaction(&mut self, tx: Transaction) -> u64 {
        self.pending.push(tx);
        self.last_block().index + 1
    }

    /// Builds the next block from the pending pool and empties the pool.
    /// The block is not appended.
    pub fn create_block(&mut self, proof: u64) -> Block {
        Block {
            index: self.chain.len() as u64 + 1,
            timestamp: now_secs(),
            transactions: std::mem::take(&mut self.pending),
            proof,
            previous_hash: hash_block(self.last_block()),
        }
    }

    /// Searches a proof against the head, pays the reward and appends the block.
    pub fn mine(&mut self) -> Block {
        let (last_proof, last_hash) = self.head();
        let proof = find_proof(last_proof, &last_hash);
        self.append_mined(proof)
    }

    /// Appends a block for `proof` if the head still hashes to `last_hash`.
    /// Returns `None` when the head moved since the proof search started.
    pub fn commit_mined(&mut self, last_hash: &str, proof: u64) -> Option<Block> {
        if hash_block(self.last_block()) != last_hash {
            debug!(proof, "head moved during proof search");
            return None;
        }
        Some(self.append_mined(proof))
    }

    fn append_mined(&mut self, proof: u64) -> Block {
        let reward = Transaction::reward(self.node_id.clone());
        self.add_transaction(reward);
        let block = self.create_block(proof);
        info!(
            index = block.index,
            proof,
            transactions = block.transactions.len(),
            "mined block"
        );
        self.chain.push(block.clone());
        block
    }

    /// Wholesale replacement. Callers validate `new_chain` first.
    pub fn replace_chain(&mut self, new_chain: Vec<Block>) {
        if new_chain.is_empty() {
            warn!("refusing to replace the chain with an empty one");
            return;
        }
        info!(
            old_len = self.chain.len(),
            new_len = new_chain.len(),
            "replacing local chain"
        );
        self.chain = new_chain;
    }
}

/// Cloneable handle that serializes every access to one [`Ledger`].
///
/// Chain, pending pool and peers sit behind a single lock, so compound
/// operations such as mining or replacement never interleave. Reads return
/// owned snapshots.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    // Every mutation leaves the ledger consistent, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn node_id(&self) -> String {
        self.lock().node_id().to_string()
    }

    pub fn chain(&self) -> Vec<Block> {
        self.lock().chain().to_vec()
    }

    /// Number of blocks, genesis included; never zero.
    pub fn chain_len(&self) -> usize {
        self.lock().chain().len()
    }

    pub fn last_block(&self) -> Block {
        self.lock().last_block().clone()
    }

    pub fn pending(&self) -> Vec<Transaction> {
        self.lock().pending().to_vec()
    }

    pub fn peers(&self) -> Vec<String> {
        self.lock().peers().iter().cloned().collect()
    }

    pub fn head(&self) -> (u64, String) {
        self.lock().head()
    }

    pub fn add_transaction(&self, tx: Transaction) -> u64 {
        self.lock().add_transaction(tx)
    }

    pub fn register_peers<I, S>(&self, addresses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().register_peers(addresses)
    }

    pub fn commit_mined(&self, last_hash: &str, proof: u64) -> Option<Block> {
        self.lock().commit_mined(last_hash, proof)
    }

    /// Mines with the proof search outside the lock. See [`crate::mine::mine`].
    pub fn mine(&self) -> Block {
        crate::mine::mine(self)
    }

    pub fn replace_chain(&self, new_chain: Vec<Block>) {
        self.lock().replace_chain(new_chain)
    }

    /// Replaces the chain only if `candidate` is still strictly longer than
    /// the current one when the lock is taken.
    pub fn replace_if_longer(&self, candidate: Vec<Block>) -> bool {
        let mut ledger = self.lock();
        if candidate.len() <= ledger.chain().len() {
            debug!(
                candidate_len = candidate.len(),
                local_len = ledger.chain().len(),
                "local chain grew past the candidate"
            );
            return false;
        }
        ledger.replace_chain(candidate);
        true
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self::new(ledger)
    }
}
