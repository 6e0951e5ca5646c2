//! Longest-valid-chain conflict resolution.

use crate::{error::FetchError, validate::validate_chain, Block, SharedLedger};
use std::future::Future;
use tracing::{debug, info, warn};

/// Source of peer chains. Implemented over HTTP by the node.
///
/// Unreachable peers, bad statuses and unparsable payloads are reported as
/// [`FetchError`]s, never panics, so one bad peer cannot abort a sweep.
pub trait ChainFetcher: Send + Sync {
    fn fetch_chain(
        &self,
        peer: &str,
    ) -> impl Future<Output = Result<Vec<Block>, FetchError>> + Send;
}

/// Picks the chain to adopt from the fetched peer results, in order.
///
/// A candidate qualifies if it is strictly longer than the best length seen
/// so far (starting at `local_len`) and passes validation. Each qualifying
/// candidate raises the bar, so among equally long winners the first one in
/// iteration order is kept.
pub fn select_longest_valid<I>(local_len: usize, results: I) -> Option<Vec<Block>>
where
    I: IntoIterator<Item = (String, Result<Vec<Block>, FetchError>)>,
{
    let mut max_length = local_len;
    let mut winner = None;
    for (peer, result) in results {
        let candidate = match result {
            Ok(chain) => chain,
            Err(err) => {
                warn!(%peer, error = %err, "skipping peer");
                continue;
            }
        };
        if candidate.len() <= max_length {
            debug!(%peer, len = candidate.len(), max_length, "peer chain not longer");
            continue;
        }
        if let Err(err) = validate_chain(&candidate) {
            debug!(%peer, error = %err, "rejecting invalid peer chain");
            continue;
        }
        max_length = candidate.len();
        winner = Some(candidate);
    }
    winner
}

/// Asks every known peer for its chain and adopts the longest valid one.
/// Returns whether the local chain was replaced.
///
/// Peers are visited sequentially in address order without holding the
/// ledger lock. The winner is only installed if it is still strictly longer
/// than the local chain at that moment.
pub async fn resolve_conflicts<F: ChainFetcher>(ledger: &SharedLedger, fetcher: &F) -> bool {
    let peers = ledger.peers();
    let local_len = ledger.chain_len();

    let mut results = Vec::with_capacity(peers.len());
    for peer in peers {
        let result = fetcher.fetch_chain(&peer).await;
        results.push((peer, result));
    }

    let Some(winner) = select_longest_valid(local_len, results) else {
        debug!(local_len, "local chain is authoritative");
        return false;
    };
    let new_len = winner.len();
    let replaced = ledger.replace_if_longer(winner);
    if replaced {
        info!(local_len, new_len, "adopted longer peer chain");
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hash_block, Ledger, Transaction};
    use std::collections::HashMap;

    #[derive(Default)]
    struct StaticFetcher {
        chains: HashMap<String, Result<Vec<Block>, FetchError>>,
    }

    impl StaticFetcher {
        fn with(mut self, peer: &str, result: Result<Vec<Block>, FetchError>) -> Self {
            self.chains.insert(peer.to_string(), result);
            self
        }
    }

    impl ChainFetcher for StaticFetcher {
        fn fetch_chain(
            &self,
            peer: &str,
        ) -> impl Future<Output = Result<Vec<Block>, FetchError>> + Send {
            let result = self
                .chains
                .get(peer)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::Unreachable(peer.to_string())));
            std::future::ready(result)
        }
    }

    fn chain_of(len: usize, node_id: &str) -> Vec<Block> {
        let mut ledger = Ledger::new(node_id);
        for _ in 1..len {
            ledger.add_transaction(Transaction::new(node_id, "bob", 1.0));
            ledger.mine();
        }
        ledger.chain().to_vec()
    }

    fn local_ledger(len: usize, peers: &[&str]) -> SharedLedger {
        let mut ledger = Ledger::new("local");
        for _ in 1..len {
            ledger.mine();
        }
        ledger.register_peers(peers.iter().copied());
        SharedLedger::new(ledger)
    }

    fn tamper(mut chain: Vec<Block>) -> Vec<Block> {
        let last = chain.len() - 1;
        chain[last].previous_hash = hash_block(&chain[0]);
        chain
    }

    #[tokio::test]
    async fn adopts_longest_valid_chain() {
        let ledger = local_ledger(3, &["http://a", "http://b"]);
        let five = chain_of(5, "peer-a");
        let fetcher = StaticFetcher::default()
            .with("http://a", Ok(five.clone()))
            .with("http://b", Ok(chain_of(4, "peer-b")));

        assert!(resolve_conflicts(&ledger, &fetcher).await);
        assert_eq!(ledger.chain(), five);
    }

    #[tokio::test]
    async fn keeps_local_chain_when_peers_are_not_longer() {
        let ledger = local_ledger(3, &["http://a", "http://b"]);
        let before = ledger.chain();
        let fetcher = StaticFetcher::default()
            .with("http://a", Ok(chain_of(2, "peer-a")))
            .with("http://b", Ok(chain_of(3, "peer-b")));

        assert!(!resolve_conflicts(&ledger, &fetcher).await);
        assert_eq!(ledger.chain(), before);
        assert_eq!(ledger.chain_len(), 3);
    }

    #[tokio::test]
    async fn never_adopts_invalid_longer_chain() {
        let ledger = local_ledger(2, &["http://a"]);
        let before = ledger.chain();
        let fetcher = StaticFetcher::default().with("http://a", Ok(tamper(chain_of(4, "peer-a"))));

        assert!(!resolve_conflicts(&ledger, &fetcher).await);
        assert_eq!(ledger.chain(), before);
    }

    #[tokio::test]
    async fn invalid_candidate_does_not_raise_the_bar() {
        let ledger = local_ledger(1, &["http://a", "http://b"]);
        let valid = chain_of(3, "peer-b");
        let fetcher = StaticFetcher::default()
            .with("http://a", Ok(tamper(chain_of(4, "peer-a"))))
            .with("http://b", Ok(valid.clone()));

        assert!(resolve_conflicts(&ledger, &fetcher).await);
        assert_eq!(ledger.chain(), valid);
    }

    #[tokio::test]
    async fn failing_peers_are_skipped() {
        let ledger = local_ledger(1, &["http://a", "http://b", "http://c", "http://d"]);
        let good = chain_of(3, "peer-d");
        let fetcher = StaticFetcher::default()
            .with("http://a", Err(FetchError::Unreachable("connection refused".into())))
            .with("http://b", Err(FetchError::Status(500)))
            .with("http://c", Err(FetchError::Malformed("expected value".into())))
            .with("http://d", Ok(good.clone()));

        assert!(resolve_conflicts(&ledger, &fetcher).await);
        assert_eq!(ledger.chain(), good);
    }

    #[tokio::test]
    async fn no_peers_means_no_change() {
        let ledger = local_ledger(1, &[]);
        assert!(!resolve_conflicts(&ledger, &StaticFetcher::default()).await);
        assert_eq!(ledger.chain_len(), 1);
    }

    #[test]
    fn first_of_equally_long_winners_is_kept() {
        let first = chain_of(3, "peer-a");
        let second = chain_of(3, "peer-b");
        let winner = select_longest_valid(
            1,
            vec![
                ("http://a".to_string(), Ok(first.clone())),
                ("http://b".to_string(), Ok(second)),
            ],
        );
        assert_eq!(winner, Some(first));
    }

    #[test]
    fn later_longer_candidate_overrides_earlier_winner() {
        let three = chain_of(3, "peer-a");
        let four = chain_of(4, "peer-b");
        let winner = select_longest_valid(
            1,
            vec![
                ("http://a".to_string(), Ok(three)),
                ("http://b".to_string(), Ok(four.clone())),
            ],
        );
        assert_eq!(winner, Some(four));
    }
}
