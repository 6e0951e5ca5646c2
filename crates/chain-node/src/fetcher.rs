use crate::peer::chain_url;
use chain_core::{Block, ChainFetcher, ChainResponse, FetchError};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Fetches peer chains from their `/chain/` endpoint.
#[derive(Debug, Clone)]
pub struct HttpChainFetcher {
    client: Client,
}

impl HttpChainFetcher {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl ChainFetcher for HttpChainFetcher {
    async fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, FetchError> {
        let url = chain_url(peer);
        debug!(%url, "fetching peer chain");
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;
        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = res
            .bytes()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;
        let parsed: ChainResponse =
            serde_json::from_slice(&body).map_err(|e| FetchError::Malformed(e.to_string()))?;
        Ok(parsed.chain)
    }
}
