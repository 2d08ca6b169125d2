use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::app::Result;
use crate::domain::FetchedFeed;
use crate::fetcher::FeedFetcher;
use crate::normalizer::Normalizer;

pub struct HttpFetcher {
    client: Client,
    normalizer: Normalizer,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("arbor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            normalizer: Normalizer::new(),
        })
    }
}

#[async_trait]
impl FeedFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedFeed> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;
        let body = response.bytes().await?;

        let fetched = self.normalizer.normalize(url, &body)?;
        tracing::info!("fetched {} items from {}", fetched.items.len(), url);
        Ok(fetched)
    }
}
