pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::FetchedFeed;

pub use http_fetcher::HttpFetcher;

/// Retrieves and decodes one feed document.
///
/// Implementations make a single attempt and report `Network` or `Parse`
/// failures; retrying is the caller's call. The returned feed has no URL, the
/// caller decides which record it belongs to.
#[async_trait]
pub trait FeedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedFeed>;
}
