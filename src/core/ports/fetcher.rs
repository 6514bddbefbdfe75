use bytes::Bytes;

use crate::error::Error;

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Pass-through page fetch port backing the "secure browsing" view. No
/// anti-censorship transport logic lives here; the body is relayed as-is.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, Error>;
}
