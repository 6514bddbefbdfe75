use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::core::ports::fetcher::{FetchedPage, Fetcher};
use crate::error::Error;

#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, Error> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        let content_type = resp.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(str::to_owned);
        let body = resp.bytes().await?;
        Ok(FetchedPage { status, content_type, body })
    }
}
