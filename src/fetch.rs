use crate::manifest::{Error, Result};
use async_trait::async_trait;
use colored::*;
use reqwest::header::CONTENT_TYPE;

/// A fully buffered download plus the effective content type after
/// redirects.
pub struct Download {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Byte-fetching capability. The synchronization passes only ever need
/// "give me the bytes and headers behind this URL"; tests substitute an
/// in-memory implementation.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<Download>;
}

/// Production fetcher over a shared async reqwest client. Redirects are
/// followed; there is no retry and no timeout here, rerunning the tool is
/// the retry and CI owns the time limit.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("relkit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<Download> {
        if url.starts_with("http://") {
            println!(
                "{} downloading over insecure HTTP: {}",
                "Warning:".yellow(),
                url
            );
        }
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Fetch {
                status: response.status(),
                url: url.to_string(),
            });
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();
        Ok(Download {
            bytes,
            content_type,
        })
    }
}
