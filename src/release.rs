use crate::config;
use crate::manifest::{Error, Result};
use crate::utils;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;

/// One asset already present on the hosted release.
#[derive(Debug, Clone)]
pub struct ReleaseAsset {
    pub name: String,
    pub id: u64,
}

/// The three operations the upload pass needs from release hosting, scoped
/// to a single release. The host may rename an uploaded asset; callers must
/// compare the name encoded in the returned download URL against what they
/// asked for.
#[async_trait]
pub trait ReleaseHost: Send + Sync {
    async fn list_assets(&self) -> Result<Vec<ReleaseAsset>>;
    async fn delete_asset(&self, asset_id: u64) -> Result<()>;
    /// Returns the asset's download URL as reported by the host.
    async fn upload_asset(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String>;
}

/// GitHub releases implementation. Listing and deletion go through the REST
/// API host, uploads through the dedicated uploads host.
pub struct GithubRelease {
    client: reqwest::Client,
    token: String,
    release_id: String,
}

#[derive(Deserialize)]
struct AssetResponse {
    id: u64,
    name: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    browser_download_url: String,
}

impl GithubRelease {
    pub fn new(token: String, release_id: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("relkit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(GithubRelease {
            client,
            token,
            release_id,
        })
    }

    fn check(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Error::Api {
                status: response.status(),
                context: context.to_string(),
            })
        }
    }
}

#[async_trait]
impl ReleaseHost for GithubRelease {
    async fn list_assets(&self) -> Result<Vec<ReleaseAsset>> {
        let url = format!(
            "https://api.github.com/repos/{}/{}/releases/{}/assets?per_page=100",
            config::RELEASE_OWNER,
            config::RELEASE_REPO,
            self.release_id
        );
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;
        let assets: Vec<AssetResponse> = Self::check(response, "listing release assets")?
            .json()
            .await?;
        Ok(assets
            .into_iter()
            .map(|asset| ReleaseAsset {
                name: asset.name,
                id: asset.id,
            })
            .collect())
    }

    async fn delete_asset(&self, asset_id: u64) -> Result<()> {
        let url = format!(
            "https://api.github.com/repos/{}/{}/releases/assets/{}",
            config::RELEASE_OWNER,
            config::RELEASE_REPO,
            asset_id
        );
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;
        Self::check(response, "deleting a release asset")?;
        Ok(())
    }

    async fn upload_asset(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let url = format!(
            "https://uploads.github.com/repos/{}/{}/releases/{}/assets?name={}",
            config::RELEASE_OWNER,
            config::RELEASE_REPO,
            self.release_id,
            utils::encode_component(name)
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        let uploaded: UploadResponse = Self::check(response, "uploading a release asset")?
            .json()
            .await?;
        Ok(uploaded.browser_download_url)
    }
}
