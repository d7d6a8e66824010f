//! In-process stand-ins for the external capabilities, plus fixture
//! helpers shared by the synchronization tests.

use super::error::{Error, Result};
use super::jsonc;
use super::types::Manifest;
use super::validator::StructuralValidator;
use crate::fetch::{Download, Fetcher};
use crate::release::{ReleaseAsset, ReleaseHost};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Structural validation without the launcher binary: the file must parse
/// as JSONC and deserialize into the manifest shape.
pub struct JsonValidator;

impl StructuralValidator for JsonValidator {
    fn validate(&self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path)?;
        let body = contents
            .strip_prefix("#!")
            .and_then(|rest| rest.split_once('\n'))
            .map_or(contents.as_str(), |(_, body)| body);
        let structural = jsonc::parse(body)
            .map_err(Error::from)
            .and_then(|value| Ok(serde_json::from_value::<Manifest>(value)?));
        structural.map_err(|e| Error::Structural {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

/// Serves canned bytes for registered URLs; anything else is a 404-shaped
/// transport failure.
#[derive(Default)]
pub struct FakeFetcher {
    responses: HashMap<String, (Vec<u8>, Option<String>)>,
}

impl FakeFetcher {
    pub fn serving(url: &str, bytes: &[u8]) -> Self {
        let mut fetcher = FakeFetcher::default();
        fetcher
            .responses
            .insert(url.to_string(), (bytes.to_vec(), None));
        fetcher
    }

    pub fn serving_with_type(url: &str, bytes: &[u8], content_type: &str) -> Self {
        let mut fetcher = FakeFetcher::default();
        fetcher.responses.insert(
            url.to_string(),
            (bytes.to_vec(), Some(content_type.to_string())),
        );
        fetcher
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn get(&self, url: &str) -> Result<Download> {
        match self.responses.get(url) {
            Some((bytes, content_type)) => Ok(Download {
                bytes: bytes.clone(),
                content_type: content_type.clone(),
            }),
            None => Err(Error::Fetch {
                status: reqwest::StatusCode::NOT_FOUND,
                url: url.to_string(),
            }),
        }
    }
}

/// A recorded upload.
pub struct RecordedUpload {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Release host that records every mutation instead of performing it.
#[derive(Default)]
pub struct FakeHost {
    assets: Vec<ReleaseAsset>,
    rename_to: Option<String>,
    deleted: Mutex<Vec<u64>>,
    uploads: Mutex<Vec<RecordedUpload>>,
}

impl FakeHost {
    pub fn with_assets(assets: Vec<ReleaseAsset>) -> Self {
        FakeHost {
            assets,
            ..FakeHost::default()
        }
    }

    /// Makes every upload come back under `name`, like a host that
    /// sanitizes or deduplicates asset names.
    pub fn renaming_uploads_to(mut self, name: &str) -> Self {
        self.rename_to = Some(name.to_string());
        self
    }

    pub fn deleted(&self) -> Vec<u64> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        std::mem::take(&mut *self.uploads.lock().unwrap())
    }
}

#[async_trait]
impl ReleaseHost for FakeHost {
    async fn list_assets(&self) -> Result<Vec<ReleaseAsset>> {
        Ok(self.assets.clone())
    }

    async fn delete_asset(&self, asset_id: u64) -> Result<()> {
        self.deleted.lock().unwrap().push(asset_id);
        Ok(())
    }

    async fn upload_asset(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        self.uploads.lock().unwrap().push(RecordedUpload {
            name: name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });
        let reported = self.rename_to.as_deref().unwrap_or(name);
        Ok(format!(
            "https://github.com/strapline/devkit/releases/download/v2.0.0/{}",
            crate::utils::encode_component(reported)
        ))
    }
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// A single-platform manifest body carrying a generation marker and the
/// given providers array, digest and size.
pub fn signed_manifest(name: &str, providers_json: &str, digest: &str, size: u64) -> String {
    format!(
        r#"{{
    // @{}generated SignedSource<<{}>>
    "name": "{name}",
    "platforms": {{
        "linux-x86_64": {{
            "providers": {providers_json},
            "hash": "sha256",
            "digest": "{digest}",
            "size": {size},
            "format": "tar.gz"
        }}
    }}
}}
"#,
        "",
        "0".repeat(32)
    )
}

pub fn write_manifest_fixture(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("manifest");
    std::fs::write(&path, contents).unwrap();
    path
}
