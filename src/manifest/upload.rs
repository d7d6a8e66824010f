//! Publishes upstream artifacts to the hosted release the manifests already
//! point at.
//!
//! The manifests are the source of truth: each platform's release-URL
//! provider names the asset to publish and its first other HTTP provider
//! names where the bytes come from. Bytes are verified against the declared
//! digest and size before every upload, including forced replacements. This
//! pass never rewrites manifest text.

use super::editor;
use super::error::{Error, Result};
use super::types::{ArtifactInfo, Provider, ReleaseAssetInfo};
use super::validator::StructuralValidator;
use super::verify;
use crate::config;
use crate::fetch::Fetcher;
use crate::release::ReleaseHost;
use crate::utils;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default)]
pub struct UploadOptions {
    /// Replace assets that already exist on the release.
    pub force: bool,
    /// Log every step but skip deletes, uploads and writes.
    pub dry_run: bool,
}

struct UploadJob {
    target: ReleaseAssetInfo,
    upstream_url: String,
    info: ArtifactInfo,
    manifest: PathBuf,
}

pub async fn upload_release_assets(
    paths: &[PathBuf],
    version: &str,
    host: &dyn ReleaseHost,
    fetcher: &dyn Fetcher,
    validator: &dyn StructuralValidator,
    options: UploadOptions,
) -> Result<()> {
    let tag = config::release_tag(version);
    let prefix = config::release_asset_prefix(&tag);

    let existing: HashMap<String, u64> = host
        .list_assets()
        .await?
        .into_iter()
        .map(|asset| (asset.name, asset.id))
        .collect();

    for path in paths {
        println!("Uploading assets for {}...", path.display());
        let mut jobs: Vec<UploadJob> = Vec::new();

        editor::process_manifest_in_place(path, validator, |providers, suggested, info| {
            let mut upstream_url: Option<String> = None;
            let mut target: Option<ReleaseAssetInfo> = None;
            for provider in providers {
                match provider {
                    Provider::Opaque(_) => {
                        println!(
                            "Skipping non-HTTP provider: {}",
                            serde_json::to_string(provider)?
                        );
                    }
                    Provider::Http { url, .. } => {
                        if let Some(encoded_name) = url.strip_prefix(prefix.as_str()) {
                            target = Some(ReleaseAssetInfo {
                                name: utils::decode_component(encoded_name),
                                url: url.clone(),
                            });
                        } else if upstream_url.is_none() {
                            upstream_url = Some(url.clone());
                        }
                    }
                }
                if upstream_url.is_some() && target.is_some() {
                    break;
                }
            }
            let Some(target) = target else {
                // nothing in this platform points at the release being built
                println!(
                    "[{suggested} (suggested)] No provider URLs matched release asset prefix: {prefix}"
                );
                return Ok(None);
            };
            let Some(upstream_url) = upstream_url else {
                return Err(Error::NoUpstreamUrl(target.name));
            };
            jobs.push(UploadJob {
                target,
                upstream_url,
                info: info.clone(),
                manifest: path.clone(),
            });
            Ok(None)
        })?;

        try_join_all(
            jobs.into_iter()
                .map(|job| publish_one(host, fetcher, &existing, options, job)),
        )
        .await?;
    }
    Ok(())
}

async fn publish_one(
    host: &dyn ReleaseHost,
    fetcher: &dyn Fetcher,
    existing: &HashMap<String, u64>,
    options: UploadOptions,
    job: UploadJob,
) -> Result<()> {
    let name = &job.target.name;

    if let Some(&asset_id) = existing.get(name) {
        if !options.force {
            println!("[{name}] Skipping existing release asset...");
            return Ok(());
        }
        if options.dry_run {
            println!("[{name}] Dry run: not deleting existing release asset.");
        } else {
            println!("[{name}] Deleting existing release asset...");
            host.delete_asset(asset_id).await?;
        }
    }

    println!("[{name}] Downloading from {}...", job.upstream_url);
    let download = fetcher.get(&job.upstream_url).await?;
    println!("[{name}] Validating download...");
    verify::verify_artifact(&download.bytes, &job.info)?;

    if options.dry_run {
        println!("[{name}] Dry run: not uploading to release.");
        return Ok(());
    }

    println!("[{name}] Uploading to release...");
    let content_type = download
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let download_url = host
        .upload_asset(name, &content_type, download.bytes)
        .await?;
    let actual = utils::asset_name_from_url(&download_url).unwrap_or_default();
    if actual != *name {
        return Err(Error::AssetRenamed {
            expected: name.clone(),
            actual,
            manifest: job.manifest,
            url: job.target.url,
        });
    }
    println!("[{name}] Uploaded to {download_url}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::testutil::{
        FakeFetcher, FakeHost, JsonValidator, sha256_hex, signed_manifest, write_manifest_fixture,
    };
    use crate::release::ReleaseAsset;
    use std::path::Path;

    const UPSTREAM: &str = "https://cdn.example.com/inspector.tar.gz";
    const RELEASE_URL: &str = "https://github.com/strapline/devkit/releases/download/v2.0.0/devkit.inspector-linux-x86_64.tar.gz";

    fn fixture(dir: &Path, providers_json: &str) -> PathBuf {
        let text = signed_manifest("devkit-inspector", providers_json, &sha256_hex(b"abcd"), 4);
        write_manifest_fixture(dir, &text)
    }

    fn both_providers() -> String {
        format!(r#"[ {{ "url": "{RELEASE_URL}" }}, {{ "url": "{UPSTREAM}" }} ]"#)
    }

    #[tokio::test]
    async fn uploads_a_fresh_asset_with_the_upstream_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(dir.path(), &both_providers());
        let fetcher = FakeFetcher::serving_with_type(UPSTREAM, b"abcd", "application/gzip");
        let host = FakeHost::default();

        upload_release_assets(
            &[path],
            "2.0.0",
            &host,
            &fetcher,
            &JsonValidator,
            UploadOptions::default(),
        )
        .await
        .unwrap();

        let uploads = host.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].name, "devkit.inspector-linux-x86_64.tar.gz");
        assert_eq!(uploads[0].content_type, "application/gzip");
        assert_eq!(uploads[0].bytes, b"abcd");
        assert!(host.deleted().is_empty());
    }

    #[tokio::test]
    async fn platforms_without_a_target_provider_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(dir.path(), &format!(r#"[ {{ "url": "{UPSTREAM}" }} ]"#));
        let fetcher = FakeFetcher::serving(UPSTREAM, b"abcd");
        let host = FakeHost::default();

        upload_release_assets(
            &[path],
            "2.0.0",
            &host,
            &fetcher,
            &JsonValidator,
            UploadOptions::default(),
        )
        .await
        .unwrap();
        assert!(host.uploads().is_empty());
    }

    #[tokio::test]
    async fn a_target_without_an_upstream_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(dir.path(), &format!(r#"[ {{ "url": "{RELEASE_URL}" }} ]"#));
        let err = upload_release_assets(
            &[path],
            "2.0.0",
            &FakeHost::default(),
            &FakeFetcher::default(),
            &JsonValidator,
            UploadOptions::default(),
        )
        .await
        .unwrap_err();
        match err {
            Error::NoUpstreamUrl(name) => {
                assert_eq!(name, "devkit.inspector-linux-x86_64.tar.gz");
            }
            other => panic!("expected configuration error, got {other}"),
        }
    }

    #[tokio::test]
    async fn existing_assets_are_skipped_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(dir.path(), &both_providers());
        let fetcher = FakeFetcher::serving(UPSTREAM, b"abcd");
        let host = FakeHost::with_assets(vec![ReleaseAsset {
            name: "devkit.inspector-linux-x86_64.tar.gz".to_string(),
            id: 77,
        }]);

        upload_release_assets(
            &[path],
            "2.0.0",
            &host,
            &fetcher,
            &JsonValidator,
            UploadOptions::default(),
        )
        .await
        .unwrap();
        assert!(host.uploads().is_empty());
        assert!(host.deleted().is_empty());
    }

    #[tokio::test]
    async fn force_replaces_the_existing_asset_after_verification() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(dir.path(), &both_providers());
        let fetcher = FakeFetcher::serving(UPSTREAM, b"abcd");
        let host = FakeHost::with_assets(vec![ReleaseAsset {
            name: "devkit.inspector-linux-x86_64.tar.gz".to_string(),
            id: 77,
        }]);

        upload_release_assets(
            &[path],
            "2.0.0",
            &host,
            &fetcher,
            &JsonValidator,
            UploadOptions {
                force: true,
                dry_run: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(host.deleted(), vec![77]);
        assert_eq!(host.uploads().len(), 1);
    }

    #[tokio::test]
    async fn dry_run_verifies_but_never_mutates() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(dir.path(), &both_providers());
        // wrong bytes: dry-run must still surface the verification failure
        let fetcher = FakeFetcher::serving(UPSTREAM, b"abcX");
        let host = FakeHost::with_assets(vec![ReleaseAsset {
            name: "devkit.inspector-linux-x86_64.tar.gz".to_string(),
            id: 77,
        }]);

        let err = upload_release_assets(
            &[path],
            "2.0.0",
            &host,
            &fetcher,
            &JsonValidator,
            UploadOptions {
                force: true,
                dry_run: true,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::DigestMismatch { .. }));
        assert!(host.deleted().is_empty());
        assert!(host.uploads().is_empty());
    }

    #[tokio::test]
    async fn a_renamed_upload_is_a_publish_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(dir.path(), &both_providers());
        let fetcher = FakeFetcher::serving(UPSTREAM, b"abcd");
        let host = FakeHost::default().renaming_uploads_to("devkit.inspector-renamed.tar.gz");

        let err = upload_release_assets(
            &[path],
            "2.0.0",
            &host,
            &fetcher,
            &JsonValidator,
            UploadOptions::default(),
        )
        .await
        .unwrap_err();
        match err {
            Error::AssetRenamed {
                expected, actual, ..
            } => {
                assert_eq!(expected, "devkit.inspector-linux-x86_64.tar.gz");
                assert_eq!(actual, "devkit.inspector-renamed.tar.gz");
            }
            other => panic!("expected publish error, got {other}"),
        }
    }
}
