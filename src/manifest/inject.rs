//! Writes canonical release-asset URLs into the managed manifests.
//!
//! Each platform keeps its verifiable upstream providers, loses any URL
//! already pointing at the target release (those are regenerated), and gains
//! the canonical release URL as the new preferred provider. Upstream
//! providers are re-downloaded and checked against the declared digest and
//! size before the pass is allowed to succeed.

use super::editor;
use super::error::{Error, Result};
use super::sign;
use super::types::{ArtifactInfo, Provider};
use super::validator::StructuralValidator;
use super::verify;
use crate::config;
use crate::fetch::Fetcher;
use colored::*;
use futures::future::try_join_all;
use std::path::PathBuf;

pub async fn write_release_asset_urls(
    paths: &[PathBuf],
    version: &str,
    fetcher: &dyn Fetcher,
    validator: &dyn StructuralValidator,
) -> Result<()> {
    let tag = config::release_tag(version);
    let prefix = config::release_asset_prefix(&tag);

    for path in paths {
        println!("Updating {}...", path.display());
        let mut checks: Vec<(String, ArtifactInfo)> = Vec::new();

        editor::process_manifest_in_place(path, validator, |providers, suggested, info| {
            let mut kept: Vec<Provider> = Vec::new();
            let mut upstream_count = 0usize;
            for provider in providers {
                match provider {
                    Provider::Http { url, .. } => {
                        if url.starts_with(&prefix) {
                            // stale self-reference from a previous run
                            println!("{}", format!("  -{url}").red());
                            continue;
                        }
                        println!("{}", format!("   {url}").dimmed());
                        checks.push((url.clone(), info.clone()));
                        upstream_count += 1;
                        kept.push(provider.clone());
                    }
                    Provider::Opaque(_) => {
                        // kept as-is; we can neither validate nor mirror these
                        println!(
                            "{}",
                            format!("   <provider of type: {}>", provider.type_name()).dimmed()
                        );
                        kept.push(provider.clone());
                    }
                }
            }
            if upstream_count == 0 {
                return Err(Error::NoUpstreamProviders(suggested.to_string()));
            }
            let url = config::release_asset_url(&tag, suggested);
            println!("{}", format!("  +{url}").green());
            kept.insert(0, Provider::http(url));
            println!();
            Ok(Some(kept))
        })?;

        try_join_all(checks.into_iter().map(|(url, info)| async move {
            println!("Downloading from {url} for integrity validation...");
            let download = fetcher.get(&url).await?;
            verify::verify_artifact(&download.bytes, &info)
        }))
        .await?;

        sign::resign_generated_file(path)?;
        validator.validate(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::testutil::{
        FakeFetcher, JsonValidator, sha256_hex, write_manifest_fixture,
    };

    fn manifest_with_upstream(upstream_url: &str, digest: &str) -> String {
        format!(
            r#"{{
    // @{}generated SignedSource<<{}>>
    "name": "devkit-inspector",
    "platforms": {{
        "linux-x86_64": {{
            "providers": [
                {{ "url": "{upstream_url}" }},
                {{ "type": "release-host", "repo": "strapline/devkit" }}
            ],
            "hash": "sha256",
            "digest": "{digest}",
            "size": 4,
            "format": "tar.gz"
        }}
    }}
}}
"#,
            "", // keep the generated tag out of this source file's own text
            "0".repeat(32)
        )
    }

    #[tokio::test]
    async fn injects_the_release_url_as_the_preferred_provider() {
        let dir = tempfile::tempdir().unwrap();
        let upstream = "https://cdn.example.com/inspector.tar.gz";
        let text = manifest_with_upstream(upstream, &sha256_hex(b"abcd"));
        let path = write_manifest_fixture(dir.path(), &text);
        let fetcher = FakeFetcher::serving(upstream, b"abcd");

        write_release_asset_urls(&[path.clone()], "2.0.0", &fetcher, &JsonValidator)
            .await
            .unwrap();

        let rewritten = std::fs::read_to_string(&path).unwrap();
        let release_url = "https://github.com/strapline/devkit/releases/download/v2.0.0/devkit.inspector-linux-x86_64.tar.gz";
        let release_at = rewritten.find(release_url).unwrap();
        let upstream_at = rewritten.find(upstream).unwrap();
        assert!(release_at < upstream_at, "release URL must come first");
        // the opaque provider rides along untouched
        assert!(rewritten.contains(r#""type": "release-host""#));
        // and the file is re-signed over its final bytes
        assert!(crate::manifest::sign::is_signed(&rewritten));
    }

    #[tokio::test]
    async fn injection_is_idempotent_for_a_fixed_version() {
        let dir = tempfile::tempdir().unwrap();
        let upstream = "https://cdn.example.com/inspector.tar.gz";
        let text = manifest_with_upstream(upstream, &sha256_hex(b"abcd"));
        let path = write_manifest_fixture(dir.path(), &text);
        let fetcher = FakeFetcher::serving(upstream, b"abcd");

        write_release_asset_urls(&[path.clone()], "2.0.0", &fetcher, &JsonValidator)
            .await
            .unwrap();
        let first = std::fs::read_to_string(&path).unwrap();

        write_release_asset_urls(&[path.clone()], "2.0.0", &fetcher, &JsonValidator)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }

    #[tokio::test]
    async fn a_platform_without_upstream_providers_is_fatal_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let stale_release_url = "https://github.com/strapline/devkit/releases/download/v2.0.0/devkit.inspector-linux-x86_64.tar.gz";
        let text = manifest_with_upstream(stale_release_url, &sha256_hex(b"abcd"));
        let path = write_manifest_fixture(dir.path(), &text);
        let fetcher = FakeFetcher::default();

        let err = write_release_asset_urls(&[path.clone()], "2.0.0", &fetcher, &JsonValidator)
            .await
            .unwrap_err();
        match err {
            Error::NoUpstreamProviders(asset) => {
                assert_eq!(asset, "devkit.inspector-linux-x86_64.tar.gz");
            }
            other => panic!("expected configuration error, got {other}"),
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    }

    #[tokio::test]
    async fn an_upstream_serving_wrong_bytes_fails_the_pass() {
        let dir = tempfile::tempdir().unwrap();
        let upstream = "https://cdn.example.com/inspector.tar.gz";
        let text = manifest_with_upstream(upstream, &sha256_hex(b"abcd"));
        let path = write_manifest_fixture(dir.path(), &text);
        let fetcher = FakeFetcher::serving(upstream, b"abcX");

        let err = write_release_asset_urls(&[path], "2.0.0", &fetcher, &JsonValidator)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DigestMismatch { .. }));
    }
}
