//! Compiled-in coordinates of the release pipeline: which repository hosts
//! the releases and which manifest files in the working tree are managed by
//! this tool.

use crate::utils;
use std::path::{Path, PathBuf};

pub const RELEASE_OWNER: &str = "strapline";
pub const RELEASE_REPO: &str = "devkit";

/// First-party artifact manifests, relative to the repository root.
pub const FIRST_PARTY_MANIFEST_FILES: &[&str] = &["bin/devkit-inspector"];

pub fn manifest_paths(repo_root: &Path) -> Vec<PathBuf> {
    FIRST_PARTY_MANIFEST_FILES
        .iter()
        .map(|relative| repo_root.join(relative))
        .collect()
}

/// Normalizes a version argument into a release tag: `0.4.2` and `v0.4.2`
/// both map to `v0.4.2`.
pub fn release_tag(version: &str) -> String {
    format!("v{}", version.strip_prefix('v').unwrap_or(version))
}

/// `https://github.com/<owner>/<repo>/releases/download/<tag>/` — every
/// asset URL this tool writes or recognizes starts with this.
pub fn release_asset_prefix(tag: &str) -> String {
    format!(
        "https://github.com/{}/{}/releases/download/{}/",
        RELEASE_OWNER,
        RELEASE_REPO,
        utils::encode_component(tag)
    )
}

pub fn release_asset_url(tag: &str, asset_name: &str) -> String {
    format!(
        "{}{}",
        release_asset_prefix(tag),
        utils::encode_component(asset_name)
    )
}
