use super::jsonc::JsoncError;
use super::types::HashAlgorithm;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while processing manifests. Nothing here is
/// ever downgraded to a warning; the command layer prints and exits.
#[derive(Debug, Error)]
pub enum Error {
    /// The external launcher rejected a manifest, before or after a rewrite.
    /// After a rewrite this means the edit produced an invalid file.
    #[error("structural validation failed for {}: {message}", .path.display())]
    Structural { path: PathBuf, message: String },

    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("{algorithm} mismatch: expected {expected}, got {actual}")]
    DigestMismatch {
        algorithm: HashAlgorithm,
        expected: String,
        actual: String,
    },

    #[error("no upstream HTTP providers found for asset: {0}")]
    NoUpstreamProviders(String),

    #[error("no upstream URL found for release asset {0}")]
    NoUpstreamUrl(String),

    #[error(
        "asset name was changed while uploading to the release: expected {expected}, got {actual}. \
         {} has already been published with the following URL, which will not work once the \
         release goes live: {url}",
        .manifest.display()
    )]
    AssetRenamed {
        expected: String,
        actual: String,
        manifest: PathBuf,
        url: String,
    },

    #[error("no generation marker found in {}", .path.display())]
    MissingMarker { path: PathBuf },

    #[error("failed to download (HTTP {status}): {url}")]
    Fetch {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("release API request failed ({status}) while {context}")]
    Api {
        status: reqwest::StatusCode,
        context: String,
    },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("failed to patch manifest text: {0}")]
    Patch(#[from] JsoncError),
}
