//! Read-only verification of every HTTP provider in every managed manifest.
//!
//! Runs after a release is published (and continuously on the default
//! branch) to prove that each declared URL still serves exactly the bytes
//! the manifest pins. Nothing is rewritten; any failure fails the run.

use super::editor;
use super::error::Result;
use super::types::{ArtifactInfo, Provider};
use super::validator::StructuralValidator;
use super::verify;
use crate::fetch::Fetcher;
use colored::*;
use futures::future::try_join_all;
use std::path::PathBuf;

pub async fn validate_artifacts(
    paths: &[PathBuf],
    fetcher: &dyn Fetcher,
    validator: &dyn StructuralValidator,
) -> Result<()> {
    for path in paths {
        println!("Validating all HTTP providers for {}...", path.display());
        let mut checks: Vec<(String, ArtifactInfo)> = Vec::new();

        editor::process_manifest_in_place(path, validator, |providers, _suggested, info| {
            for provider in providers {
                match provider {
                    Provider::Http { url, .. } => checks.push((url.clone(), info.clone())),
                    Provider::Opaque(_) => println!(
                        "{}",
                        format!("   <skipping provider of type: {}>", provider.type_name())
                            .dimmed()
                    ),
                }
            }
            Ok(None)
        })?;

        try_join_all(checks.into_iter().map(|(url, info)| async move {
            println!(
                "{}",
                format!(
                    "   {url} (expected {} bytes, {} {})",
                    info.size, info.hash, info.digest
                )
                .dimmed()
            );
            let download = fetcher.get(&url).await?;
            verify::verify_artifact(&download.bytes, &info)
        }))
        .await?;
    }
    Ok(())
}
