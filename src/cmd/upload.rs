use crate::config;
use crate::fetch::HttpFetcher;
use crate::manifest::upload::{self, UploadOptions};
use crate::manifest::validator::StrapCli;
use crate::release::GithubRelease;
use crate::utils;
use colored::*;
use std::path::Path;

pub fn run(
    version: &str,
    release_id: &str,
    token: Option<String>,
    force: bool,
    dry_run: bool,
    repo_root: &Path,
) {
    println!("{}", "--- Uploading release assets ---".yellow().bold());

    let Some(token) = token.or_else(|| std::env::var("GITHUB_TOKEN").ok()) else {
        eprintln!(
            "\n{}: missing GitHub token (pass --token or set GITHUB_TOKEN)",
            "Error".red().bold()
        );
        std::process::exit(1);
    };

    let runtime = match utils::build_runtime() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("\n{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    };
    let (fetcher, host) = match (
        HttpFetcher::new(),
        GithubRelease::new(token, release_id.to_string()),
    ) {
        (Ok(fetcher), Ok(host)) => (fetcher, host),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("\n{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    };
    let validator = StrapCli::new();
    let paths = config::manifest_paths(repo_root);
    let options = UploadOptions { force, dry_run };

    if let Err(e) = runtime.block_on(upload::upload_release_assets(
        &paths, version, &host, &fetcher, &validator, options,
    )) {
        eprintln!("\n{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }

    if dry_run {
        println!("{}", "Dry run complete.".green());
    } else {
        println!("{}", "All assets uploaded.".green());
    }
}
