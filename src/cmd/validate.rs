use crate::config;
use crate::fetch::HttpFetcher;
use crate::manifest::validate;
use crate::manifest::validator::StrapCli;
use crate::utils;
use colored::*;
use std::path::Path;

pub fn run(repo_root: &Path) {
    println!("{}", "--- Validating declared artifacts ---".yellow().bold());

    let runtime = match utils::build_runtime() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("\n{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    };
    let fetcher = match HttpFetcher::new() {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("\n{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    };
    let validator = StrapCli::new();
    let paths = config::manifest_paths(repo_root);

    if let Err(e) = runtime.block_on(validate::validate_artifacts(
        &paths, &fetcher, &validator,
    )) {
        eprintln!("\n{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }

    println!("{}", "All declared artifacts verified.".green());
}
