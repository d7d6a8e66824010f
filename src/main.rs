use clap::{Parser, Subcommand};
use relkit::cmd;
use std::path::PathBuf;

/// Relkit - Release tooling for strap artifact manifests.
///
/// Manages the first-party artifact manifests in this repository around a
/// hosted release: writes canonical release-asset URLs into them, publishes
/// verified upstream artifacts, and re-checks every declared provider.
#[derive(Parser)]
#[command(name = "relkit", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Writes canonical release-asset URLs into all managed manifests
    #[command(
        long_about = "Inserts references to release asset URLs into the first-party artifact manifests in the repo, in preparation for publishing a new release and uploading the assets (which happens in a separate step). Every surviving upstream provider is re-downloaded and checked against the manifest's digest and size."
    )]
    InjectUrls {
        /// Release version, with or without a leading 'v'
        version: String,
        /// Repository root containing the managed manifests
        #[arg(long, default_value = ".")]
        repo_root: PathBuf,
    },

    /// Uploads verified upstream artifacts to a hosted release
    #[command(
        long_about = "Scans the first-party artifact manifests for URLs referencing assets of an upcoming release, downloads each platform's upstream artifact, verifies it, and uploads it to the release identified by --release-id. With --force, assets that already exist at those names are replaced; this is useful for retrying failed or corrupted uploads."
    )]
    UploadAssets {
        /// Release version, with or without a leading 'v'
        version: String,
        /// Identifier of the (draft) release to publish assets to
        #[arg(long)]
        release_id: String,
        /// GitHub token; defaults to the GITHUB_TOKEN environment variable
        #[arg(long)]
        token: Option<String>,
        /// Replace assets that already exist on the release
        #[arg(long)]
        force: bool,
        /// Log every step but skip deletes and uploads
        #[arg(long)]
        dry_run: bool,
        /// Repository root containing the managed manifests
        #[arg(long, default_value = ".")]
        repo_root: PathBuf,
    },

    /// Verifies every declared HTTP provider against its digest and size
    #[command(
        long_about = "Ensures that the first-party artifact manifests in the current commit all point to valid URLs that return the described artifacts. Intended to run continuously on the default branch and once after each release is published."
    )]
    ValidateAssets {
        /// Repository root containing the managed manifests
        #[arg(long, default_value = ".")]
        repo_root: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::InjectUrls { version, repo_root } => cmd::inject::run(&version, &repo_root),
        Commands::UploadAssets {
            version,
            release_id,
            token,
            force,
            dry_run,
            repo_root,
        } => cmd::upload::run(&version, &release_id, token, force, dry_run, &repo_root),
        Commands::ValidateAssets { repo_root } => cmd::validate::run(&repo_root),
    }
}
