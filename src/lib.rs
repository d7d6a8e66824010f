//! Relkit: release tooling for strap artifact manifests.
//!
//! This crate provides the release pipeline around the first-party artifact
//! manifests shipped in this repository: injecting canonical release-asset
//! URLs into the manifests, publishing byte-verified upstream artifacts to a
//! hosted release, and re-verifying every declared provider against its
//! pinned digest and size.

pub mod cmd;
pub mod config;
pub mod fetch;
pub mod manifest;
pub mod release;
pub mod utils;
