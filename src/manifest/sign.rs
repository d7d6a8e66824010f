//! Generation markers for machine-written manifests.
//!
//! Every managed manifest carries an `@generated SignedSource<<...>>` token
//! whose hash covers the whole file, with the token itself reset to a fixed
//! placeholder while hashing. Re-signing happens once per file, after all
//! content edits, so the embedded signature always matches the final bytes.

use super::error::{Error, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

// Split so this source file is not itself mistaken for a generated one.
const GENERATED_TAG: &str = concat!("@", "generated");
const TOKEN: &str = "<<SignedSource::*O*zOeWoEQle#+L!plEphiEmie@IsG>>";

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{GENERATED_TAG} SignedSource<<[a-f0-9]{{32}}>>"))
        .expect("marker pattern is valid")
});

fn signing_token() -> String {
    format!("{GENERATED_TAG} {TOKEN}")
}

/// Embeds the signature into `contents`, which must already carry the
/// signing token where the signature belongs.
fn sign(contents: &str) -> String {
    let digest = md5::compute(contents.as_bytes());
    contents.replace(TOKEN, &format!("SignedSource<<{digest:x}>>"))
}

/// Recomputes and embeds the generation signature of `path`.
pub fn resign_generated_file(path: &Path) -> Result<()> {
    let contents = fs::read_to_string(path)?;
    let reset = MARKER.replace(&contents, signing_token()).into_owned();
    if !reset.contains(TOKEN) {
        return Err(Error::MissingMarker {
            path: path.to_path_buf(),
        });
    }
    fs::write(path, sign(&reset))?;
    Ok(())
}

/// True when `contents` carries a signature that matches its bytes.
pub fn is_signed(contents: &str) -> bool {
    let reset = MARKER.replace(contents, signing_token());
    reset != contents && sign(&reset) == contents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("manifest");
        fs::write(
            &path,
            format!(
                "{{\n    // {GENERATED_TAG} SignedSource<<{}>>\n    \"name\": \"tool\"\n}}\n",
                "0".repeat(32)
            ),
        )
        .unwrap();
        path
    }

    #[test]
    fn resigning_produces_a_verifiable_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(dir.path());
        resign_generated_file(&path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(is_signed(&contents));
        assert!(!contents.contains(&"0".repeat(32)));
    }

    #[test]
    fn resigning_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(dir.path());
        resign_generated_file(&path).unwrap();
        let first = fs::read_to_string(&path).unwrap();
        resign_generated_file(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn editing_a_signed_file_invalidates_the_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(dir.path());
        resign_generated_file(&path).unwrap();
        let tampered = fs::read_to_string(&path).unwrap().replace("tool", "loot");
        assert!(!is_signed(&tampered));
    }

    #[test]
    fn files_without_a_marker_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest");
        fs::write(&path, "{}\n").unwrap();
        match resign_generated_file(&path).unwrap_err() {
            Error::MissingMarker { .. } => {}
            other => panic!("expected missing marker error, got {other}"),
        }
    }
}
