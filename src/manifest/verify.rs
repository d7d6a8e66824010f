use super::error::{Error, Result};
use super::types::{ArtifactInfo, HashAlgorithm};
use sha2::{Digest, Sha256};

/// Lowercase hex digest of `data` under the given algorithm.
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Blake3 => blake3::hash(data).to_hex().to_string(),
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
    }
}

/// Checks downloaded bytes against a platform's declared identity: size
/// first, then the digest (hex compared case-insensitively). Both failure
/// modes report expected vs. actual.
pub fn verify_artifact(data: &[u8], info: &ArtifactInfo) -> Result<()> {
    if data.len() as u64 != info.size {
        return Err(Error::SizeMismatch {
            expected: info.size,
            actual: data.len() as u64,
        });
    }
    let actual = digest(info.hash, data);
    if !actual.eq_ignore_ascii_case(&info.digest) {
        return Err(Error::DigestMismatch {
            algorithm: info.hash,
            expected: info.digest.clone(),
            actual,
        });
    }
    Ok(())
}
