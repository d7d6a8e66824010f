use super::error::{Error, Result};
use std::env;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// Structural validation of a manifest file, delegated to the launcher CLI
/// that will ultimately execute it. Kept behind a trait so the editor and
/// the synchronization passes can be driven against an in-process
/// implementation in tests.
pub trait StructuralValidator {
    fn validate(&self, path: &Path) -> Result<()>;
}

/// Validates by running `strap parse <file>` and checking the exit status.
/// The binary is resolved from `STRAP_BIN` when set, otherwise from `PATH`.
pub struct StrapCli {
    bin: OsString,
}

impl StrapCli {
    pub fn new() -> Self {
        StrapCli {
            bin: env::var_os("STRAP_BIN").unwrap_or_else(|| OsString::from("strap")),
        }
    }
}

impl Default for StrapCli {
    fn default() -> Self {
        Self::new()
    }
}

impl StructuralValidator for StrapCli {
    fn validate(&self, path: &Path) -> Result<()> {
        let output = Command::new(&self.bin).arg("parse").arg(path).output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Error::Structural {
                path: path.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
