//! Temporary SSH key files for git.
//!
//! The key is written to a private temporary file that lives exactly as long
//! as the [`KeyFile`] value.

use secrecy::{ExposeSecret, SecretString};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// A private key materialized on disk for `ssh -i`.
#[derive(Debug)]
pub struct KeyFile {
    file: NamedTempFile,
}

impl KeyFile {
    /// Writes `private_key` to a new temporary file readable only by the owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn create(private_key: &SecretString) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("tracker-git-branch-resource")
            .tempfile()?;
        restrict_permissions(&file)?;

        let key = private_key.expose_secret();
        file.write_all(key.as_bytes())?;
        // ssh rejects keys without a final newline.
        if !key.ends_with('\n') {
            file.write_all(b"\n")?;
        }
        file.flush()?;
        Ok(Self { file })
    }

    /// Location of the key file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Builds a `GIT_SSH_COMMAND` value that uses this key.
    #[must_use]
    pub fn ssh_command(&self, ssh: &str) -> String {
        format!(
            "{ssh} -i {} -o StrictHostKeyChecking=no",
            self.path().display()
        )
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &NamedTempFile) -> io::Result<()> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;
    file.as_file().set_permissions(Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &NamedTempFile) -> io::Result<()> {
    Ok(())
}
