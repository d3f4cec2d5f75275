//! Exclusive ownership of the data directory.
//!
//! The entry store assumes a single writer. The CLI takes an advisory lock on
//! `.lock` in the data directory for the duration of a command so that two
//! invocations never interleave their read-modify-write cycles.

use crate::constants::LOCK_FILE_NAME;
use crate::errors::{AppResult, LockError};
use crate::store::file::ensure_data_directory_exists;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Held lock on a data directory. Released on drop.
#[derive(Debug)]
pub struct DataDirLock {
    path: PathBuf,
    file: File,
}

impl DataDirLock {
    /// Takes the lock without waiting.
    ///
    /// # Errors
    ///
    /// Returns `LockError::FileBusy` if another process holds it and
    /// `LockError::AcquisitionFailed` if the lock file cannot be opened or locked.
    pub fn acquire(data_dir: &Path) -> AppResult<Self> {
        ensure_data_directory_exists(data_dir)?;
        let path = data_dir.join(LOCK_FILE_NAME);

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| LockError::AcquisitionFailed {
                path: path.clone(),
                source,
            })?;

        if let Err(source) = file.try_lock_exclusive() {
            let busy = source.kind() == ErrorKind::WouldBlock
                || source.raw_os_error() == fs2::lock_contended_error().raw_os_error();
            return Err(if busy {
                LockError::FileBusy { path }
            } else {
                LockError::AcquisitionFailed { path, source }
            }
            .into());
        }

        debug!("Acquired data directory lock {:?}", path);
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            debug!("Failed to release lock {:?}: {}", self.path, e);
        }
    }
}
