//! # File-backed Ledger
//!
//! A [`Ledger`] loaded from and saved to one JSON snapshot. Saving writes a
//! sibling temp file and renames it over the snapshot, so a crash mid-write
//! leaves the previous snapshot intact.
//!
//! An open [`FileLedger`] holds an exclusive advisory lock on
//! `<snapshot>.lock` until it is dropped. A second open of the same snapshot
//! fails with [`LedgerError::Locked`] instead of reading a round that the
//! first holder is about to overwrite.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::LedgerError;
use crate::ledger::Ledger;

#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    ledger: Ledger,
    // Released when the descriptor closes.
    _lock: File,
}

impl FileLedger {
    /// Load the snapshot at `path`, or start an empty ledger if there is none.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let lock = acquire_lock(&path)?;
        let ledger = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| LedgerError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| LedgerError::Snapshot {
                path: path.clone(),
                source,
            })?
        } else {
            tracing::debug!(path = %path.display(), "no ledger snapshot, starting empty");
            Ledger::new()
        };
        Ok(Self {
            path,
            ledger,
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn commit(&self) -> Result<(), LedgerError> {
        let io_err = |source| LedgerError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(&self.ledger).map_err(|source| {
            LedgerError::Snapshot {
                path: self.path.clone(),
                source,
            }
        })?;
        let tmp = sibling(&self.path, ".tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        tracing::debug!(
            path = %self.path.display(),
            round = self.ledger.status(),
            "ledger snapshot written"
        );
        Ok(())
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn acquire_lock(path: &Path) -> Result<File, LedgerError> {
    let lock_path = sibling(path, ".lock");
    let io_err = |source| LedgerError::Io {
        path: lock_path.clone(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(io_err)?;
    if !try_flock_exclusive(&file).map_err(io_err)? {
        tracing::warn!(path = %path.display(), "ledger snapshot is locked");
        return Err(LedgerError::Locked {
            path: path.to_path_buf(),
        });
    }
    Ok(file)
}

/// Non-blocking exclusive `flock`. `Ok(false)` means another open file
/// description holds the lock.
fn try_flock_exclusive(file: &File) -> io::Result<bool> {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;

        let fd = file.as_raw_fd();
        // SAFETY: `fd` is a valid descriptor owned by `file` for this call.
        #[allow(unsafe_code)]
        let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
        if result == 0 {
            return Ok(true);
        }
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::WouldBlock || err.raw_os_error() == Some(libc::EWOULDBLOCK)
        {
            return Ok(false);
        }
        Err(err)
    }
    #[cfg(not(unix))]
    {
        let _ = file;
        Ok(true)
    }
}
