//! File-backed `PassLock`: an advisory exclusive lock in the state directory.
//!
//! The lock belongs to the open file handle, so the kernel releases it when
//! the guard drops or the process dies.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::application::ports::PassLock;

pub const LOCK_FILE: &str = "pass.lock";

pub struct StateDirLock {
    path: PathBuf,
}

/// Holds the lock until dropped.
#[derive(Debug)]
pub struct LockGuard {
    _file: File,
}

impl StateDirLock {
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(LOCK_FILE),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PassLock for StateDirLock {
    type Guard = LockGuard;

    fn try_acquire(&self) -> Result<Option<LockGuard>> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .with_context(|| format!("opening lock file {}", self.path.display()))?;
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(Some(LockGuard { _file: file })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("locking {}", self.path.display()))
            }
        }
    }
}
