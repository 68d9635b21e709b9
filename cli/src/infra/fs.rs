//! Filesystem helpers shared by the file-backed adapters.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Atomically replace `path` with `content`.
///
/// Writes a sibling temp file and renames it over the target, so readers see
/// either the old or the new content. Parent directories are created. With
/// `mode` set, the file permissions are applied before the rename (unix only).
///
/// # Errors
///
/// Returns an error if any filesystem step fails.
pub fn write_atomic(path: &Path, content: &[u8], mode: Option<u32>) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)
        .with_context(|| format!("creating directory {}", parent.display()))?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("creating temp file in {}", parent.display()))?;
    temp.write_all(content)
        .with_context(|| format!("writing temp file for {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Some(mode) = mode {
            std::fs::set_permissions(temp.path(), std::fs::Permissions::from_mode(mode))
                .with_context(|| format!("setting permissions on {}", temp.path().display()))?;
        }
    }
    #[cfg(not(unix))]
    let _ = mode;

    temp.persist(path)
        .with_context(|| format!("finalizing {}", path.display()))?;
    Ok(())
}
