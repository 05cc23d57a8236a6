//! Writing rewritten sources back to disk.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Replace `path` with `content` atomically: write a sibling temp file,
/// fsync it, then rename it over the target.
///
/// A reader sees either the old or the new file, never a partial write. An
/// existing target keeps its permissions.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    // Same directory keeps the rename on one filesystem
    let dir = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no parent directory", path.display()),
            ))
        }
    };

    let permissions = match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => return Err(err),
    };

    let mut staged = tempfile::Builder::new()
        .prefix(".span-rewriter")
        .tempfile_in(dir)?;
    staged.write_all(content)?;
    staged.as_file().sync_all()?;
    if let Some(permissions) = permissions {
        staged.as_file().set_permissions(permissions)?;
    }
    staged.persist(path).map_err(|err| err.error)?;

    Ok(())
}
