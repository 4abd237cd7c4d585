//! Writing output files without leaving partial files behind.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Write `contents` to `path` through a temporary file in the same directory.
///
/// The target is only replaced once everything has been written and flushed;
/// on any error the temporary file is removed and `path` is left untouched.
///
/// # Errors
///
/// Returns an IO error if the temporary file cannot be created, written or persisted.
pub fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file_mut().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
