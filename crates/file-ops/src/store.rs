//! Single-shot file storage for small payloads.

use std::path::{Path, PathBuf};

use courier_scope::{Scope, validate_entry_name};
use tracing::info;

/// Writes a whole file below a scope-contained directory.
///
/// The name is validated as a relative entry name and may contain
/// subdirectories, which are created as needed. Returns the final path.
pub fn store_file(
    scope: &Scope,
    target_dir: &Path,
    file_name: &str,
    data: &[u8],
) -> Result<PathBuf, String> {
    validate_entry_name(file_name).map_err(|e| format!("invalid file name: {e}"))?;
    let dir = scope
        .check(target_dir)
        .map_err(|e| format!("cannot store under {}: {e}", target_dir.display()))?;
    let path = scope
        .check(&dir.join(file_name))
        .map_err(|e| format!("cannot store {file_name}: {e}"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create directory {}: {e}", parent.display()))?;
    }
    std::fs::write(&path, data).map_err(|e| format!("failed to write {}: {e}", path.display()))?;

    info!(path = %path.display(), bytes = data.len(), "stored file");
    Ok(path)
}
