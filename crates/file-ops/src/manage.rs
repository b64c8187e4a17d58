//! Deletion and renaming inside the scope.

use std::path::Path;

use courier_scope::{Scope, validate_entry_name};
use tracing::info;

/// Removes a scope-contained file or directory tree.
///
/// An allowed root itself is never deleted.
pub fn delete_path(scope: &Scope, path: &Path) -> Result<(), String> {
    let abs = scope
        .check(path)
        .map_err(|e| format!("cannot delete {}: {e}", path.display()))?;

    if scope.roots().iter().any(|root| *root == abs) {
        return Err(format!("refusing to delete allowed root: {}", abs.display()));
    }

    let meta = std::fs::symlink_metadata(&abs)
        .map_err(|e| format!("cannot delete {}: {e}", abs.display()))?;
    if meta.is_dir() {
        std::fs::remove_dir_all(&abs)
            .map_err(|e| format!("failed to delete directory {}: {e}", abs.display()))?;
    } else {
        std::fs::remove_file(&abs)
            .map_err(|e| format!("failed to delete file {}: {e}", abs.display()))?;
    }

    info!(path = %abs.display(), "deleted");
    Ok(())
}

/// Renames a file or directory in place.
///
/// The new name must be a bare entry name; the entry keeps its parent
/// directory. Refuses to clobber an existing target.
pub fn rename_entry(scope: &Scope, path: &Path, new_name: &str) -> Result<(), String> {
    validate_entry_name(new_name).map_err(|e| format!("invalid name: {e}"))?;
    if new_name.contains('/') || new_name.contains('\\') {
        return Err(format!("new name must not contain separators: {new_name}"));
    }

    let abs = scope
        .check(path)
        .map_err(|e| format!("cannot rename {}: {e}", path.display()))?;
    if !abs.exists() {
        return Err(format!("no such entry: {}", abs.display()));
    }
    let parent = abs
        .parent()
        .ok_or_else(|| format!("cannot rename {}", abs.display()))?;
    let target = scope
        .check(&parent.join(new_name))
        .map_err(|e| format!("cannot rename to {new_name}: {e}"))?;

    if target.exists() {
        return Err(format!("target already exists: {}", target.display()));
    }

    std::fs::rename(&abs, &target)
        .map_err(|e| format!("failed to rename {}: {e}", abs.display()))?;

    info!(from = %abs.display(), to = %target.display(), "renamed entry");
    Ok(())
}
