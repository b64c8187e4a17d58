//! Directory listing and file status probes.

use std::path::Path;

use courier_protocol::{DirEntry, EntryKind, FileStatus};
use courier_scope::Scope;

/// Lists the entries of a scope-contained directory.
///
/// Dotfiles are skipped and the result is sorted by name so repeated
/// listings are stable. Symlinked entries count as whatever they point at.
pub fn list_directory(scope: &Scope, path: &Path) -> Result<Vec<DirEntry>, String> {
    let abs = scope
        .check(path)
        .map_err(|e| format!("cannot list {}: {e}", path.display()))?;

    if !abs.is_dir() {
        return Err(format!("not a directory: {}", abs.display()));
    }

    let entries = std::fs::read_dir(&abs)
        .map_err(|e| format!("failed to read directory {}: {e}", abs.display()))?;

    let mut result: Vec<DirEntry> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                return None;
            }
            let kind = if entry.path().is_dir() {
                EntryKind::Folder
            } else {
                EntryKind::File
            };
            Some(DirEntry { name, kind })
        })
        .collect();

    result.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(result)
}

/// Reports whether a scope-contained regular file is present.
///
/// A path that resolves inside the scope but does not exist yet probes as
/// `Missing`; only paths outside the scope are an error.
pub fn file_status(scope: &Scope, path: &Path) -> Result<FileStatus, String> {
    let abs = scope
        .check(path)
        .map_err(|e| format!("cannot probe {}: {e}", path.display()))?;

    if abs.is_file() {
        Ok(FileStatus::Ready)
    } else {
        Ok(FileStatus::Missing)
    }
}
