use std::path::{Component, Path};

use crate::ScopeError;

/// Checks a client-supplied entry name before it is joined to a directory.
///
/// A usable name is relative and never climbs: `..` anywhere in the name
/// fails, as does an absolute path or a Windows prefix. Nested forms like
/// `clips/take1.mp4` pass and are joined as-is; the joined result still has
/// to clear the owning [`Scope`](crate::Scope) before use.
pub fn validate_entry_name(name: &str) -> Result<(), ScopeError> {
    if name.is_empty() {
        return Err(ScopeError::InvalidName("empty name".into()));
    }
    // RootDir and Prefix components cover every absolute form on both
    // platforms, including root-relative `\foo` and drive-relative `C:foo`.
    let verdict = Path::new(name).components().find_map(|part| match part {
        Component::Normal(_) | Component::CurDir => None,
        Component::ParentDir => Some("climbs out of its directory"),
        Component::RootDir | Component::Prefix(_) => Some("is not relative"),
    });
    match verdict {
        Some(problem) => Err(ScopeError::InvalidName(format!("{name:?} {problem}"))),
        None => Ok(()),
    }
}
