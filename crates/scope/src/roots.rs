use std::path::{Component, Path, PathBuf};

use crate::ScopeError;

/// A set of allowed root directories.
///
/// All containment questions go through [`Scope::check`], which resolves
/// the candidate (symlinks followed, `..` normalized) and requires the
/// result to be equal to or below one of the roots. Resolution failures
/// count as "not contained"; the check never panics on hostile input.
#[derive(Debug, Clone)]
pub struct Scope {
    roots: Vec<PathBuf>,
}

impl Scope {
    /// Builds a scope from the configured root directories.
    ///
    /// Roots are canonicalized once here; a root that cannot be resolved
    /// (missing, permission) is dropped with a warning. A scope that ends
    /// up with no usable roots denies every path.
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        let roots = roots
            .into_iter()
            .filter_map(|root| match std::fs::canonicalize(&root) {
                Ok(canon) => Some(canon),
                Err(e) => {
                    tracing::warn!(root = %root.display(), error = %e, "dropping unusable allowed root");
                    None
                }
            })
            .collect();
        Self { roots }
    }

    /// The canonicalized allowed roots.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Resolves `candidate` and verifies it stays inside an allowed root.
    ///
    /// Returns the resolved path on success, ready for filesystem use. The
    /// candidate does not have to exist yet: the deepest existing ancestor
    /// is resolved through the filesystem and the remainder is normalized
    /// lexically, with any `..` that would climb out rejected.
    pub fn check(&self, candidate: &Path) -> Result<PathBuf, ScopeError> {
        let resolved = resolve(candidate)?;
        if self.roots.iter().any(|root| resolved.starts_with(root)) {
            Ok(resolved)
        } else {
            tracing::warn!(path = %resolved.display(), "path escapes allowed roots");
            Err(ScopeError::Escapes(resolved.display().to_string()))
        }
    }

    /// Boolean form of [`Scope::check`].
    pub fn contains(&self, candidate: &Path) -> bool {
        self.check(candidate).is_ok()
    }
}

/// Resolves a path that may not fully exist yet.
fn resolve(candidate: &Path) -> Result<PathBuf, ScopeError> {
    let abs = std::path::absolute(candidate)
        .map_err(|e| ScopeError::Unresolvable(format!("{}: {e}", candidate.display())))?;

    // Fast path: everything exists, let the filesystem do the work.
    if let Ok(canon) = std::fs::canonicalize(&abs) {
        return Ok(canon);
    }

    // Find the deepest ancestor that exists on disk. `symlink_metadata`
    // (not `exists`) so a dangling symlink stops the climb and fails the
    // canonicalize below instead of being treated as a plain name.
    let mut ancestor = abs.as_path();
    while std::fs::symlink_metadata(ancestor).is_err() {
        ancestor = ancestor
            .parent()
            .ok_or_else(|| ScopeError::Unresolvable(abs.display().to_string()))?;
    }

    let base = std::fs::canonicalize(ancestor)
        .map_err(|e| ScopeError::Unresolvable(format!("{}: {e}", abs.display())))?;
    let remainder = abs
        .strip_prefix(ancestor)
        .map_err(|_| ScopeError::Unresolvable(abs.display().to_string()))?;

    // The remainder does not exist, so no symlinks are possible in it and
    // lexical normalization is sound.
    let mut resolved = base;
    for component in remainder.components() {
        match component {
            Component::Normal(name) => resolved.push(name),
            Component::CurDir => {}
            Component::ParentDir => {
                if !resolved.pop() {
                    return Err(ScopeError::Escapes(abs.display().to_string()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ScopeError::Unresolvable(abs.display().to_string()));
            }
        }
    }
    Ok(resolved)
}
