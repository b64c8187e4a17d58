//! Allowed-root containment checks guarding all filesystem access.
//!
//! Every component that touches the filesystem asks a [`Scope`] first: a
//! path is only usable if it resolves to somewhere inside one of the
//! administrator-configured root directories. Client-supplied file names
//! are additionally vetted by [`validate_entry_name`] before they are ever
//! joined to a directory.

mod names;
mod roots;

pub use names::validate_entry_name;
pub use roots::Scope;

/// Errors produced by scope checks.
///
/// Every variant means "do not touch this path"; the split exists so logs
/// can tell a genuine escape attempt from an unresolvable path.
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    #[error("path escapes allowed roots: {0}")]
    Escapes(String),

    #[error("path cannot be resolved: {0}")]
    Unresolvable(String),

    #[error("invalid entry name: {0}")]
    InvalidName(String),
}
