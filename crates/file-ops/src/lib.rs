//! Scope-guarded filesystem operations.
//!
//! Every function takes the caller's [`Scope`](courier_scope::Scope) and
//! refuses paths outside it. Errors are operator-facing strings, ready to
//! hand back over the wire.

mod browse;
mod manage;
mod store;

pub use browse::{file_status, list_directory};
pub use manage::{delete_path, rename_entry};
pub use store::store_file;
