//! Boundary types for the courier transfer engine.
//!
//! Every shape that crosses the engine boundary lives here: requests to
//! start a download or submit an upload chunk, their acknowledgements, the
//! outbound transfer event stream, and the DTOs returned by the guarded
//! file operations. All types serialize to camelCase JSON.

pub mod events;
pub mod messages;
pub mod types;

pub use events::TransferEvent;
pub use messages::{ChunkAck, DownloadAck, StartDownloadRequest, UploadChunkRequest};
pub use types::{DirEntry, EntryKind, FileStatus};
