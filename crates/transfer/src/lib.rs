//! The transfer engine: resumable HTTP downloads into scope-guarded
//! directories and chunked uploads assembled on disk.
//!
//! [`TransferCoordinator`] is the boundary the embedding server talks to;
//! everything below it ([`Downloader`], [`ChunkStore`]) can also be driven
//! directly. Progress and terminal status flow through an [`EventSink`],
//! never through return values of the background work.

mod chunks;
mod coordinator;
mod download;
mod name;
mod policy;
mod sink;

pub use chunks::ChunkStore;
pub use coordinator::{EngineConfig, TransferCoordinator};
pub use download::{DownloadJob, Downloader};
pub use policy::DownloadPolicy;
pub use sink::EventSink;

/// Default upper bound for a single body read: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error {status}")]
    Status { status: u16 },

    #[error("incomplete body: got {received} of {expected} bytes")]
    Incomplete { received: u64, expected: u64 },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("access denied: {0}")]
    Denied(#[from] courier_scope::ScopeError),

    #[error("missing chunk {index}")]
    MissingChunk { index: u32 },
}
