//! Chunked upload sessions and final assembly.
//!
//! Parts are spooled under a per-session staging directory until the
//! terminal chunk arrives, then concatenated in index order and moved to
//! the final name in one rename.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use courier_protocol::{ChunkAck, UploadChunkRequest};
use courier_scope::{Scope, validate_entry_name};

use crate::TransferError;

/// Spools upload chunks below one staging root.
#[derive(Debug, Clone)]
pub struct ChunkStore {
    temp_root: PathBuf,
}

impl ChunkStore {
    pub fn new(temp_root: impl Into<PathBuf>) -> Self {
        Self {
            temp_root: temp_root.into(),
        }
    }

    /// Staging directory for a session. The client-supplied id is hashed
    /// so it can never influence the directory layout.
    pub fn session_dir(&self, session_id: &str) -> PathBuf {
        self.temp_root.join(session_key(session_id))
    }

    /// Chunk indices currently spooled for a session.
    pub fn received_indices(&self, session_id: &str) -> BTreeSet<u32> {
        let mut indices = BTreeSet::new();
        let Ok(entries) = std::fs::read_dir(self.session_dir(session_id)) else {
            return indices;
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(raw) = name
                .strip_prefix("chunk_")
                .and_then(|s| s.strip_suffix(".part"))
            {
                if let Ok(index) = raw.parse() {
                    indices.insert(index);
                }
            }
        }
        indices
    }

    /// Persists one chunk; on the terminal chunk, assembles the file.
    ///
    /// Assembly requires every index from 0 through the terminal index to
    /// be present. On success the session directory is gone; on failure it
    /// stays, including the chunk this call just wrote.
    pub async fn accept(
        &self,
        scope: &Scope,
        req: UploadChunkRequest,
    ) -> Result<ChunkAck, TransferError> {
        let UploadChunkRequest {
            session_id,
            chunk_index,
            is_last,
            data,
            target_dir,
            final_file_name,
        } = req;

        if session_id.is_empty() {
            return Err(TransferError::InvalidRequest("missing session id".into()));
        }
        if data.is_empty() {
            return Err(TransferError::InvalidRequest("empty chunk payload".into()));
        }

        let dir = self.session_dir(&session_id);
        let part = dir.join(part_name(chunk_index));
        let size = data.len();
        run_blocking(move || {
            std::fs::create_dir_all(&dir)?;
            std::fs::write(&part, &data)?;
            Ok(())
        })
        .await?;
        debug!(session = %session_id, chunk = chunk_index, size, "chunk stored");

        if !is_last {
            return Ok(ChunkAck::ChunkReceived { chunk_index });
        }

        if target_dir.is_empty() {
            return Err(TransferError::InvalidRequest(
                "missing target directory".into(),
            ));
        }
        if final_file_name.is_empty() {
            return Err(TransferError::InvalidRequest(
                "missing final file name".into(),
            ));
        }
        validate_entry_name(&final_file_name)?;
        let resolved_dir = scope.check(Path::new(&target_dir))?;
        let final_path = scope.check(&resolved_dir.join(&final_file_name))?;

        let dir = self.session_dir(&session_id);
        let total = chunk_index.checked_add(1).ok_or_else(|| {
            TransferError::InvalidRequest("terminal chunk index out of range".into())
        })?;
        let assembled = final_path.clone();
        let bytes = run_blocking(move || assemble_parts(&dir, total, &final_path)).await?;
        info!(session = %session_id, path = %assembled.display(), bytes, "upload assembled");
        Ok(ChunkAck::Success)
    }
}

/// Concatenates parts 0..total into `final_path`.
///
/// Writes go to a staging file beside the final path so a failed assembly
/// never leaves a half-written file under the final name.
fn assemble_parts(dir: &Path, total: u32, final_path: &Path) -> Result<u64, TransferError> {
    for index in 0..total {
        if !dir.join(part_name(index)).is_file() {
            return Err(TransferError::MissingChunk { index });
        }
    }

    if let Some(parent) = final_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let staging = staging_path(final_path);
    let staged = concat_parts(dir, total, &staging).and_then(|bytes| {
        std::fs::rename(&staging, final_path)?;
        Ok(bytes)
    });
    match staged {
        Ok(bytes) => {
            if let Err(e) = std::fs::remove_dir_all(dir) {
                warn!(dir = %dir.display(), error = %e, "failed to remove session dir");
            }
            Ok(bytes)
        }
        Err(e) => {
            let _ = std::fs::remove_file(&staging);
            Err(e)
        }
    }
}

fn concat_parts(dir: &Path, total: u32, staging: &Path) -> Result<u64, TransferError> {
    let mut out = std::fs::File::create(staging)?;
    let mut bytes = 0u64;
    for index in 0..total {
        let mut part = std::fs::File::open(dir.join(part_name(index)))?;
        bytes += std::io::copy(&mut part, &mut out)?;
    }
    Ok(bytes)
}

fn part_name(index: u32) -> String {
    format!("chunk_{index}.part")
}

fn staging_path(final_path: &Path) -> PathBuf {
    let mut name = final_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    final_path.with_file_name(name)
}

fn session_key(session_id: &str) -> String {
    let hash = Sha256::digest(session_id.as_bytes());
    hex::encode(&hash[..16])
}

async fn run_blocking<T>(
    task: impl FnOnce() -> Result<T, TransferError> + Send + 'static,
) -> Result<T, TransferError>
where
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(result) => result,
        Err(e) => Err(TransferError::Io(std::io::Error::other(e))),
    }
}
