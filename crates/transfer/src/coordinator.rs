//! Front door tying scope, downloads and uploads together.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Url;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::info;

use courier_protocol::{ChunkAck, DownloadAck, StartDownloadRequest, UploadChunkRequest};
use courier_scope::{Scope, validate_entry_name};

use crate::{ChunkStore, DownloadJob, DownloadPolicy, Downloader, EventSink, TransferError};

/// Engine-level settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directories transfers may write into.
    pub allowed_roots: Vec<PathBuf>,
    /// Staging root for upload sessions.
    pub upload_temp_root: PathBuf,
    pub policy: DownloadPolicy,
}

/// One shared entry point for both transfer directions.
///
/// Requests are validated synchronously. Accepted downloads then run on a
/// spawned task and report through the sink; chunk submissions run to
/// completion within the call so the ack reflects the real outcome.
pub struct TransferCoordinator {
    scope: Arc<Scope>,
    downloader: Arc<Downloader>,
    store: ChunkStore,
    sink: Arc<dyn EventSink>,
}

impl TransferCoordinator {
    pub fn new(config: EngineConfig, sink: Arc<dyn EventSink>) -> Result<Self, TransferError> {
        let scope = Arc::new(Scope::new(config.allowed_roots));
        let downloader = Arc::new(Downloader::new(config.policy, Arc::clone(&scope))?);
        Ok(Self {
            scope,
            downloader,
            store: ChunkStore::new(config.upload_temp_root),
            sink,
        })
    }

    /// The scope transfers are confined to, shared with callers that do
    /// their own path checks.
    pub fn scope(&self) -> &Arc<Scope> {
        &self.scope
    }

    /// Validates the request and spawns the download.
    ///
    /// The ack only confirms the download started; progress and the
    /// terminal outcome arrive through the sink. Must be called from
    /// within a runtime.
    pub fn start_download(&self, req: StartDownloadRequest) -> Result<DownloadAck, TransferError> {
        if req.url.is_empty() {
            return Err(TransferError::InvalidRequest("missing url".into()));
        }
        if req.destination_dir.is_empty() {
            return Err(TransferError::InvalidRequest(
                "missing destination directory".into(),
            ));
        }
        let url = Url::parse(&req.url)
            .map_err(|e| TransferError::InvalidRequest(format!("invalid url: {e}")))?;
        if let Some(name) = &req.file_name {
            validate_entry_name(name)?;
        }
        let dest_dir = self.scope.check(Path::new(&req.destination_dir))?;

        let mut headers = HeaderMap::new();
        if let Some(value) = &req.auth_header_value {
            let mut value = HeaderValue::from_str(value).map_err(|_| {
                TransferError::InvalidRequest("invalid authorization header value".into())
            })?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let job = DownloadJob {
            url: url.into(),
            dest_dir,
            file_name: req.file_name,
            headers,
        };

        info!(url = %job.url, "accepted download request");
        let downloader = Arc::clone(&self.downloader);
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            // Terminal state reaches the sink from inside run.
            let _ = downloader.run(job, sink.as_ref()).await;
        });
        Ok(DownloadAck::Initiated)
    }

    /// Stores one upload chunk, assembling the file on the terminal one.
    pub async fn submit_chunk(&self, req: UploadChunkRequest) -> Result<ChunkAck, TransferError> {
        self.store.accept(&self.scope, req).await
    }
}
