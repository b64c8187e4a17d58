//! Resumable, retried HTTP downloads.
//!
//! One [`Downloader`] owns a client and a policy and can run any number of
//! downloads. Each run makes up to `max_retries` attempts; whatever a
//! previous attempt left on disk sets the next attempt's `Range` offset.

use std::path::PathBuf;
use std::sync::Arc;

use futures_util::TryStreamExt;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tracing::{error, info, warn};

use courier_protocol::TransferEvent;
use courier_scope::{Scope, validate_entry_name};

use crate::name::derive_file_name;
use crate::{DownloadPolicy, EventSink, TransferError};

/// One download to perform.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub url: String,
    /// Directory the file lands in. Must be inside the scope.
    pub dest_dir: PathBuf,
    /// Known file name; derived from the response when `None`.
    pub file_name: Option<String>,
    /// Extra request headers, typically `Authorization`.
    pub headers: HeaderMap,
}

/// Name and on-disk path of a download, fixed the first time they are
/// known and never changed afterwards.
#[derive(Debug, Clone)]
struct Target {
    name: String,
    path: PathBuf,
}

enum AttemptFailure {
    /// Stop retrying and surface the error.
    Fatal(TransferError),
    /// Worth another attempt. `resumed_from` is the byte offset this
    /// attempt started at, used to decide stub cleanup at exhaustion.
    Retry {
        error: TransferError,
        resumed_from: u64,
    },
}

/// Runs resumable downloads against one policy.
pub struct Downloader {
    client: reqwest::Client,
    policy: DownloadPolicy,
    scope: Arc<Scope>,
}

impl Downloader {
    /// Builds the HTTP client with the policy's timeouts baked in.
    pub fn new(policy: DownloadPolicy, scope: Arc<Scope>) -> Result<Self, TransferError> {
        let client = reqwest::Client::builder()
            .connect_timeout(policy.connect_timeout)
            .timeout(policy.total_timeout)
            .build()?;
        Ok(Self {
            client,
            policy,
            scope,
        })
    }

    /// Runs the download to its terminal state.
    ///
    /// Emits `Progress` events while streaming and exactly one terminal
    /// event, `Complete` or `Error`, before returning. The returned path
    /// duplicates the `Complete` payload for direct callers; spawned
    /// callers can drop it and watch the sink instead.
    pub async fn run(
        &self,
        job: DownloadJob,
        sink: &dyn EventSink,
    ) -> Result<PathBuf, TransferError> {
        if let Some(name) = &job.file_name {
            if let Err(e) = validate_entry_name(name) {
                let err = TransferError::from(e);
                sink.emit(TransferEvent::Error {
                    name: name.clone(),
                    message: err.to_string(),
                });
                return Err(err);
            }
        }

        info!(url = %job.url, dest = %job.dest_dir.display(), "download started");

        let mut target: Option<Target> = None;
        let mut last_percent: i64 = -1;
        let attempts = self.policy.max_retries.max(1);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self
                .attempt(&job, &mut target, &mut last_percent, sink)
                .await
            {
                Ok(done) => {
                    info!(name = %done.name, path = %done.path.display(), "download complete");
                    sink.emit(TransferEvent::Complete {
                        name: done.name,
                        final_path: done.path.display().to_string(),
                    });
                    return Ok(done.path);
                }
                Err(AttemptFailure::Fatal(err)) => {
                    let name = display_name(&job, &target);
                    error!(name = %name, error = %err, "download failed");
                    sink.emit(TransferEvent::Error {
                        name,
                        message: err.to_string(),
                    });
                    return Err(err);
                }
                Err(AttemptFailure::Retry { error, resumed_from }) => {
                    warn!(attempt, max_attempts = attempts, error = %error, "download attempt failed");
                    if attempt >= attempts {
                        let name = display_name(&job, &target);
                        error!(name = %name, attempts, "download abandoned");
                        sink.emit(TransferEvent::Error {
                            name,
                            message: error.to_string(),
                        });
                        // A final attempt that started from offset zero
                        // leaves at most a corrupt stub behind.
                        if resumed_from == 0 {
                            if let Some(t) = &target {
                                let _ = tokio::fs::remove_file(&t.path).await;
                            }
                        }
                        return Err(error);
                    }
                    tokio::time::sleep(self.policy.retry_sleep).await;
                }
            }
        }
    }

    async fn attempt(
        &self,
        job: &DownloadJob,
        target: &mut Option<Target>,
        last_percent: &mut i64,
        sink: &dyn EventSink,
    ) -> Result<Target, AttemptFailure> {
        // The path is known up front only if the caller named the file or a
        // previous attempt resolved it.
        let known = match target {
            Some(t) => Some(t.clone()),
            None => job.file_name.as_ref().map(|name| Target {
                name: name.clone(),
                path: job.dest_dir.join(name),
            }),
        };

        // Resume from whatever is on disk right now, re-checked on every
        // attempt so external changes to the partial are picked up.
        let mut resumed_from = 0u64;
        if let Some(t) = &known {
            if let Ok(meta) = tokio::fs::metadata(&t.path).await {
                resumed_from = meta.len();
            }
        }

        let mut request = self.client.get(&job.url).headers(job.headers.clone());
        if resumed_from > 0 {
            request = request.header(header::RANGE, format!("bytes={resumed_from}-"));
            if let Some(t) = &known {
                info!(name = %t.name, offset = resumed_from, "resuming download");
            }
        }

        let response = request.send().await.map_err(|e| AttemptFailure::Retry {
            error: e.into(),
            resumed_from,
        })?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
            let err = TransferError::Status {
                status: status.as_u16(),
            };
            return Err(match status.as_u16() {
                401 | 403 | 404 => AttemptFailure::Fatal(err),
                _ => AttemptFailure::Retry {
                    error: err,
                    resumed_from,
                },
            });
        }

        // Fix the name and path exactly once, then re-check the full path
        // against the scope before the first open. Derived names are
        // base names only, but the destination could still reach outside
        // through a symlink.
        let resolved = match known {
            Some(t) => t,
            None => {
                let name = derive_file_name(response.headers(), &job.url);
                let t = Target {
                    path: job.dest_dir.join(&name),
                    name,
                };
                info!(name = %t.name, path = %t.path.display(), "resolved download file name");
                t
            }
        };
        let checked = self
            .scope
            .check(&resolved.path)
            .map_err(|e| AttemptFailure::Fatal(e.into()))?;
        let resolved = Target {
            name: resolved.name,
            path: checked,
        };
        *target = Some(resolved.clone());

        if let Some(parent) = resolved.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AttemptFailure::Retry {
                    error: e.into(),
                    resumed_from,
                })?;
        }

        // Total size comes from the Content-Range total on 206 and from
        // Content-Length on 200; zero means unknown.
        let mut total = header_u64(response.headers(), header::CONTENT_LENGTH);
        if status == StatusCode::PARTIAL_CONTENT {
            if let Some(t) = content_range_total(response.headers()) {
                total = t;
            }
        } else if resumed_from > 0 {
            // 200 despite a Range request: the server resent the whole
            // body, so the partial offset is void.
            warn!(name = %resolved.name, "server ignored range request, restarting from zero");
            resumed_from = 0;
        }

        let mut file = if resumed_from > 0 {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&resolved.path)
                .await
        } else {
            File::create(&resolved.path).await
        }
        .map_err(|e| AttemptFailure::Retry {
            error: e.into(),
            resumed_from,
        })?;

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let mut reader = StreamReader::new(stream);
        let mut buf = vec![0u8; self.policy.chunk_size.max(1)];
        let mut read_this_attempt = 0u64;

        loop {
            let n = reader.read(&mut buf).await.map_err(|e| AttemptFailure::Retry {
                error: e.into(),
                resumed_from,
            })?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])
                .await
                .map_err(|e| AttemptFailure::Retry {
                    error: e.into(),
                    resumed_from,
                })?;
            read_this_attempt += n as u64;

            if total > 0 {
                // Reported bytes and percent are clamped to the advertised
                // total even if the server over-delivers.
                let current = (resumed_from + read_this_attempt).min(total);
                let percent = (current.saturating_mul(100) / total).min(100);
                if (percent as i64) > *last_percent {
                    *last_percent = percent as i64;
                    sink.emit(TransferEvent::Progress {
                        name: resolved.name.clone(),
                        downloaded_bytes: current,
                        total_bytes: total,
                        percent: percent as u32,
                    });
                }
            }
        }

        file.flush().await.map_err(|e| AttemptFailure::Retry {
            error: e.into(),
            resumed_from,
        })?;

        let received = resumed_from + read_this_attempt;
        if total > 0 && received != total {
            return Err(AttemptFailure::Retry {
                error: TransferError::Incomplete {
                    received,
                    expected: total,
                },
                resumed_from,
            });
        }

        Ok(resolved)
    }
}

/// Best name available for an error event: resolved name, then the
/// requested one, then a placeholder.
fn display_name(job: &DownloadJob, target: &Option<Target>) -> String {
    if let Some(t) = target {
        t.name.clone()
    } else if let Some(name) = &job.file_name {
        name.clone()
    } else {
        "unknown".to_string()
    }
}

/// Parses a numeric header; absent or malformed reads as 0 (unknown).
fn header_u64(headers: &HeaderMap, key: header::HeaderName) -> u64 {
    headers
        .get(key)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

/// Total size from `Content-Range: bytes <from>-<to>/<total>`.
fn content_range_total(headers: &HeaderMap) -> Option<u64> {
    let value = headers.get(header::CONTENT_RANGE)?.to_str().ok()?;
    value.rsplit('/').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::path::Path;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn quick_policy() -> DownloadPolicy {
        DownloadPolicy {
            max_retries: 2,
            retry_sleep: Duration::from_millis(10),
            ..DownloadPolicy::default()
        }
    }

    fn downloader_for(root: &Path, policy: DownloadPolicy) -> Downloader {
        let scope = Arc::new(Scope::new([root.to_path_buf()]));
        Downloader::new(policy, scope).unwrap()
    }

    fn job(url: String, dir: &Path, name: Option<&str>) -> DownloadJob {
        DownloadJob {
            url,
            dest_dir: dir.to_path_buf(),
            file_name: name.map(str::to_string),
            headers: HeaderMap::new(),
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<TransferEvent>) -> Vec<TransferEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    fn channel_sink() -> (impl EventSink, mpsc::UnboundedReceiver<TransferEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = move |ev| {
            let _ = tx.send(ev);
        };
        (sink, rx)
    }

    fn test_data(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    /// Serves one GET with a close-delimited body: a 200 without a
    /// Content-Length, so the length is known only once the connection ends.
    async fn serve_unsized_once(body: Vec<u8>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
            stream.write_all(&body).await.unwrap();
            stream.shutdown().await.unwrap();
        });
        format!("http://{addr}/stream.bin")
    }

    #[tokio::test]
    async fn downloads_whole_file() {
        let tmp = tempfile::tempdir().unwrap();
        let data = test_data(64 * 1024);

        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/files/model.bin");
            then.status(200)
                .header("content-length", data.len().to_string())
                .body(&data);
        });

        let downloader = downloader_for(tmp.path(), DownloadPolicy::default());
        let (sink, mut rx) = channel_sink();
        let path = downloader
            .run(job(server.url("/files/model.bin"), tmp.path(), None), &sink)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(path.file_name().unwrap(), "model.bin");
        assert_eq!(std::fs::read(&path).unwrap(), data);

        let events = drain(&mut rx);
        match events.last() {
            Some(TransferEvent::Complete { name, final_path }) => {
                assert_eq!(name, "model.bin");
                assert!(final_path.ends_with("model.bin"));
            }
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resumes_with_range_request() {
        let tmp = tempfile::tempdir().unwrap();
        let data = test_data(3 * 1024 * 1024);
        let first_part = &data[..1024 * 1024];
        let second_part = &data[1024 * 1024..];

        // A previously interrupted attempt left the first MiB behind.
        std::fs::write(tmp.path().join("model.bin"), first_part).unwrap();

        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/model.bin")
                .header("range", "bytes=1048576-");
            then.status(206)
                .header("content-length", second_part.len().to_string())
                .header(
                    "content-range",
                    format!("bytes 1048576-{}/{}", data.len() - 1, data.len()),
                )
                .body(second_part);
        });

        let downloader = downloader_for(tmp.path(), DownloadPolicy::default());
        let (sink, mut rx) = channel_sink();
        let path = downloader
            .run(
                job(server.url("/model.bin"), tmp.path(), Some("model.bin")),
                &sink,
            )
            .await
            .unwrap();

        mock.assert();
        let result = std::fs::read(&path).unwrap();
        assert_eq!(result.len(), 3_145_728);
        assert_eq!(result, data);

        // Progress picks up at the resume point, never before it.
        let events = drain(&mut rx);
        let percents: Vec<u32> = events
            .iter()
            .filter_map(|ev| match ev {
                TransferEvent::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();
        assert!(percents.first().copied().unwrap_or(0) >= 33);
        assert_eq!(percents.last().copied(), Some(100));
        assert!(events.last().unwrap().is_terminal());
    }

    #[tokio::test]
    async fn restarts_when_server_ignores_range() {
        let tmp = tempfile::tempdir().unwrap();
        let data = test_data(8 * 1024);

        // Stale partial that the server refuses to resume.
        std::fs::write(tmp.path().join("model.bin"), vec![0xFFu8; 512]).unwrap();

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/model.bin");
            then.status(200)
                .header("content-length", data.len().to_string())
                .body(&data);
        });

        let downloader = downloader_for(tmp.path(), DownloadPolicy::default());
        let (sink, _rx) = channel_sink();
        let path = downloader
            .run(
                job(server.url("/model.bin"), tmp.path(), Some("model.bin")),
                &sink,
            )
            .await
            .unwrap();

        // No stale prefix survives the restart.
        assert_eq!(std::fs::read(&path).unwrap(), data);
    }

    #[tokio::test]
    async fn fatal_status_stops_immediately() {
        let tmp = tempfile::tempdir().unwrap();

        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/gone.bin");
            then.status(404);
        });

        let downloader = downloader_for(tmp.path(), quick_policy());
        let (sink, mut rx) = channel_sink();
        let result = downloader
            .run(job(server.url("/gone.bin"), tmp.path(), None), &sink)
            .await;

        assert!(matches!(
            result,
            Err(TransferError::Status { status: 404 })
        ));
        assert_eq!(mock.hits(), 1);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            TransferEvent::Error { name, message } => {
                assert_eq!(name, "unknown");
                assert!(message.contains("404"));
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn retries_then_reports_single_error() {
        let tmp = tempfile::tempdir().unwrap();

        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/flaky.bin");
            then.status(500);
        });

        let downloader = downloader_for(tmp.path(), quick_policy());
        let (sink, mut rx) = channel_sink();
        let result = downloader
            .run(job(server.url("/flaky.bin"), tmp.path(), None), &sink)
            .await;

        assert!(result.is_err());
        assert_eq!(mock.hits(), 2);

        let events = drain(&mut rx);
        let errors = events
            .iter()
            .filter(|ev| matches!(ev, TransferEvent::Error { .. }))
            .count();
        assert_eq!(errors, 1, "exactly one terminal error, got {events:?}");
    }

    #[tokio::test]
    async fn short_body_from_zero_removes_stub() {
        let tmp = tempfile::tempdir().unwrap();
        let partial = test_data(1024);

        // 206 with a larger advertised total than the delivered body: the
        // stream ends early and the single-attempt budget exhausts.
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/cut.bin");
            then.status(206)
                .header("content-length", partial.len().to_string())
                .header("content-range", "bytes 0-1023/4096")
                .body(&partial);
        });

        let policy = DownloadPolicy {
            max_retries: 1,
            ..quick_policy()
        };
        let downloader = downloader_for(tmp.path(), policy);
        let (sink, mut rx) = channel_sink();
        let result = downloader
            .run(job(server.url("/cut.bin"), tmp.path(), Some("cut.bin")), &sink)
            .await;

        assert!(matches!(
            result,
            Err(TransferError::Incomplete {
                received: 1024,
                expected: 4096
            })
        ));
        assert!(!tmp.path().join("cut.bin").exists(), "stub must be removed");

        let events = drain(&mut rx);
        assert_eq!(
            events
                .iter()
                .filter(|ev| matches!(ev, TransferEvent::Error { .. }))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn incomplete_body_resumes_and_keeps_partial() {
        let tmp = tempfile::tempdir().unwrap();
        let chunk = test_data(1024);

        // Seeded partial so both attempts go through the resume path.
        std::fs::write(tmp.path().join("drip.bin"), &chunk).unwrap();

        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET)
                .path("/drip.bin")
                .header("range", "bytes=1024-");
            then.status(206)
                .header("content-length", chunk.len().to_string())
                .header("content-range", "bytes 1024-2047/999999")
                .body(&chunk);
        });
        let second = server.mock(|when, then| {
            when.method(GET)
                .path("/drip.bin")
                .header("range", "bytes=2048-");
            then.status(206)
                .header("content-length", chunk.len().to_string())
                .header("content-range", "bytes 2048-3071/999999")
                .body(&chunk);
        });

        let downloader = downloader_for(tmp.path(), quick_policy());
        let (sink, mut rx) = channel_sink();
        let result = downloader
            .run(
                job(server.url("/drip.bin"), tmp.path(), Some("drip.bin")),
                &sink,
            )
            .await;

        assert!(matches!(result, Err(TransferError::Incomplete { .. })));
        first.assert();
        second.assert();

        // Each attempt resumed past the last one's bytes and the partial
        // stays on disk for a future run.
        let on_disk = std::fs::read(tmp.path().join("drip.bin")).unwrap();
        assert_eq!(on_disk.len(), 3072);

        let events = drain(&mut rx);
        assert_eq!(
            events
                .iter()
                .filter(|ev| matches!(ev, TransferEvent::Error { .. }))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn progress_percents_strictly_increase_to_100() {
        let tmp = tempfile::tempdir().unwrap();
        let data = test_data(100 * 1024);

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/steady.bin");
            then.status(200)
                .header("content-length", data.len().to_string())
                .body(&data);
        });

        let policy = DownloadPolicy {
            chunk_size: 1024,
            ..DownloadPolicy::default()
        };
        let downloader = downloader_for(tmp.path(), policy);
        let (sink, mut rx) = channel_sink();
        downloader
            .run(job(server.url("/steady.bin"), tmp.path(), None), &sink)
            .await
            .unwrap();

        let events = drain(&mut rx);
        let percents: Vec<u32> = events
            .iter()
            .filter_map(|ev| match ev {
                TransferEvent::Progress {
                    percent,
                    downloaded_bytes,
                    total_bytes,
                    ..
                } => {
                    assert!(downloaded_bytes <= total_bytes);
                    Some(*percent)
                }
                _ => None,
            })
            .collect();

        assert!(!percents.is_empty());
        assert!(percents.windows(2).all(|w| w[0] < w[1]), "{percents:?}");
        assert_eq!(percents.last().copied(), Some(100));
    }

    #[tokio::test]
    async fn unknown_length_body_emits_no_progress() {
        let tmp = tempfile::tempdir().unwrap();
        let data = test_data(8 * 1024);
        let url = serve_unsized_once(data.clone()).await;

        let downloader = downloader_for(tmp.path(), DownloadPolicy::default());
        let (sink, mut rx) = channel_sink();
        let path = downloader
            .run(job(url, tmp.path(), Some("stream.bin")), &sink)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), data);

        // Without a total there is no meaningful percent.
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1, "{events:?}");
        assert!(matches!(events[0], TransferEvent::Complete { .. }));
    }

    #[tokio::test]
    async fn derives_name_from_disposition_header() {
        let tmp = tempfile::tempdir().unwrap();
        let data = test_data(2048);

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/d/12345");
            then.status(200)
                .header("content-length", data.len().to_string())
                .header(
                    "content-disposition",
                    r#"attachment; filename="weights.safetensors""#,
                )
                .body(&data);
        });

        let downloader = downloader_for(tmp.path(), DownloadPolicy::default());
        let (sink, mut rx) = channel_sink();
        let path = downloader
            .run(job(server.url("/d/12345"), tmp.path(), None), &sink)
            .await
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "weights.safetensors");
        let events = drain(&mut rx);
        assert_eq!(events.last().unwrap().name(), "weights.safetensors");
    }

    #[tokio::test]
    async fn rejects_destination_outside_scope() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let data = test_data(128);

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/evil.bin");
            then.status(200).body(&data);
        });

        let downloader = downloader_for(root.path(), quick_policy());
        let (sink, mut rx) = channel_sink();
        let result = downloader
            .run(
                job(server.url("/evil.bin"), outside.path(), Some("evil.bin")),
                &sink,
            )
            .await;

        assert!(matches!(result, Err(TransferError::Denied(_))));
        assert!(
            !outside.path().join("evil.bin").exists(),
            "no file may be created outside the scope"
        );

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], TransferEvent::Error { .. }));
    }

    #[tokio::test]
    async fn forwards_request_headers() {
        let tmp = tempfile::tempdir().unwrap();
        let data = test_data(256);

        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/private.bin")
                .header("authorization", "Bearer sekrit");
            then.status(200)
                .header("content-length", data.len().to_string())
                .body(&data);
        });

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_static("Bearer sekrit"),
        );
        let downloader = downloader_for(tmp.path(), DownloadPolicy::default());
        let (sink, _rx) = channel_sink();
        downloader
            .run(
                DownloadJob {
                    url: server.url("/private.bin"),
                    dest_dir: tmp.path().to_path_buf(),
                    file_name: Some("private.bin".into()),
                    headers,
                },
                &sink,
            )
            .await
            .unwrap();

        mock.assert();
    }

    #[test]
    fn content_range_total_parses() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_RANGE,
            header::HeaderValue::from_static("bytes 100-199/1234"),
        );
        assert_eq!(content_range_total(&headers), Some(1234));
    }

    #[test]
    fn content_range_unknown_total_is_none() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_RANGE,
            header::HeaderValue::from_static("bytes 100-199/*"),
        );
        assert_eq!(content_range_total(&headers), None);
    }

    #[test]
    fn missing_content_length_reads_zero() {
        let headers = HeaderMap::new();
        assert_eq!(header_u64(&headers, header::CONTENT_LENGTH), 0);
    }
}
