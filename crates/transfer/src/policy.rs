use std::time::Duration;

use crate::DEFAULT_CHUNK_SIZE;

/// Retry and timeout knobs for the download worker.
///
/// A single policy drives every attempt of one download; nothing here is
/// global. The defaults suit interactive asset fetches; [`large_asset`]
/// backs off longer between attempts for multi-gigabyte pulls.
///
/// [`large_asset`]: DownloadPolicy::large_asset
#[derive(Debug, Clone)]
pub struct DownloadPolicy {
    /// Attempt budget. At least one attempt always runs.
    pub max_retries: u32,
    /// TCP/TLS connect timeout, per attempt.
    pub connect_timeout: Duration,
    /// Whole-request timeout, per attempt.
    pub total_timeout: Duration,
    /// Upper bound for a single body read.
    pub chunk_size: usize,
    /// Pause between failed attempts.
    pub retry_sleep: Duration,
}

impl Default for DownloadPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            connect_timeout: Duration::from_secs(60),
            total_timeout: Duration::from_secs(3600),
            chunk_size: DEFAULT_CHUNK_SIZE,
            retry_sleep: Duration::from_secs(5),
        }
    }
}

impl DownloadPolicy {
    /// Preset for very large pulls: same budget, longer pause between
    /// attempts.
    pub fn large_asset() -> Self {
        Self {
            retry_sleep: Duration::from_secs(10),
            ..Self::default()
        }
    }
}
