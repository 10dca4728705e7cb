//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{CacheResult, RedbCache};
use crate::error::ClientResult;
use crate::http::CloudClient;

/// Sync engine configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Deadline for the startup snapshot fetch
    pub fetch_timeout: Duration,

    /// Per-request timeout for every other call
    pub request_timeout: Duration,

    /// Cache file; `None` keeps the cache in memory
    pub cache_path: Option<PathBuf>,
}

impl SyncConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            fetch_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            cache_path: None,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> ClientResult<CloudClient> {
        CloudClient::new(self)
    }

    /// Open the configured cache (file or in-memory)
    pub fn open_cache(&self) -> CacheResult<RedbCache> {
        match &self.cache_path {
            Some(path) => RedbCache::open(path),
            None => RedbCache::open_in_memory(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
