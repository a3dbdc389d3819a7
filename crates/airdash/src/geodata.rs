//! Administrative boundary map data, fetched once and kept on disk.

use crate::upstream::{DataPortal, UpstreamError};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("map data download failed: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Local snapshot of the map topology.
///
/// Once the snapshot file exists it is always served as-is; the upstream is
/// only contacted while the file is missing or unreadable.
#[derive(Debug, Clone)]
pub struct GeoStore {
    path: PathBuf,
}

impl GeoStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serve the snapshot, downloading and persisting it first if needed.
    pub async fn load_or_fetch<U: DataPortal>(&self, upstream: &U) -> Result<String, GeoError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => return Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to read map snapshot {}: {}",
                self.path.display(),
                e
            ),
        }

        log::info!("Downloading administrative map data...");
        let text = upstream.map_topology().await?;

        if let Err(e) = self.persist(&text).await {
            log::error!(
                "Failed to write map snapshot {}: {}",
                self.path.display(),
                e
            );
        } else {
            log::info!("Map data cached at {}", self.path.display());
        }
        Ok(text)
    }

    async fn persist(&self, text: &str) -> Result<(), GeoError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, text).await?;
        Ok(())
    }
}
