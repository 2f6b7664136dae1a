//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the data directory exists and is a directory.
pub async fn ensure_env(data_dir: &Path) -> anyhow::Result<()> {
    if let Ok(meta) = tokio::fs::metadata(data_dir).await {
        if !meta.is_dir() {
            return Err(anyhow::anyhow!("{} exists but is not a directory", data_dir.display()));
        }
        if meta.permissions().readonly() {
            warn!(data_dir = %data_dir.display(), "data directory is read-only; writes will fail");
        }
        return Ok(());
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    info!(data_dir = %data_dir.display(), "created data directory");
    Ok(())
}
