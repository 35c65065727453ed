use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::BrowserConfig;
use crate::error::Result;
use crate::session::SessionStore;

/// Milliseconds since the Unix epoch.
pub fn current_time_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// `<dir>/<millis>.jpeg`, with a relative `dir` resolved against the working directory.
pub fn screenshot_path(dir: &Path, millis: i64) -> Result<PathBuf> {
    let dir = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(dir)
    };
    Ok(dir.join(format!("{millis}.jpeg")))
}

/// Save a full-page JPEG of the session's page and return where it was written.
pub async fn generate_screenshot(
    store: &SessionStore,
    config: &BrowserConfig,
    session_id: &str,
) -> Result<PathBuf> {
    let session = store.require(session_id).await?;
    let session = session.lock().await;

    let path = screenshot_path(&config.screenshot_dir, current_time_millis())?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    session
        .page()
        .save_full_page_jpeg(&path, config.screenshot_quality)
        .await?;

    info!(session_id, path = %path.display(), "screenshot saved");
    Ok(path)
}
