//! Raw HTML dump for debugging renderer output.

use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::error::Result;
use crate::traits::RenderedPage;

pub const DEFAULT_DUMP_PATH: &str = "logs/rendered_pages.log";

/// Appends every rendered page to a local file.
#[derive(Debug, Clone)]
pub struct HtmlDump {
    path: PathBuf,
}

impl HtmlDump {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a page. Failures are logged, never returned.
    pub async fn append(&self, page: &RenderedPage) {
        if let Err(e) = self.try_append(page).await {
            warn!(path = %self.path.display(), url = %page.url, error = %e, "HTML dump failed");
        }
    }

    async fn try_append(&self, page: &RenderedPage) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let entry = format!(
            "==> {} @ {}\n{}\n\n",
            page.url,
            page.fetched_at.to_rfc3339(),
            page.html
        );
        file.write_all(entry.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
