//! JSON output of aggregated pages.

use crate::error::Result;
use crate::models::ArticlesPage;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

pub fn page_to_json(page: &ArticlesPage) -> Result<String> {
    Ok(serde_json::to_string_pretty(page)?)
}

/// Write `page` as pretty JSON to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_page(page: &ArticlesPage, path: &Path) -> Result<()> {
    let json = page_to_json(page)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, json).await?;
    info!(articles = page.articles.len(), "Wrote JSON page");
    Ok(())
}
