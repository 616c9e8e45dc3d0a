//! Local disk storage for uploaded photos

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

/// URL prefix under which stored photos are served
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Maximum accepted upload body size
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Photo store rooted at a local directory
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `data` under a fresh unique name and return its public URL
    pub async fn save(&self, original_name: Option<&str>, data: &[u8]) -> Result<String> {
        fs::create_dir_all(&self.dir).await?;

        let filename = unique_filename(original_name);
        fs::write(self.dir.join(&filename), data).await?;

        info!("Stored upload {} ({} bytes)", filename, data.len());
        Ok(format!("{}/{}", UPLOADS_URL_PREFIX, filename))
    }
}

fn unique_filename(original_name: Option<&str>) -> String {
    format!(
        "{}-{}",
        Uuid::new_v4().simple(),
        sanitize_filename(original_name.unwrap_or_default())
    )
}

/// Reduce a client-supplied name to a safe final path component
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "photo".to_string()
    } else {
        cleaned.to_string()
    }
}
