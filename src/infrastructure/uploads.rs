use crate::domain::order::UploadedFile;
use crate::domain::ports::UploadStore;
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::io;
use std::path::Path;
use tracing::debug;

/// Uploads kept on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalUploads;

impl LocalUploads {
    /// Copies `source` into `dir` under a unique, sanitized name.
    ///
    /// The stored name is `<millis>-<nanos>-<original name>` with anything
    /// outside `[A-Za-z0-9._-]` removed from the original name.
    pub async fn import(&self, dir: &Path, source: &Path) -> Result<UploadedFile> {
        let original = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let safe: String = original
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            .collect();

        let now = Utc::now();
        let stored = format!(
            "{}-{}-{safe}",
            now.timestamp_millis(),
            now.timestamp_subsec_nanos()
        );
        tokio::fs::create_dir_all(dir).await?;
        let target = dir.join(stored);
        tokio::fs::copy(source, &target).await?;
        debug!(path = %target.display(), "Accepted upload");

        Ok(UploadedFile::new(target.to_string_lossy(), original))
    }
}

#[async_trait]
impl UploadStore for LocalUploads {
    async fn release(&self, file: &UploadedFile) -> Result<()> {
        match tokio::fs::remove_file(&file.file_path).await {
            Ok(()) => {
                debug!(path = %file.file_path, "Released upload");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
