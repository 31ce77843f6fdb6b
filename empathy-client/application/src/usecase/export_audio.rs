use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use empathy_domain::{AudioResource, AudioSourcePort};

use crate::ApplicationError;

#[async_trait]
pub trait ExportAudioUseCase: Send + Sync {
    /// Downloads the resource and writes it under its suggested filename in `directory`.
    async fn export(
        &self,
        resource: &AudioResource,
        directory: &Path,
    ) -> Result<PathBuf, ApplicationError>;
}

pub struct ExportAudioUseCaseImpl {
    source: Arc<dyn AudioSourcePort>,
}

impl ExportAudioUseCaseImpl {
    pub fn new(source: Arc<dyn AudioSourcePort>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl ExportAudioUseCase for ExportAudioUseCaseImpl {
    async fn export(
        &self,
        resource: &AudioResource,
        directory: &Path,
    ) -> Result<PathBuf, ApplicationError> {
        tracing::debug!(url = %resource.url, directory = %directory.display(), "exporting audio");

        let bytes = self.source.fetch(&resource.url).await?;
        if bytes.is_empty() {
            return Err(ApplicationError::Internal(format!(
                "audio payload at {} is empty",
                resource.url
            )));
        }

        tokio::fs::create_dir_all(directory).await?;
        let path = directory.join(&resource.suggested_filename);
        // Never replace an earlier export that received the same timestamped name.
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "audio exported");
        Ok(path)
    }
}
