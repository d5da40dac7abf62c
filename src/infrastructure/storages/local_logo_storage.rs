use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::domain::{repositories::storage::LogoStorageClient, value_objects::logos::ValidatedLogo};

#[derive(Debug, Clone)]
pub struct LocalLogoStorageConfig {
    pub directory: String,
    pub public_base_url: String,
}

/// Writes logos to a directory that the HTTP server exposes as static files.
pub struct LocalLogoStorage {
    directory: PathBuf,
    public_base_url: String,
}

impl LocalLogoStorage {
    pub fn new(config: LocalLogoStorageConfig) -> Self {
        Self {
            directory: PathBuf::from(config.directory),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl LogoStorageClient for LocalLogoStorage {
    async fn upload_logo(&self, logo: ValidatedLogo) -> Result<String> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .with_context(|| format!("failed to create logo directory {}", self.directory.display()))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), logo.format.extension());
        let path = self.directory.join(&file_name);
        tokio::fs::write(&path, &logo.bytes)
            .await
            .with_context(|| format!("failed to write logo {}", path.display()))?;

        info!(
            file_name = %file_name,
            size_bytes = logo.bytes.len(),
            content_type = logo.format.content_type(),
            "logo_storage: logo stored"
        );
        Ok(format!("{}/{}", self.public_base_url, file_name))
    }

    async fn delete_logo(&self, logo_url: String) -> Result<()> {
        let file_name = logo_url
            .strip_prefix(&self.public_base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && !name.starts_with('.'))
            .with_context(|| format!("logo url {logo_url} does not belong to this storage"))?;

        let path = self.directory.join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(file_name = %file_name, "logo_storage: logo removed");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to remove logo {}", path.display())),
        }
    }
}
