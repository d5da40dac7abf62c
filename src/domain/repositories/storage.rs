use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::logos::ValidatedLogo;

#[automock]
#[async_trait]
pub trait LogoStorageClient {
    /// Persists the image and returns the public URL it is served from.
    async fn upload_logo(&self, logo: ValidatedLogo) -> Result<String>;
    /// Removes a logo previously returned by `upload_logo`. Missing files are not an error.
    async fn delete_logo(&self, logo_url: String) -> Result<()>;
}
