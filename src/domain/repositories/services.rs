use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::services::{InsertServiceEntity, ServiceEntity};

#[automock]
#[async_trait]
pub trait ServiceRepository {
    /// Predefined services plus the ones created by `owner_id`.
    async fn list_visible(&self, owner_id: Uuid) -> Result<Vec<ServiceEntity>>;
    async fn find_visible(&self, service_id: i32, owner_id: Uuid) -> Result<Option<ServiceEntity>>;
    async fn create_custom(&self, insert_service_entity: InsertServiceEntity) -> Result<ServiceEntity>;
    /// Deletes a custom service owned by `owner_id`. Predefined rows are never touched.
    async fn delete_custom(&self, service_id: i32, owner_id: Uuid) -> Result<()>;
}
