use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{delete, insert_into, prelude::*};
use uuid::Uuid;

use crate::{
    domain::{
        entities::services::{InsertServiceEntity, ServiceEntity},
        repositories::services::ServiceRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::services},
};

pub struct ServicePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ServicePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ServiceRepository for ServicePostgres {
    async fn list_visible(&self, owner_id: Uuid) -> Result<Vec<ServiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = services::table
            .filter(
                services::is_predefined
                    .eq(true)
                    .or(services::owner_id.eq(owner_id)),
            )
            .order(services::name.asc())
            .select(ServiceEntity::as_select())
            .load::<ServiceEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_visible(&self, service_id: i32, owner_id: Uuid) -> Result<Option<ServiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = services::table
            .filter(services::id.eq(service_id))
            .filter(
                services::is_predefined
                    .eq(true)
                    .or(services::owner_id.eq(owner_id)),
            )
            .select(ServiceEntity::as_select())
            .first::<ServiceEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn create_custom(&self, insert_service_entity: InsertServiceEntity) -> Result<ServiceEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(services::table)
            .values(&insert_service_entity)
            .returning(ServiceEntity::as_returning())
            .get_result::<ServiceEntity>(&mut conn)?;

        Ok(result)
    }

    async fn delete_custom(&self, service_id: i32, owner_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(services::table)
            .filter(services::id.eq(service_id))
            .filter(services::owner_id.eq(owner_id))
            .filter(services::is_predefined.eq(false))
            .execute(&mut conn)?;

        Ok(())
    }
}
