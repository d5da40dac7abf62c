use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{
    repositories::services::ServiceRepository,
    value_objects::{
        categories::{CATEGORIES, CategoryModel},
        services::{ListServicesFilter, ServiceModel, filter_services},
    },
};

#[derive(Debug, Error)]
pub enum ServiceCatalogError {
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceCatalogError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            ServiceCatalogError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct ServiceCatalogUseCase<S>
where
    S: ServiceRepository + Send + Sync + 'static,
{
    service_repo: Arc<S>,
}

impl<S> ServiceCatalogUseCase<S>
where
    S: ServiceRepository + Send + Sync + 'static,
{
    pub fn new(service_repo: Arc<S>) -> Self {
        Self { service_repo }
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        filter: ListServicesFilter,
    ) -> Result<Vec<ServiceModel>, ServiceCatalogError> {
        let services = self
            .service_repo
            .list_visible(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "services: failed to list services");
                ServiceCatalogError::Internal(err)
            })?;

        let services = filter_services(services.into_iter().map(ServiceModel::from).collect(), &filter);
        info!(%user_id, service_count = services.len(), "services: catalog loaded");
        Ok(services)
    }

    pub fn categories(&self) -> Vec<CategoryModel> {
        CATEGORIES.to_vec()
    }
}
