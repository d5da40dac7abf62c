use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};

use crate::{
    application::usecases::services::ServiceCatalogUseCase,
    domain::{
        repositories::services::ServiceRepository, value_objects::services::ListServicesFilter,
    },
    infrastructure::{
        axum_http::{api_response::ApiResponse, auth::AuthUser, error_responses::AppError},
        postgres::{postgres_connection::PgPoolSquad, repositories::services::ServicePostgres},
    },
};

fn usecase(db_pool: Arc<PgPoolSquad>) -> ServiceCatalogUseCase<ServicePostgres> {
    ServiceCatalogUseCase::new(Arc::new(ServicePostgres::new(db_pool)))
}

/// `/service`: predefined services plus the caller's custom ones.
pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    Router::new()
        .route("/", get(list))
        .with_state(Arc::new(usecase(db_pool)))
}

/// `/category`: the fixed category catalog.
pub fn category_routes(db_pool: Arc<PgPoolSquad>) -> Router {
    Router::new()
        .route("/", get(categories))
        .with_state(Arc::new(usecase(db_pool)))
}

pub async fn list<S>(
    State(service_usecase): State<Arc<ServiceCatalogUseCase<S>>>,
    AuthUser { user_id, .. }: AuthUser,
    Query(filter): Query<ListServicesFilter>,
) -> impl IntoResponse
where
    S: ServiceRepository + Send + Sync + 'static,
{
    match service_usecase.list(user_id, filter).await {
        Ok(services) => ApiResponse::ok(services).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn categories<S>(
    State(service_usecase): State<Arc<ServiceCatalogUseCase<S>>>,
    _auth: AuthUser,
) -> impl IntoResponse
where
    S: ServiceRepository + Send + Sync + 'static,
{
    ApiResponse::ok(service_usecase.categories()).into_response()
}
