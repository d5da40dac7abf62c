use std::sync::Arc;

use axum::{Router, extract::State, response::IntoResponse, routing::get};

use crate::{
    application::usecases::users::UserUseCase,
    domain::repositories::users::UserRepository,
    infrastructure::{
        axum_http::{api_response::ApiResponse, auth::AuthUser, error_responses::AppError},
        postgres::{postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let user_usecase = UserUseCase::new(Arc::new(user_repository));

    Router::new()
        .route("/me", get(me))
        .with_state(Arc::new(user_usecase))
}

pub async fn me<U>(
    State(user_usecase): State<Arc<UserUseCase<U>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match user_usecase.me(user_id).await {
        Ok(user) => ApiResponse::ok(user).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
