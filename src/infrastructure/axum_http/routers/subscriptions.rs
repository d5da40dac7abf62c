use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use super::today;
use crate::{
    application::usecases::subscriptions::SubscriptionUseCase,
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::{
            services::ServiceRepository, storage::LogoStorageClient,
            subscriptions::SubscriptionRepository,
        },
        value_objects::subscriptions::{
            ListSubscriptionsFilter, PreviewDraftModel, UpsertSubscriptionModel,
        },
    },
    infrastructure::{
        axum_http::{api_response::ApiResponse, auth::AuthUser, error_responses::AppError},
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{services::ServicePostgres, subscriptions::SubscriptionPostgres},
        },
        storages::local_logo_storage::{LocalLogoStorage, LocalLogoStorageConfig},
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let service_repository = ServicePostgres::new(Arc::clone(&db_pool));
    let logo_storage = LocalLogoStorage::new(LocalLogoStorageConfig {
        directory: config.logo_storage.directory.clone(),
        public_base_url: config.logo_storage.public_base_url.clone(),
    });
    let subscription_usecase = SubscriptionUseCase::new(
        Arc::new(subscription_repository),
        Arc::new(service_repository),
        Arc::new(logo_storage),
    );

    Router::new()
        .route("/", get(list).post(create))
        .route("/preview", post(preview))
        .route("/:subscription_id", get(get_one).put(update).delete(cancel))
        .route("/:subscription_id/renew", post(renew))
        .with_state(Arc::new(subscription_usecase))
}

pub async fn list<S, V, L>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, V, L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Query(filter): Query<ListSubscriptionsFilter>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    V: ServiceRepository + Send + Sync + 'static,
    L: LogoStorageClient + Send + Sync + 'static,
{
    match subscription_usecase.list(user_id, filter, today()).await {
        Ok(subscriptions) => ApiResponse::ok(subscriptions).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn create<S, V, L>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, V, L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(upsert_subscription_model): Json<UpsertSubscriptionModel>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    V: ServiceRepository + Send + Sync + 'static,
    L: LogoStorageClient + Send + Sync + 'static,
{
    match subscription_usecase
        .create(user_id, upsert_subscription_model, today())
        .await
    {
        Ok(subscription) => ApiResponse::created(subscription).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn preview<S, V, L>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, V, L>>>,
    _auth: AuthUser,
    Json(preview_draft_model): Json<PreviewDraftModel>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    V: ServiceRepository + Send + Sync + 'static,
    L: LogoStorageClient + Send + Sync + 'static,
{
    ApiResponse::ok(subscription_usecase.preview(preview_draft_model)).into_response()
}

pub async fn get_one<S, V, L>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, V, L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(subscription_id): Path<Uuid>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    V: ServiceRepository + Send + Sync + 'static,
    L: LogoStorageClient + Send + Sync + 'static,
{
    match subscription_usecase.get(user_id, subscription_id, today()).await {
        Ok(subscription) => ApiResponse::ok(subscription).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn update<S, V, L>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, V, L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(subscription_id): Path<Uuid>,
    Json(upsert_subscription_model): Json<UpsertSubscriptionModel>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    V: ServiceRepository + Send + Sync + 'static,
    L: LogoStorageClient + Send + Sync + 'static,
{
    match subscription_usecase
        .update(user_id, subscription_id, upsert_subscription_model, today())
        .await
    {
        Ok(subscription) => ApiResponse::ok(subscription).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn cancel<S, V, L>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, V, L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(subscription_id): Path<Uuid>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    V: ServiceRepository + Send + Sync + 'static,
    L: LogoStorageClient + Send + Sync + 'static,
{
    match subscription_usecase.cancel(user_id, subscription_id).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({ "id": subscription_id, "cancelled": true }))
            .into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn renew<S, V, L>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, V, L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(subscription_id): Path<Uuid>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    V: ServiceRepository + Send + Sync + 'static,
    L: LogoStorageClient + Send + Sync + 'static,
{
    match subscription_usecase.renew(user_id, subscription_id, today()).await {
        Ok(subscription) => ApiResponse::ok(subscription).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Extension,
        body::Body,
        http::{
            Request, StatusCode,
            header::{AUTHORIZATION, CONTENT_TYPE},
        },
    };
    use base64::{Engine as _, engine::general_purpose};
    use chrono::Utc;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::{
        domain::repositories::{
            services::MockServiceRepository, storage::MockLogoStorageClient,
            subscriptions::MockSubscriptionRepository,
        },
        domain::value_objects::logos::MAX_LOGO_BYTES,
        infrastructure::{
            axum_http::{
                auth::AuthSettings,
                http_serve::{request_body_limit, with_body_limit},
            },
            jwt_authentication::{Claims, generate_token},
        },
    };

    const SECRET: &str = "router-test-secret";

    fn app(subscription_repo: MockSubscriptionRepository) -> Router {
        let subscription_usecase = SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(MockServiceRepository::new()),
            Arc::new(MockLogoStorageClient::new()),
        );

        Router::new()
            .route("/preview", post(preview))
            .route("/:subscription_id", get(get_one))
            .with_state(Arc::new(subscription_usecase))
            .layer(Extension(Arc::new(AuthSettings {
                secret: SECRET.to_string(),
                cookie_name: "auth_token".to_string(),
                secure_cookie: false,
            })))
    }

    fn create_app(logo_storage: MockLogoStorageClient) -> Router {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_create().never();
        let subscription_usecase = SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(MockServiceRepository::new()),
            Arc::new(logo_storage),
        );

        let router = Router::new()
            .route("/", post(create))
            .with_state(Arc::new(subscription_usecase))
            .layer(Extension(Arc::new(AuthSettings {
                secret: SECRET.to_string(),
                cookie_name: "auth_token".to_string(),
                secure_cookie: false,
            })));
        with_body_limit(router, request_body_limit(4).unwrap())
    }

    fn create_with_png(logo_bytes: usize) -> Request<Body> {
        let mut png = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];
        png.resize(logo_bytes, 0);
        let payload = serde_json::json!({
            "service_name": "Climbing Gym",
            "logo": {
                "content_type": "image/png",
                "data": general_purpose::STANDARD.encode(&png),
            },
            "category_id": 1,
            "amount_minor": 1599,
            "currency": "USD",
            "billing_cycle": "monthly",
            "start_date": "2024-01-31",
        });

        Request::builder()
            .method("POST")
            .uri("/")
            .header(AUTHORIZATION, bearer(Uuid::new_v4()))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&payload).unwrap()))
            .unwrap()
    }

    fn bearer(user_id: Uuid) -> String {
        let claims = Claims::new(user_id, "ada@example.com", Utc::now(), 7);
        format!("Bearer {}", generate_token(SECRET, &claims).unwrap())
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn preview_applies_the_change_and_wraps_the_draft() {
        let request = Request::builder()
            .method("POST")
            .uri("/preview")
            .header(AUTHORIZATION, bearer(Uuid::new_v4()))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{
                    "billing_cycle": "monthly",
                    "start_date": "2024-01-31",
                    "change": {"field": "billing_cycle", "value": "quarterly"}
                }"#,
            ))
            .unwrap();

        let response = app(MockSubscriptionRepository::new())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["billing_cycle"], "quarterly");
        assert_eq!(body["data"]["next_billing_date"], "2024-05-01");
        assert_eq!(body["data"]["trial_end_date"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn unknown_subscription_renders_error_envelope() {
        let user_id = Uuid::new_v4();
        let subscription_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_id()
            .withf(move |uid, sid| *uid == user_id && *sid == subscription_id)
            .returning(|_, _| Ok(None));

        let request = Request::builder()
            .uri(format!("/{}", subscription_id))
            .header(AUTHORIZATION, bearer(user_id))
            .body(Body::empty())
            .unwrap();

        let response = app(subscription_repo).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["errors"]["code"], 404);
        assert_eq!(body["errors"]["message"], "Subscription not found");
    }

    #[tokio::test]
    async fn maximum_size_logo_reaches_logo_storage() {
        let mut logo_storage = MockLogoStorageClient::new();
        logo_storage
            .expect_upload_logo()
            .withf(|logo| logo.bytes.len() == MAX_LOGO_BYTES)
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("disk full")));

        let response = create_app(logo_storage)
            .oneshot(create_with_png(MAX_LOGO_BYTES))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["errors"]["code"], 500);
    }

    #[tokio::test]
    async fn oversized_logo_is_rejected_with_error_envelope() {
        let mut logo_storage = MockLogoStorageClient::new();
        logo_storage.expect_upload_logo().never();

        let response = create_app(logo_storage)
            .oneshot(create_with_png(MAX_LOGO_BYTES + 3))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["errors"]["message"], "File too large. Max 2MB.");
    }

    #[tokio::test]
    async fn requests_without_a_token_are_rejected() {
        let request = Request::builder()
            .uri(format!("/{}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();

        let response = app(MockSubscriptionRepository::new())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
