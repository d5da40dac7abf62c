use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};

use super::today;
use crate::{
    application::usecases::analytics::AnalyticsUseCase,
    domain::{
        repositories::subscriptions::SubscriptionRepository,
        value_objects::analytics::{ForecastQuery, SummaryQuery},
    },
    infrastructure::{
        axum_http::{api_response::ApiResponse, auth::AuthUser, error_responses::AppError},
        postgres::{
            postgres_connection::PgPoolSquad, repositories::subscriptions::SubscriptionPostgres,
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let analytics_usecase = AnalyticsUseCase::new(Arc::new(subscription_repository));

    Router::new()
        .route("/summary", get(summary))
        .route("/forecast", get(forecast))
        .with_state(Arc::new(analytics_usecase))
}

pub async fn summary<S>(
    State(analytics_usecase): State<Arc<AnalyticsUseCase<S>>>,
    AuthUser { user_id, .. }: AuthUser,
    Query(query): Query<SummaryQuery>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    match analytics_usecase.summary(user_id, query, today()).await {
        Ok(summary) => ApiResponse::ok(summary).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn forecast<S>(
    State(analytics_usecase): State<Arc<AnalyticsUseCase<S>>>,
    AuthUser { user_id, .. }: AuthUser,
    Query(query): Query<ForecastQuery>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    match analytics_usecase.forecast(user_id, query, today()).await {
        Ok(points) => ApiResponse::ok(points).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Extension,
        body::Body,
        http::{Request, StatusCode, header::AUTHORIZATION},
    };
    use chrono::Utc;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{
        domain::repositories::subscriptions::MockSubscriptionRepository,
        infrastructure::{
            axum_http::auth::AuthSettings,
            jwt_authentication::{Claims, generate_token},
        },
    };

    const SECRET: &str = "router-test-secret";

    fn app(subscription_repo: MockSubscriptionRepository) -> Router {
        Router::new()
            .route("/summary", get(summary))
            .route("/forecast", get(forecast))
            .with_state(Arc::new(AnalyticsUseCase::new(Arc::new(subscription_repo))))
            .layer(Extension(Arc::new(AuthSettings {
                secret: SECRET.to_string(),
                cookie_name: "auth_token".to_string(),
                secure_cookie: false,
            })))
    }

    fn get_request(uri: &str) -> Request<Body> {
        let claims = Claims::new(Uuid::new_v4(), "ada@example.com", Utc::now(), 7);
        Request::builder()
            .uri(uri)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", generate_token(SECRET, &claims).unwrap()),
            )
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn empty_summary_uses_default_currency() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_list_by_user()
            .returning(|_, _| Ok(vec![]));

        let response = app(subscription_repo)
            .oneshot(get_request("/summary"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["currency"], "USD");
        assert_eq!(body["data"]["activeCount"], 0);
    }

    #[tokio::test]
    async fn forecast_horizon_out_of_range_is_bad_request() {
        let response = app(MockSubscriptionRepository::new())
            .oneshot(get_request("/forecast?months=25"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
