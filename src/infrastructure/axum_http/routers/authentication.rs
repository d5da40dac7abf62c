use std::sync::Arc;

use anyhow::Result;
use axum::{
    Extension, Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{
    application::usecases::authentication::{
        AuthenticationUseCase, GoogleIdentityGateway, VerificationMailer,
    },
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::users::UserRepository,
        value_objects::iam::{
            GoogleLoginModel, LinkGoogleModel, LoginModel, RegisterUserModel, TokenModel,
            VerifyEmailModel,
        },
    },
    infrastructure::{
        axum_http::{
            api_response::ApiResponse, auth::AuthSettings, error_responses::AppError,
        },
        google_identity::GoogleTokenInfoClient,
        postgres::{postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
        verification_mailer::WebhookVerificationMailer,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Result<Router> {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let google_gateway = GoogleTokenInfoClient::new(config.google.client_id.clone())?;
    let mailer = WebhookVerificationMailer::new(
        config.verification.mailer_webhook_url.clone(),
        config.verification.code_ttl_minutes,
    )?;
    let authentication_usecase = AuthenticationUseCase::new(
        Arc::new(user_repository),
        Arc::new(google_gateway),
        Arc::new(mailer),
        config.user_secret.clone(),
        config.verification.code_ttl_minutes,
    );

    Ok(Router::new()
        .route("/", post(register))
        .route("/verify-email", post(verify_email))
        .route("/login", post(login))
        .route("/google-login", post(google_login))
        .route("/link-google", post(link_google))
        .with_state(Arc::new(authentication_usecase)))
}

fn session_response<U, G, M>(
    authentication_usecase: &AuthenticationUseCase<U, G, M>,
    settings: &AuthSettings,
    jar: CookieJar,
    token_model: TokenModel,
) -> Response
where
    U: UserRepository + Send + Sync + 'static,
    G: GoogleIdentityGateway + 'static,
    M: VerificationMailer + 'static,
{
    let cookie = Cookie::build((
        authentication_usecase.cookie_name().to_string(),
        token_model.token.clone(),
    ))
    .path("/")
    .http_only(true)
    .secure(settings.secure_cookie)
    .same_site(SameSite::Lax)
    .max_age(cookie::time::Duration::days(
        authentication_usecase.token_ttl_days(),
    ));

    (jar.add(cookie), ApiResponse::ok(token_model)).into_response()
}

pub async fn register<U, G, M>(
    State(authentication_usecase): State<Arc<AuthenticationUseCase<U, G, M>>>,
    Json(register_user_model): Json<RegisterUserModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    G: GoogleIdentityGateway + 'static,
    M: VerificationMailer + 'static,
{
    match authentication_usecase.register(register_user_model).await {
        Ok(registered) => ApiResponse::created(registered).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn verify_email<U, G, M>(
    State(authentication_usecase): State<Arc<AuthenticationUseCase<U, G, M>>>,
    Json(verify_email_model): Json<VerifyEmailModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    G: GoogleIdentityGateway + 'static,
    M: VerificationMailer + 'static,
{
    match authentication_usecase.verify_email(verify_email_model).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({ "verified": true })).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn login<U, G, M>(
    State(authentication_usecase): State<Arc<AuthenticationUseCase<U, G, M>>>,
    Extension(settings): Extension<Arc<AuthSettings>>,
    jar: CookieJar,
    Json(login_model): Json<LoginModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    G: GoogleIdentityGateway + 'static,
    M: VerificationMailer + 'static,
{
    match authentication_usecase.login(login_model).await {
        Ok(token_model) => session_response(&authentication_usecase, &settings, jar, token_model),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn google_login<U, G, M>(
    State(authentication_usecase): State<Arc<AuthenticationUseCase<U, G, M>>>,
    Extension(settings): Extension<Arc<AuthSettings>>,
    jar: CookieJar,
    Json(google_login_model): Json<GoogleLoginModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    G: GoogleIdentityGateway + 'static,
    M: VerificationMailer + 'static,
{
    match authentication_usecase.google_login(google_login_model).await {
        Ok(token_model) => session_response(&authentication_usecase, &settings, jar, token_model),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn link_google<U, G, M>(
    State(authentication_usecase): State<Arc<AuthenticationUseCase<U, G, M>>>,
    Extension(settings): Extension<Arc<AuthSettings>>,
    jar: CookieJar,
    Json(link_google_model): Json<LinkGoogleModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    G: GoogleIdentityGateway + 'static,
    M: VerificationMailer + 'static,
{
    match authentication_usecase.link_google(link_google_model).await {
        Ok(token_model) => session_response(&authentication_usecase, &settings, jar, token_model),
        Err(err) => AppError::from(err).into_response(),
    }
}
