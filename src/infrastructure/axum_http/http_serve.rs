use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    config::{config_model::DotEnvyConfig, stage::Stage},
    domain::value_objects::logos::MAX_LOGO_BYTES,
    infrastructure::{
        axum_http::{auth::AuthSettings, default_routers, routers},
        postgres::postgres_connection::PgPoolSquad,
    },
};

/// Static mount for uploaded logos. `LOGO_PUBLIC_BASE_URL` may point here or at a CDN.
pub const LOGO_ROUTE: &str = "/media/logos";

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let auth_settings = Arc::new(AuthSettings {
        secret: config.user_secret.secret.clone(),
        cookie_name: config.user_secret.cookie_name.clone(),
        secure_cookie: config.stage == Stage::Production,
    });

    let api = Router::new()
        .nest(
            "/auth",
            routers::authentication::routes(Arc::clone(&db_pool), Arc::clone(&config))?,
        )
        .nest("/user", routers::users::routes(Arc::clone(&db_pool)))
        .nest("/service", routers::services::routes(Arc::clone(&db_pool)))
        .nest("/category", routers::services::category_routes(Arc::clone(&db_pool)))
        .nest(
            "/subscription",
            routers::subscriptions::routes(Arc::clone(&db_pool), Arc::clone(&config)),
        )
        .nest("/analytics", routers::analytics::routes(Arc::clone(&db_pool)))
        .route("/health-check", get(default_routers::health_check));

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest("/api", api)
        .nest_service(LOGO_ROUTE, ServeDir::new(&config.logo_storage.directory))
        .layer(Extension(auth_settings))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)));
    let app = with_body_limit(app, request_body_limit(config.server.body_limit)?)
        .layer(cors_layer(config.server.allowed_origin.as_deref())?)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!(stage = %config.stage, "Server is running on port {}", config.server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Smallest accepted body: a maximum-size logo in base64 plus room for the other JSON fields.
pub const MIN_REQUEST_BODY_BYTES: usize = MAX_LOGO_BYTES.div_ceil(3) * 4 + 64 * 1024;

/// Converts `SERVER_BODY_LIMIT` (MiB) to bytes, raised to [`MIN_REQUEST_BODY_BYTES`] when smaller.
pub fn request_body_limit(body_limit_mib: u64) -> Result<usize> {
    let configured: usize = body_limit_mib
        .checked_mul(1024 * 1024)
        .context("SERVER_BODY_LIMIT is too large")?
        .try_into()?;
    if configured < MIN_REQUEST_BODY_BYTES {
        warn!(
            configured_bytes = configured,
            min_bytes = MIN_REQUEST_BODY_BYTES,
            "SERVER_BODY_LIMIT is below the size of a maximum logo upload; using the minimum"
        );
        return Ok(MIN_REQUEST_BODY_BYTES);
    }
    Ok(configured)
}

/// Applies one byte limit to every body. `DefaultBodyLimit` replaces the 2 MB cap built into
/// axum's `Json` extractor, `RequestBodyLimitLayer` bounds the raw stream.
pub fn with_body_limit(router: Router, limit: usize) -> Router {
    router
        .layer(DefaultBodyLimit::max(limit))
        .layer(RequestBodyLimitLayer::new(limit))
}

fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Credentialed requests (the auth cookie) need an explicit origin.
    match allowed_origin {
        Some(origin) => {
            let origin = HeaderValue::from_str(origin)
                .with_context(|| format!("SERVER_ALLOWED_ORIGIN is not a valid header value: {origin}"))?;
            Ok(cors.allow_origin(origin).allow_credentials(true))
        }
        None => Ok(cors.allow_origin(Any)),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
