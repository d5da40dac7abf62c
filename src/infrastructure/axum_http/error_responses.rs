use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::application::usecases::{
    analytics::AnalyticsError, authentication::AuthenticationError,
    services::ServiceCatalogError, subscriptions::SubscriptionError, users::UserError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    errors: ErrorResponse,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    UseCase { status: StatusCode, message: String },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn from_status(status: StatusCode, message: String) -> Self {
        if status.is_server_error() {
            AppError::Internal(anyhow::anyhow!(message))
        } else {
            AppError::UseCase { status, message }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UseCase { status, .. } => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            // Internal detail stays in the logs.
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = Json(ErrorBody {
            errors: ErrorResponse {
                code: status.as_u16(),
                message,
            },
        });

        (status, body).into_response()
    }
}

impl From<AuthenticationError> for AppError {
    fn from(err: AuthenticationError) -> Self {
        AppError::from_status(err.status_code(), err.to_string())
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        AppError::from_status(err.status_code(), err.to_string())
    }
}

impl From<ServiceCatalogError> for AppError {
    fn from(err: ServiceCatalogError) -> Self {
        AppError::from_status(err.status_code(), err.to_string())
    }
}

impl From<SubscriptionError> for AppError {
    fn from(err: SubscriptionError) -> Self {
        AppError::from_status(err.status_code(), err.to_string())
    }
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        AppError::from_status(err.status_code(), err.to_string())
    }
}
