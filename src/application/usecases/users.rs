use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{repositories::users::UserRepository, value_objects::iam::UserModel};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UserError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct UserUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
}

impl<U> UserUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn me(&self, user_id: Uuid) -> Result<UserModel, UserError> {
        info!(%user_id, "users: loading current user");
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "users: failed to load current user");
                UserError::Internal(err)
            })?
            .ok_or(UserError::NotFound)?;

        Ok(UserModel::from(user))
    }
}
