use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::email_verifications;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = email_verifications)]
pub struct EmailVerificationEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub failed_attempts: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = email_verifications)]
pub struct InsertEmailVerificationEntity {
    pub user_id: Uuid,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
}
