use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::users;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = users)]
pub struct UserEntity {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: Option<String>,
    pub google_sub: Option<String>,
    pub profile_picture: Option<String>,
    pub status: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct RegisterUserEntity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: Option<String>,
    pub google_sub: Option<String>,
    pub profile_picture: Option<String>,
    pub status: String,
    pub email_verified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub struct EditUserEntity {
    pub google_sub: Option<String>,
    pub profile_picture: Option<String>,
    pub status: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
