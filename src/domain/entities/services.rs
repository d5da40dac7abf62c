use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::services;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = services)]
pub struct ServiceEntity {
    pub id: i32,
    pub owner_id: Option<Uuid>,
    pub name: String,
    pub domain: Option<String>,
    pub image_url: Option<String>,
    pub is_predefined: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = services)]
pub struct InsertServiceEntity {
    pub owner_id: Option<Uuid>,
    pub name: String,
    pub domain: Option<String>,
    pub image_url: Option<String>,
    pub is_predefined: bool,
}
