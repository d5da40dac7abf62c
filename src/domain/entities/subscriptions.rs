use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::subscriptions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: i32,
    pub category_id: i32,
    pub amount_minor: i64,
    pub currency: String,
    pub billing_cycle: String,
    pub start_date: NaiveDate,
    pub next_billing_date: NaiveDate,
    pub is_trial: bool,
    pub trial_start_date: Option<NaiveDate>,
    pub trial_end_date: Option<NaiveDate>,
    pub trial_billing_cycle: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = subscriptions)]
pub struct InsertSubscriptionEntity {
    pub user_id: Uuid,
    pub service_id: i32,
    pub category_id: i32,
    pub amount_minor: i64,
    pub currency: String,
    pub billing_cycle: String,
    pub start_date: NaiveDate,
    pub next_billing_date: NaiveDate,
    pub is_trial: bool,
    pub trial_start_date: Option<NaiveDate>,
    pub trial_end_date: Option<NaiveDate>,
    pub trial_billing_cycle: Option<String>,
}

/// Full replacement of the editable columns. `None` trial fields are written as NULL.
#[derive(Debug, Clone, AsChangeset, PartialEq)]
#[diesel(table_name = subscriptions, treat_none_as_null = true)]
pub struct EditSubscriptionEntity {
    pub service_id: i32,
    pub category_id: i32,
    pub amount_minor: i64,
    pub currency: String,
    pub billing_cycle: String,
    pub start_date: NaiveDate,
    pub next_billing_date: NaiveDate,
    pub is_trial: bool,
    pub trial_start_date: Option<NaiveDate>,
    pub trial_end_date: Option<NaiveDate>,
    pub trial_billing_cycle: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// A subscription row joined with the service it pays for.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRecord {
    pub subscription: SubscriptionEntity,
    pub service: super::services::ServiceEntity,
}
