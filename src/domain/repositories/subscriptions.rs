use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::subscriptions::{
    EditSubscriptionEntity, InsertSubscriptionEntity, SubscriptionRecord,
};

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    async fn create(&self, insert_subscription_entity: InsertSubscriptionEntity) -> Result<Uuid>;
    async fn find_by_id(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
    ) -> Result<Option<SubscriptionRecord>>;
    async fn list_by_user(
        &self,
        user_id: Uuid,
        include_cancelled: bool,
    ) -> Result<Vec<SubscriptionRecord>>;
    async fn update(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
        edit_subscription_entity: EditSubscriptionEntity,
    ) -> Result<()>;
    async fn cancel(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
        cancelled_at: DateTime<Utc>,
    ) -> Result<()>;
    /// Moves the next charge forward and ends any running trial.
    async fn renew(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
        next_billing_date: NaiveDate,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;
}
