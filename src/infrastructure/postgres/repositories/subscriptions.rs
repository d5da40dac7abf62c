use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::{insert_into, prelude::*, update};
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            services::ServiceEntity,
            subscriptions::{
                EditSubscriptionEntity, InsertSubscriptionEntity, SubscriptionEntity,
                SubscriptionRecord,
            },
        },
        repositories::subscriptions::SubscriptionRepository,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{services, subscriptions},
    },
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn into_record((subscription, service): (SubscriptionEntity, ServiceEntity)) -> SubscriptionRecord {
    SubscriptionRecord {
        subscription,
        service,
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn create(&self, insert_subscription_entity: InsertSubscriptionEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let subscription_id = insert_into(subscriptions::table)
            .values(&insert_subscription_entity)
            .returning(subscriptions::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(subscription_id)
    }

    async fn find_by_id(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
    ) -> Result<Option<SubscriptionRecord>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = subscriptions::table
            .inner_join(services::table)
            .filter(subscriptions::id.eq(subscription_id))
            .filter(subscriptions::user_id.eq(user_id))
            .select((SubscriptionEntity::as_select(), ServiceEntity::as_select()))
            .first::<(SubscriptionEntity, ServiceEntity)>(&mut conn)
            .optional()?;

        Ok(result.map(into_record))
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        include_cancelled: bool,
    ) -> Result<Vec<SubscriptionRecord>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = subscriptions::table
            .inner_join(services::table)
            .filter(subscriptions::user_id.eq(user_id))
            .select((SubscriptionEntity::as_select(), ServiceEntity::as_select()))
            .into_boxed();

        if !include_cancelled {
            query = query.filter(subscriptions::cancelled_at.is_null());
        }

        let results = query
            .order(subscriptions::next_billing_date.asc())
            .load::<(SubscriptionEntity, ServiceEntity)>(&mut conn)?;

        Ok(results.into_iter().map(into_record).collect())
    }

    async fn update(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
        edit_subscription_entity: EditSubscriptionEntity,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(subscriptions::table)
            .filter(subscriptions::id.eq(subscription_id))
            .filter(subscriptions::user_id.eq(user_id))
            .set(&edit_subscription_entity)
            .execute(&mut conn)?;

        Ok(())
    }

    async fn cancel(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
        cancelled_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(subscriptions::table)
            .filter(subscriptions::id.eq(subscription_id))
            .filter(subscriptions::user_id.eq(user_id))
            .filter(subscriptions::cancelled_at.is_null())
            .set((
                subscriptions::cancelled_at.eq(Some(cancelled_at)),
                subscriptions::updated_at.eq(cancelled_at),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn renew(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
        next_billing_date: NaiveDate,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(subscriptions::table)
            .filter(subscriptions::id.eq(subscription_id))
            .filter(subscriptions::user_id.eq(user_id))
            .set((
                subscriptions::next_billing_date.eq(next_billing_date),
                subscriptions::is_trial.eq(false),
                subscriptions::updated_at.eq(updated_at),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
