use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{
        analytics::{
            DEFAULT_FORECAST_MONTHS, ForecastPointModel, ForecastQuery, MAX_FORECAST_MONTHS,
            SummaryModel, SummaryQuery, forecast, resolve_currency, summarize,
        },
        subscriptions::SubscriptionModel,
    },
};

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("months must be between 1 and {max}")]
    InvalidMonths { max: u32 },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AnalyticsError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AnalyticsError::InvalidMonths { .. } => StatusCode::BAD_REQUEST,
            AnalyticsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct AnalyticsUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
}

impl<S> AnalyticsUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>) -> Self {
        Self { subscription_repo }
    }

    pub async fn summary(
        &self,
        user_id: Uuid,
        query: SummaryQuery,
        today: NaiveDate,
    ) -> Result<SummaryModel, AnalyticsError> {
        let currency = resolve_currency(query.currency.as_deref());
        let subscriptions = self.load(user_id, today).await?;

        let summary = summarize(&subscriptions, &currency);
        info!(
            %user_id,
            %currency,
            monthly_spending_minor = summary.monthly_spending_minor,
            renewals_count = summary.renewals_count,
            "analytics: summary computed"
        );
        Ok(summary)
    }

    pub async fn forecast(
        &self,
        user_id: Uuid,
        query: ForecastQuery,
        today: NaiveDate,
    ) -> Result<Vec<ForecastPointModel>, AnalyticsError> {
        let months = query.months.unwrap_or(DEFAULT_FORECAST_MONTHS);
        if !(1..=MAX_FORECAST_MONTHS).contains(&months) {
            return Err(AnalyticsError::InvalidMonths {
                max: MAX_FORECAST_MONTHS,
            });
        }
        let currency = resolve_currency(query.currency.as_deref());
        let subscriptions = self.load(user_id, today).await?;

        info!(%user_id, %currency, months, "analytics: forecast computed");
        Ok(forecast(&subscriptions, &currency, today, months))
    }

    async fn load(&self, user_id: Uuid, today: NaiveDate) -> Result<Vec<SubscriptionModel>, AnalyticsError> {
        let records = self
            .subscription_repo
            .list_by_user(user_id, false)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "analytics: failed to load subscriptions");
                AnalyticsError::Internal(err)
            })?;

        Ok(records
            .into_iter()
            .map(|record| SubscriptionModel::from_record(record, today))
            .collect::<anyhow::Result<Vec<_>>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::{
            services::ServiceEntity,
            subscriptions::{SubscriptionEntity, SubscriptionRecord},
        },
        repositories::subscriptions::MockSubscriptionRepository,
    };
    use chrono::Utc;
    use mockall::predicate::eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(amount_minor: i64, currency: &str, cycle: &str, next: NaiveDate) -> SubscriptionRecord {
        let now = Utc::now();
        SubscriptionRecord {
            subscription: SubscriptionEntity {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                service_id: 1,
                category_id: 3,
                amount_minor,
                currency: currency.to_string(),
                billing_cycle: cycle.to_string(),
                start_date: date(2024, 1, 1),
                next_billing_date: next,
                is_trial: false,
                trial_start_date: None,
                trial_end_date: None,
                trial_billing_cycle: None,
                cancelled_at: None,
                created_at: now,
                updated_at: now,
            },
            service: ServiceEntity {
                id: 1,
                owner_id: None,
                name: "Notion".to_string(),
                domain: None,
                image_url: None,
                is_predefined: true,
                created_at: now,
            },
        }
    }

    fn repo(user_id: Uuid) -> MockSubscriptionRepository {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_list_by_user()
            .with(eq(user_id), eq(false))
            .returning(|_, _| {
                Ok(vec![
                    record(1000, "USD", "monthly", date(2024, 3, 10)),
                    record(3000, "USD", "quarterly", date(2024, 4, 1)),
                    record(500, "EUR", "weekly", date(2024, 3, 5)),
                ])
            });
        subscription_repo
    }

    #[tokio::test]
    async fn summary_defaults_to_usd() {
        let user_id = Uuid::new_v4();
        let usecase = AnalyticsUseCase::new(Arc::new(repo(user_id)));

        let summary = usecase
            .summary(user_id, SummaryQuery::default(), date(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(summary.currency, "USD");
        assert_eq!(summary.yearly_spending_minor, 1000 * 12 + 3000 * 4);
        assert_eq!(summary.monthly_spending_minor, 2000);
        assert_eq!(summary.active_count, 2);
        assert_eq!(summary.renewals_count, 2);
    }

    #[tokio::test]
    async fn summary_for_requested_currency() {
        let user_id = Uuid::new_v4();
        let usecase = AnalyticsUseCase::new(Arc::new(repo(user_id)));

        let summary = usecase
            .summary(
                user_id,
                SummaryQuery {
                    currency: Some("eur".to_string()),
                },
                date(2024, 3, 1),
            )
            .await
            .unwrap();

        assert_eq!(summary.yearly_spending_minor, 500 * 52);
        assert_eq!(summary.monthly_spending_minor, 2167);
    }

    #[tokio::test]
    async fn forecast_defaults_to_six_months() {
        let user_id = Uuid::new_v4();
        let usecase = AnalyticsUseCase::new(Arc::new(repo(user_id)));

        let points = usecase
            .forecast(user_id, ForecastQuery::default(), date(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(points.len(), 6);
        assert_eq!(points[0].month, "2024-03");
        assert_eq!(points[0].total_minor, 1000);
        assert_eq!(points[1].total_minor, 1000 + 3000);
        assert_eq!(points[5].month, "2024-08");
    }

    #[tokio::test]
    async fn forecast_rejects_out_of_range_months() {
        let usecase = AnalyticsUseCase::new(Arc::new(MockSubscriptionRepository::new()));

        let err = usecase
            .forecast(
                Uuid::new_v4(),
                ForecastQuery {
                    currency: None,
                    months: Some(25),
                },
                date(2024, 3, 1),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
