use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::{services::InsertServiceEntity, subscriptions::SubscriptionRecord},
    repositories::{
        services::ServiceRepository, storage::LogoStorageClient,
        subscriptions::SubscriptionRepository,
    },
    value_objects::{
        billing_period::add_period_to_date,
        enums::billing_cycles::BillingCycle,
        subscription_draft::SubscriptionDraft,
        subscriptions::{
            ListSubscriptionsFilter, PreviewDraftModel, ServiceSelection, SubscriptionModel,
            UpsertSubscriptionModel, apply_list_filter,
        },
    },
};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("{0}")]
    Validation(String),
    #[error("Unknown service id {0}")]
    UnknownService(i32),
    #[error("Subscription not found")]
    NotFound,
    #[error("Subscription is cancelled")]
    Cancelled,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::Validation(_) | SubscriptionError::UnknownService(_) => {
                StatusCode::BAD_REQUEST
            }
            SubscriptionError::NotFound => StatusCode::NOT_FOUND,
            SubscriptionError::Cancelled => StatusCode::CONFLICT,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

/// Service a write points at. `created_logo_url` is set when the write created a custom service.
struct ResolvedService {
    service_id: i32,
    created_logo_url: Option<String>,
}

pub struct SubscriptionUseCase<S, V, L>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    V: ServiceRepository + Send + Sync + 'static,
    L: LogoStorageClient + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    service_repo: Arc<V>,
    logo_storage: Arc<L>,
}

impl<S, V, L> SubscriptionUseCase<S, V, L>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    V: ServiceRepository + Send + Sync + 'static,
    L: LogoStorageClient + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>, service_repo: Arc<V>, logo_storage: Arc<L>) -> Self {
        Self {
            subscription_repo,
            service_repo,
            logo_storage,
        }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        upsert_subscription_model: UpsertSubscriptionModel,
        today: NaiveDate,
    ) -> UseCaseResult<SubscriptionModel> {
        let validated = upsert_subscription_model
            .validate()
            .map_err(|err| SubscriptionError::Validation(err.to_string()))?;
        let resolved = self.resolve_service(user_id, &validated.service).await?;

        let subscription_id = match self
            .subscription_repo
            .create(validated.to_insert_entity(user_id, resolved.service_id))
            .await
        {
            Ok(subscription_id) => subscription_id,
            Err(err) => {
                error!(%user_id, db_error = ?err, "subscriptions: failed to create subscription");
                self.discard_custom_service(user_id, &resolved).await;
                return Err(SubscriptionError::Internal(err));
            }
        };
        info!(
            %user_id,
            %subscription_id,
            next_billing_date = %validated.next_billing_date,
            "subscriptions: subscription created"
        );

        self.get(user_id, subscription_id, today).await
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
        upsert_subscription_model: UpsertSubscriptionModel,
        today: NaiveDate,
    ) -> UseCaseResult<SubscriptionModel> {
        let existing = self.find(user_id, subscription_id).await?;
        if existing.subscription.cancelled_at.is_some() {
            return Err(SubscriptionError::Cancelled);
        }

        let validated = upsert_subscription_model
            .validate()
            .map_err(|err| SubscriptionError::Validation(err.to_string()))?;
        let resolved = self.resolve_service(user_id, &validated.service).await?;

        if let Err(err) = self
            .subscription_repo
            .update(
                user_id,
                subscription_id,
                validated.to_edit_entity(resolved.service_id, Utc::now()),
            )
            .await
        {
            error!(%user_id, %subscription_id, db_error = ?err, "subscriptions: failed to update subscription");
            self.discard_custom_service(user_id, &resolved).await;
            return Err(SubscriptionError::Internal(err));
        }
        info!(%user_id, %subscription_id, "subscriptions: subscription updated");

        self.get(user_id, subscription_id, today).await
    }

    pub async fn get(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
        today: NaiveDate,
    ) -> UseCaseResult<SubscriptionModel> {
        let record = self.find(user_id, subscription_id).await?;
        Ok(SubscriptionModel::from_record(record, today)?)
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        filter: ListSubscriptionsFilter,
        today: NaiveDate,
    ) -> UseCaseResult<Vec<SubscriptionModel>> {
        let records = self
            .subscription_repo
            .list_by_user(user_id, filter.wants_cancelled())
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: failed to list subscriptions");
                SubscriptionError::Internal(err)
            })?;

        let subscriptions = records
            .into_iter()
            .map(|record| SubscriptionModel::from_record(record, today))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let subscriptions = apply_list_filter(subscriptions, &filter);
        info!(%user_id, subscription_count = subscriptions.len(), "subscriptions: list loaded");
        Ok(subscriptions)
    }

    pub async fn cancel(&self, user_id: Uuid, subscription_id: Uuid) -> UseCaseResult<()> {
        let existing = self.find(user_id, subscription_id).await?;
        if existing.subscription.cancelled_at.is_some() {
            info!(%user_id, %subscription_id, "subscriptions: already cancelled");
            return Ok(());
        }

        self.subscription_repo
            .cancel(user_id, subscription_id, Utc::now())
            .await
            .map_err(|err| {
                error!(%user_id, %subscription_id, db_error = ?err, "subscriptions: failed to cancel subscription");
                SubscriptionError::Internal(err)
            })?;
        info!(%user_id, %subscription_id, "subscriptions: subscription cancelled");
        Ok(())
    }

    /// Records a paid period: the next charge moves one billing cycle forward.
    pub async fn renew(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
        today: NaiveDate,
    ) -> UseCaseResult<SubscriptionModel> {
        let existing = self.find(user_id, subscription_id).await?;
        let subscription = existing.subscription;
        if subscription.cancelled_at.is_some() {
            return Err(SubscriptionError::Cancelled);
        }

        let cycle = BillingCycle::from_str(&subscription.billing_cycle).ok_or_else(|| {
            anyhow::anyhow!("Unknown billing cycle {:?}", subscription.billing_cycle)
        })?;
        let next_billing_date = add_period_to_date(subscription.next_billing_date, cycle, 1)
            .ok_or_else(|| SubscriptionError::Validation("Billing date is out of range".to_string()))?;

        self.subscription_repo
            .renew(user_id, subscription_id, next_billing_date, Utc::now())
            .await
            .map_err(|err| {
                error!(%user_id, %subscription_id, db_error = ?err, "subscriptions: failed to renew subscription");
                SubscriptionError::Internal(err)
            })?;
        info!(%user_id, %subscription_id, %next_billing_date, "subscriptions: subscription renewed");

        self.get(user_id, subscription_id, today).await
    }

    pub fn preview(&self, preview_draft_model: PreviewDraftModel) -> SubscriptionDraft {
        preview_draft_model.resolve()
    }

    async fn find(&self, user_id: Uuid, subscription_id: Uuid) -> UseCaseResult<SubscriptionRecord> {
        self.subscription_repo
            .find_by_id(user_id, subscription_id)
            .await
            .map_err(|err| {
                error!(%user_id, %subscription_id, db_error = ?err, "subscriptions: failed to load subscription");
                SubscriptionError::Internal(err)
            })?
            .ok_or(SubscriptionError::NotFound)
    }

    async fn resolve_service(
        &self,
        user_id: Uuid,
        selection: &ServiceSelection,
    ) -> UseCaseResult<ResolvedService> {
        match selection {
            ServiceSelection::Catalog(service_id) => {
                let service = self
                    .service_repo
                    .find_visible(*service_id, user_id)
                    .await
                    .map_err(|err| {
                        error!(%user_id, service_id, db_error = ?err, "subscriptions: failed to load service");
                        SubscriptionError::Internal(err)
                    })?;
                match service {
                    Some(service) => Ok(ResolvedService {
                        service_id: service.id,
                        created_logo_url: None,
                    }),
                    None => {
                        warn!(%user_id, service_id, "subscriptions: service not visible to user");
                        Err(SubscriptionError::UnknownService(*service_id))
                    }
                }
            }
            ServiceSelection::Custom { name, logo } => {
                let image_url = self
                    .logo_storage
                    .upload_logo(logo.clone())
                    .await
                    .map_err(|err| {
                        error!(%user_id, error = ?err, "subscriptions: failed to store logo");
                        SubscriptionError::Internal(err)
                    })?;

                let service = match self
                    .service_repo
                    .create_custom(InsertServiceEntity {
                        owner_id: Some(user_id),
                        name: name.clone(),
                        domain: None,
                        image_url: Some(image_url.clone()),
                        is_predefined: false,
                    })
                    .await
                {
                    Ok(service) => service,
                    Err(err) => {
                        error!(%user_id, db_error = ?err, "subscriptions: failed to create custom service");
                        self.discard_logo(user_id, &image_url).await;
                        return Err(SubscriptionError::Internal(err));
                    }
                };
                info!(%user_id, service_id = service.id, "subscriptions: custom service created");
                Ok(ResolvedService {
                    service_id: service.id,
                    created_logo_url: Some(image_url),
                })
            }
        }
    }

    /// Removes the custom service and logo created for a write that did not land.
    async fn discard_custom_service(&self, user_id: Uuid, resolved: &ResolvedService) {
        let Some(logo_url) = resolved.created_logo_url.as_deref() else {
            return;
        };
        if let Err(err) = self
            .service_repo
            .delete_custom(resolved.service_id, user_id)
            .await
        {
            warn!(%user_id, service_id = resolved.service_id, db_error = ?err, "subscriptions: failed to discard custom service");
        }
        self.discard_logo(user_id, logo_url).await;
    }

    async fn discard_logo(&self, user_id: Uuid, logo_url: &str) {
        match self.logo_storage.delete_logo(logo_url.to_string()).await {
            Ok(()) => info!(%user_id, %logo_url, "subscriptions: orphaned logo removed"),
            Err(err) => warn!(%user_id, %logo_url, error = ?err, "subscriptions: failed to remove orphaned logo"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::{
            services::ServiceEntity,
            subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
        },
        repositories::{
            services::MockServiceRepository, storage::MockLogoStorageClient,
            subscriptions::MockSubscriptionRepository,
        },
        value_objects::{
            enums::subscription_statuses::SubscriptionStatus, logos::LogoUploadModel,
            subscription_draft::DraftChange,
        },
    };
    use base64::{Engine as _, engine::general_purpose};
    use mockall::predicate::eq;

    type TestUseCase =
        SubscriptionUseCase<MockSubscriptionRepository, MockServiceRepository, MockLogoStorageClient>;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn usecase(
        subscription_repo: MockSubscriptionRepository,
        service_repo: MockServiceRepository,
        logo_storage: MockLogoStorageClient,
    ) -> TestUseCase {
        SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(service_repo),
            Arc::new(logo_storage),
        )
    }

    fn service(id: i32, owner_id: Option<Uuid>) -> ServiceEntity {
        ServiceEntity {
            id,
            owner_id,
            name: "Netflix".to_string(),
            domain: Some("netflix.com".to_string()),
            image_url: None,
            is_predefined: owner_id.is_none(),
            created_at: Utc::now(),
        }
    }

    fn record_from(id: Uuid, insert: &InsertSubscriptionEntity) -> SubscriptionRecord {
        let now = Utc::now();
        SubscriptionRecord {
            subscription: SubscriptionEntity {
                id,
                user_id: insert.user_id,
                service_id: insert.service_id,
                category_id: insert.category_id,
                amount_minor: insert.amount_minor,
                currency: insert.currency.clone(),
                billing_cycle: insert.billing_cycle.clone(),
                start_date: insert.start_date,
                next_billing_date: insert.next_billing_date,
                is_trial: insert.is_trial,
                trial_start_date: insert.trial_start_date,
                trial_end_date: insert.trial_end_date,
                trial_billing_cycle: insert.trial_billing_cycle.clone(),
                cancelled_at: None,
                created_at: now,
                updated_at: now,
            },
            service: service(insert.service_id, None),
        }
    }

    fn stored(user_id: Uuid, id: Uuid, next: NaiveDate, cancelled: bool) -> SubscriptionRecord {
        let mut record = record_from(
            id,
            &InsertSubscriptionEntity {
                user_id,
                service_id: 1,
                category_id: 1,
                amount_minor: 1599,
                currency: "USD".to_string(),
                billing_cycle: "monthly".to_string(),
                start_date: date(2024, 1, 31),
                next_billing_date: next,
                is_trial: false,
                trial_start_date: None,
                trial_end_date: None,
                trial_billing_cycle: None,
            },
        );
        if cancelled {
            record.subscription.cancelled_at = Some(Utc::now());
        }
        record
    }

    fn upsert(service_id: Option<i32>) -> UpsertSubscriptionModel {
        UpsertSubscriptionModel {
            service_id,
            service_name: None,
            logo: None,
            category_id: 1,
            amount_minor: 1599,
            currency: "usd".to_string(),
            billing_cycle: BillingCycle::Monthly,
            start_date: date(2024, 1, 31),
            next_billing_date: Some(date(2030, 1, 1)),
            is_trial: false,
            trial_start_date: None,
            trial_billing_cycle: None,
            trial_end_date: None,
        }
    }

    #[tokio::test]
    async fn create_recomputes_dates_and_returns_derived_status() {
        let user_id = Uuid::new_v4();
        let subscription_id = Uuid::new_v4();

        let mut service_repo = MockServiceRepository::new();
        service_repo
            .expect_find_visible()
            .with(eq(1), eq(user_id))
            .returning(|id, _| Ok(Some(service(id, None))));

        let mut subscription_repo = MockSubscriptionRepository::new();
        let inserted = Arc::new(std::sync::Mutex::new(None));
        let captured = Arc::clone(&inserted);
        subscription_repo
            .expect_create()
            .withf(move |entity| {
                entity.user_id == user_id
                    && entity.next_billing_date == date(2024, 3, 2)
                    && entity.currency == "USD"
                    && entity.billing_cycle == "monthly"
            })
            .times(1)
            .returning(move |entity| {
                *captured.lock().unwrap() = Some(entity);
                Ok(subscription_id)
            });
        subscription_repo
            .expect_find_by_id()
            .with(eq(user_id), eq(subscription_id))
            .returning(move |_, id| {
                let entity = inserted.lock().unwrap().clone().unwrap();
                Ok(Some(record_from(id, &entity)))
            });

        let usecase = usecase(subscription_repo, service_repo, MockLogoStorageClient::new());
        let created = usecase
            .create(user_id, upsert(Some(1)), date(2024, 2, 28))
            .await
            .unwrap();

        assert_eq!(created.id, subscription_id);
        assert_eq!(created.next_billing_date, date(2024, 3, 2));
        assert_eq!(created.days_left, 3);
        assert_eq!(created.status, SubscriptionStatus::ToExpire);
    }

    #[tokio::test]
    async fn create_rejects_service_not_visible_to_user() {
        let mut service_repo = MockServiceRepository::new();
        service_repo.expect_find_visible().returning(|_, _| Ok(None));
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_create().never();

        let usecase = usecase(subscription_repo, service_repo, MockLogoStorageClient::new());
        let err = usecase
            .create(Uuid::new_v4(), upsert(Some(99)), date(2024, 2, 28))
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::UnknownService(99)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_with_custom_service_stores_logo_first() {
        let user_id = Uuid::new_v4();
        let subscription_id = Uuid::new_v4();
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00];

        let mut logo_storage = MockLogoStorageClient::new();
        logo_storage
            .expect_upload_logo()
            .withf(move |logo| logo.bytes == jpeg.to_vec())
            .times(1)
            .returning(|_| Ok("/media/logos/abc.jpg".to_string()));

        let mut service_repo = MockServiceRepository::new();
        service_repo
            .expect_create_custom()
            .withf(move |entity| {
                entity.owner_id == Some(user_id)
                    && entity.name == "Climbing Gym"
                    && entity.image_url.as_deref() == Some("/media/logos/abc.jpg")
                    && !entity.is_predefined
            })
            .times(1)
            .returning(|entity| {
                Ok(ServiceEntity {
                    id: 42,
                    owner_id: entity.owner_id,
                    name: entity.name,
                    domain: None,
                    image_url: entity.image_url,
                    is_predefined: false,
                    created_at: Utc::now(),
                })
            });

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_create()
            .withf(|entity| entity.service_id == 42)
            .times(1)
            .returning(move |_| Ok(subscription_id));
        subscription_repo
            .expect_find_by_id()
            .returning(move |user_id, id| Ok(Some(stored(user_id, id, date(2024, 3, 2), false))));

        let model = UpsertSubscriptionModel {
            service_id: None,
            service_name: Some("Climbing Gym".to_string()),
            logo: Some(LogoUploadModel {
                content_type: "image/jpeg".to_string(),
                data: general_purpose::STANDARD.encode(jpeg),
            }),
            ..upsert(None)
        };

        let usecase = usecase(subscription_repo, service_repo, logo_storage);
        let created = usecase.create(user_id, model, date(2024, 2, 1)).await.unwrap();
        assert_eq!(created.id, subscription_id);
    }

    fn custom_model() -> UpsertSubscriptionModel {
        UpsertSubscriptionModel {
            service_id: None,
            service_name: Some("Climbing Gym".to_string()),
            logo: Some(LogoUploadModel {
                content_type: "image/jpeg".to_string(),
                data: general_purpose::STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0, 0x00]),
            }),
            ..upsert(None)
        }
    }

    fn custom_service_repo(user_id: Uuid) -> MockServiceRepository {
        let mut service_repo = MockServiceRepository::new();
        service_repo.expect_create_custom().returning(|entity| {
            Ok(ServiceEntity {
                id: 42,
                owner_id: entity.owner_id,
                name: entity.name,
                domain: None,
                image_url: entity.image_url,
                is_predefined: false,
                created_at: Utc::now(),
            })
        });
        service_repo
            .expect_delete_custom()
            .with(eq(42), eq(user_id))
            .times(1)
            .returning(|_, _| Ok(()));
        service_repo
    }

    fn uploading_storage() -> MockLogoStorageClient {
        let mut logo_storage = MockLogoStorageClient::new();
        logo_storage
            .expect_upload_logo()
            .returning(|_| Ok("/media/logos/abc.jpg".to_string()));
        logo_storage
            .expect_delete_logo()
            .with(eq("/media/logos/abc.jpg".to_string()))
            .times(1)
            .returning(|_| Ok(()));
        logo_storage
    }

    #[tokio::test]
    async fn failed_create_discards_custom_service_and_logo() {
        let user_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_create()
            .returning(|_| Err(anyhow::anyhow!("insert failed")));

        let usecase = usecase(subscription_repo, custom_service_repo(user_id), uploading_storage());
        let err = usecase
            .create(user_id, custom_model(), date(2024, 2, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::Internal(_)));
    }

    #[tokio::test]
    async fn failed_update_discards_custom_service_and_logo() {
        let user_id = Uuid::new_v4();
        let subscription_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_id()
            .returning(move |user_id, id| Ok(Some(stored(user_id, id, date(2024, 3, 2), false))));
        subscription_repo
            .expect_update()
            .returning(|_, _, _| Err(anyhow::anyhow!("update failed")));

        let usecase = usecase(subscription_repo, custom_service_repo(user_id), uploading_storage());
        let err = usecase
            .update(user_id, subscription_id, custom_model(), date(2024, 2, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::Internal(_)));
    }

    #[tokio::test]
    async fn failed_custom_service_insert_removes_uploaded_logo() {
        let mut service_repo = MockServiceRepository::new();
        service_repo
            .expect_create_custom()
            .returning(|_| Err(anyhow::anyhow!("insert failed")));
        service_repo.expect_delete_custom().never();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_create().never();

        let usecase = usecase(subscription_repo, service_repo, uploading_storage());
        let err = usecase
            .create(Uuid::new_v4(), custom_model(), date(2024, 2, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::Internal(_)));
    }

    #[tokio::test]
    async fn create_reports_validation_errors_without_touching_storage() {
        let usecase = usecase(
            MockSubscriptionRepository::new(),
            MockServiceRepository::new(),
            MockLogoStorageClient::new(),
        );
        let model = UpsertSubscriptionModel {
            amount_minor: -5,
            ..upsert(Some(1))
        };

        let err = usecase
            .create(Uuid::new_v4(), model, date(2024, 2, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::Validation(_)));
    }

    #[tokio::test]
    async fn update_rejects_cancelled_subscription() {
        let user_id = Uuid::new_v4();
        let subscription_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_id()
            .returning(move |user_id, id| Ok(Some(stored(user_id, id, date(2024, 3, 2), true))));
        subscription_repo.expect_update().never();

        let usecase = usecase(
            subscription_repo,
            MockServiceRepository::new(),
            MockLogoStorageClient::new(),
        );
        let err = usecase
            .update(user_id, subscription_id, upsert(Some(1)), date(2024, 2, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::Cancelled));
    }

    #[tokio::test]
    async fn update_writes_recomputed_trial_dates() {
        let user_id = Uuid::new_v4();
        let subscription_id = Uuid::new_v4();

        let mut service_repo = MockServiceRepository::new();
        service_repo
            .expect_find_visible()
            .returning(|id, _| Ok(Some(service(id, None))));

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_id()
            .returning(move |user_id, id| Ok(Some(stored(user_id, id, date(2024, 3, 2), false))));
        subscription_repo
            .expect_update()
            .withf(move |uid, sid, entity| {
                *uid == user_id
                    && *sid == subscription_id
                    && entity.is_trial
                    && entity.trial_end_date == Some(date(2024, 2, 15))
                    && entity.next_billing_date == date(2024, 2, 15)
                    && entity.trial_billing_cycle.as_deref() == Some("weekly")
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let model = UpsertSubscriptionModel {
            start_date: date(2024, 2, 15),
            is_trial: true,
            trial_start_date: Some(date(2024, 2, 8)),
            trial_billing_cycle: Some(BillingCycle::Weekly),
            ..upsert(Some(1))
        };

        let usecase = usecase(subscription_repo, service_repo, MockLogoStorageClient::new());
        usecase
            .update(user_id, subscription_id, model, date(2024, 2, 1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn renew_moves_next_billing_date_one_cycle() {
        let user_id = Uuid::new_v4();
        let subscription_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_id()
            .returning(move |user_id, id| Ok(Some(stored(user_id, id, date(2024, 1, 31), false))));
        subscription_repo
            .expect_renew()
            .withf(move |uid, sid, next, _| {
                *uid == user_id && *sid == subscription_id && *next == date(2024, 3, 2)
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let usecase = usecase(
            subscription_repo,
            MockServiceRepository::new(),
            MockLogoStorageClient::new(),
        );
        usecase
            .renew(user_id, subscription_id, date(2024, 2, 1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn renew_of_cancelled_subscription_conflicts() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_id()
            .returning(move |user_id, id| Ok(Some(stored(user_id, id, date(2024, 1, 31), true))));
        subscription_repo.expect_renew().never();

        let usecase = usecase(
            subscription_repo,
            MockServiceRepository::new(),
            MockLogoStorageClient::new(),
        );
        let err = usecase
            .renew(Uuid::new_v4(), Uuid::new_v4(), date(2024, 2, 1))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn cancel_missing_subscription_is_not_found() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_find_by_id().returning(|_, _| Ok(None));
        subscription_repo.expect_cancel().never();

        let usecase = usecase(
            subscription_repo,
            MockServiceRepository::new(),
            MockLogoStorageClient::new(),
        );
        let err = usecase
            .cancel(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::NotFound));
    }

    #[tokio::test]
    async fn cancel_sets_cancellation_timestamp() {
        let user_id = Uuid::new_v4();
        let subscription_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_id()
            .returning(move |user_id, id| Ok(Some(stored(user_id, id, date(2024, 3, 2), false))));
        subscription_repo
            .expect_cancel()
            .with(eq(user_id), eq(subscription_id), mockall::predicate::always())
            .times(1)
            .returning(|_, _, _| Ok(()));

        let usecase = usecase(
            subscription_repo,
            MockServiceRepository::new(),
            MockLogoStorageClient::new(),
        );
        usecase.cancel(user_id, subscription_id).await.unwrap();
    }

    #[tokio::test]
    async fn list_loads_cancelled_rows_only_on_request() {
        let user_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_list_by_user()
            .with(eq(user_id), eq(false))
            .times(1)
            .returning(|user_id, _| {
                Ok(vec![
                    stored(user_id, Uuid::new_v4(), date(2024, 3, 20), false),
                    stored(user_id, Uuid::new_v4(), date(2024, 2, 10), false),
                ])
            });

        let usecase = usecase(
            subscription_repo,
            MockServiceRepository::new(),
            MockLogoStorageClient::new(),
        );
        let list = usecase
            .list(
                user_id,
                ListSubscriptionsFilter {
                    status: Some(SubscriptionStatus::Expired),
                    ..Default::default()
                },
                date(2024, 3, 1),
            )
            .await
            .unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].next_billing_date, date(2024, 2, 10));
        assert_eq!(list[0].days_left, -20);
    }

    #[test]
    fn preview_runs_the_reducer() {
        let usecase = usecase(
            MockSubscriptionRepository::new(),
            MockServiceRepository::new(),
            MockLogoStorageClient::new(),
        );
        let draft = usecase.preview(PreviewDraftModel {
            draft: SubscriptionDraft::default(),
            change: Some(DraftChange::StartDate(Some(date(2024, 2, 29)))),
        });
        assert_eq!(draft.next_billing_date, Some(date(2024, 3, 29)));
    }
}
