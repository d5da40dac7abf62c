use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::{
        EditSubscriptionEntity, InsertSubscriptionEntity, SubscriptionRecord,
    },
    value_objects::{
        billing_period::days_left,
        categories::{CategoryModel, find_category},
        enums::{
            billing_cycles::BillingCycle, sort_order::SortOrder,
            subscription_sort_keys::SubscriptionSortKey,
            subscription_statuses::SubscriptionStatus,
        },
        logos::{LogoUploadModel, ValidatedLogo, validate_logo},
        services::ServiceModel,
        subscription_draft::{DraftChange, SubscriptionDraft},
    },
};

pub const MAX_SERVICE_NAME_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionModel {
    pub id: Uuid,
    pub service: ServiceModel,
    pub category: CategoryModel,
    pub amount_minor: i64,
    pub currency: String,
    pub price_label: String,
    pub billing_cycle: BillingCycle,
    pub start_date: NaiveDate,
    pub next_billing_date: NaiveDate,
    pub days_left: i64,
    pub status: SubscriptionStatus,
    pub is_trial: bool,
    pub trial_start_date: Option<NaiveDate>,
    pub trial_billing_cycle: Option<BillingCycle>,
    pub trial_end_date: Option<NaiveDate>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionModel {
    /// Builds the API view of a stored row, deriving `days_left` and `status` for `today`.
    pub fn from_record(record: SubscriptionRecord, today: NaiveDate) -> Result<Self> {
        let SubscriptionRecord {
            subscription,
            service,
        } = record;

        let billing_cycle = parse_cycle(&subscription.billing_cycle)?;
        let trial_billing_cycle = subscription
            .trial_billing_cycle
            .as_deref()
            .map(parse_cycle)
            .transpose()?;
        let category = find_category(subscription.category_id)
            .ok_or_else(|| anyhow!("Unknown category id {}", subscription.category_id))?;

        let days_left = days_left(subscription.next_billing_date, today);
        let status = SubscriptionStatus::derive(subscription.cancelled_at.is_some(), days_left);

        Ok(Self {
            id: subscription.id,
            service: ServiceModel::from(service),
            category,
            price_label: format_price(subscription.amount_minor, &subscription.currency, billing_cycle),
            amount_minor: subscription.amount_minor,
            currency: subscription.currency,
            billing_cycle,
            start_date: subscription.start_date,
            next_billing_date: subscription.next_billing_date,
            days_left,
            status,
            is_trial: subscription.is_trial,
            trial_start_date: subscription.trial_start_date,
            trial_billing_cycle,
            trial_end_date: subscription.trial_end_date,
            cancelled_at: subscription.cancelled_at,
            created_at: subscription.created_at,
            updated_at: subscription.updated_at,
        })
    }
}

fn parse_cycle(value: &str) -> Result<BillingCycle> {
    BillingCycle::from_str(value).ok_or_else(|| anyhow!("Unknown billing cycle {:?}", value))
}

/// `1599, "USD", Monthly` renders as `15.99 USD/mo`.
pub fn format_price(amount_minor: i64, currency: &str, cycle: BillingCycle) -> String {
    let sign = if amount_minor < 0 { "-" } else { "" };
    let amount = amount_minor.unsigned_abs();
    format!(
        "{}{}.{:02} {}/{}",
        sign,
        amount / 100,
        amount % 100,
        currency,
        cycle.price_suffix()
    )
}

/// Create and full-update payload. Derived dates sent by the client are accepted
/// for compatibility but always recomputed.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UpsertSubscriptionModel {
    pub service_id: Option<i32>,
    pub service_name: Option<String>,
    pub logo: Option<LogoUploadModel>,
    pub category_id: i32,
    pub amount_minor: i64,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub start_date: NaiveDate,
    pub next_billing_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_trial: bool,
    #[serde(alias = "free_trial_start_date")]
    pub trial_start_date: Option<NaiveDate>,
    #[serde(alias = "free_trial_billing_cycle")]
    pub trial_billing_cycle: Option<BillingCycle>,
    #[serde(alias = "free_trial_end_date")]
    pub trial_end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceSelection {
    Catalog(i32),
    Custom { name: String, logo: ValidatedLogo },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubscription {
    pub service: ServiceSelection,
    pub category_id: i32,
    pub amount_minor: i64,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub start_date: NaiveDate,
    pub next_billing_date: NaiveDate,
    pub is_trial: bool,
    pub trial_start_date: Option<NaiveDate>,
    pub trial_billing_cycle: Option<BillingCycle>,
    pub trial_end_date: Option<NaiveDate>,
}

impl UpsertSubscriptionModel {
    pub fn validate(self) -> Result<ValidatedSubscription> {
        if self.amount_minor <= 0 {
            bail!("Amount must be greater than zero");
        }

        let currency = normalize_currency(&self.currency)?;

        if find_category(self.category_id).is_none() {
            bail!("Unknown category id {}", self.category_id);
        }

        let service_name = self
            .service_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let service = match (self.service_id, service_name) {
            (Some(_), Some(_)) => bail!("Provide either service_id or service_name, not both"),
            (None, None) => bail!("A service is required"),
            (Some(service_id), None) => ServiceSelection::Catalog(service_id),
            (None, Some(name)) => {
                if name.chars().count() > MAX_SERVICE_NAME_CHARS {
                    bail!("Service name must be at most {} characters", MAX_SERVICE_NAME_CHARS);
                }
                let upload = self
                    .logo
                    .as_ref()
                    .ok_or_else(|| anyhow!("A logo is required for a custom service"))?;
                ServiceSelection::Custom {
                    name: name.to_string(),
                    logo: validate_logo(upload)?,
                }
            }
        };

        let trial_billing_cycle = if self.is_trial {
            if self.trial_start_date.is_none() {
                bail!("Trial start date is required");
            }
            Some(
                self.trial_billing_cycle
                    .ok_or_else(|| anyhow!("Trial billing cycle is required"))?,
            )
        } else {
            None
        };

        let draft = SubscriptionDraft::new(
            self.billing_cycle,
            Some(self.start_date),
            self.is_trial,
            self.trial_start_date,
            trial_billing_cycle.unwrap_or_default(),
        );

        let next_billing_date = draft
            .next_billing_date
            .ok_or_else(|| anyhow!("Billing date is out of range"))?;

        if self.is_trial {
            let trial_end = draft
                .trial_end_date
                .ok_or_else(|| anyhow!("Trial end date is out of range"))?;
            if self.start_date < trial_end {
                bail!("Start date must not precede the trial end date");
            }
        }

        Ok(ValidatedSubscription {
            service,
            category_id: self.category_id,
            amount_minor: self.amount_minor,
            currency,
            billing_cycle: self.billing_cycle,
            start_date: self.start_date,
            next_billing_date,
            is_trial: self.is_trial,
            trial_start_date: if self.is_trial { self.trial_start_date } else { None },
            trial_billing_cycle,
            trial_end_date: draft.trial_end_date,
        })
    }
}

fn normalize_currency(currency: &str) -> Result<String> {
    let currency = currency.trim();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        bail!("Currency must be a three-letter ISO 4217 code");
    }
    Ok(currency.to_ascii_uppercase())
}

impl ValidatedSubscription {
    pub fn to_insert_entity(&self, user_id: Uuid, service_id: i32) -> InsertSubscriptionEntity {
        InsertSubscriptionEntity {
            user_id,
            service_id,
            category_id: self.category_id,
            amount_minor: self.amount_minor,
            currency: self.currency.clone(),
            billing_cycle: self.billing_cycle.to_string(),
            start_date: self.start_date,
            next_billing_date: self.next_billing_date,
            is_trial: self.is_trial,
            trial_start_date: self.trial_start_date,
            trial_end_date: self.trial_end_date,
            trial_billing_cycle: self.trial_billing_cycle.map(|cycle| cycle.to_string()),
        }
    }

    pub fn to_edit_entity(&self, service_id: i32, now: DateTime<Utc>) -> EditSubscriptionEntity {
        EditSubscriptionEntity {
            service_id,
            category_id: self.category_id,
            amount_minor: self.amount_minor,
            currency: self.currency.clone(),
            billing_cycle: self.billing_cycle.to_string(),
            start_date: self.start_date,
            next_billing_date: self.next_billing_date,
            is_trial: self.is_trial,
            trial_start_date: self.trial_start_date,
            trial_end_date: self.trial_end_date,
            trial_billing_cycle: self.trial_billing_cycle.map(|cycle| cycle.to_string()),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ListSubscriptionsFilter {
    pub status: Option<SubscriptionStatus>,
    pub category_id: Option<i32>,
    pub billing_cycle: Option<BillingCycle>,
    pub search: Option<String>,
    pub sort_by: Option<SubscriptionSortKey>,
    pub sort_order: Option<SortOrder>,
    pub include_cancelled: Option<bool>,
}

impl ListSubscriptionsFilter {
    /// Cancelled rows are loaded when explicitly requested or when filtering by that status.
    pub fn wants_cancelled(&self) -> bool {
        self.include_cancelled.unwrap_or(false)
            || self.status == Some(SubscriptionStatus::Cancelled)
    }
}

pub fn apply_list_filter(
    subscriptions: Vec<SubscriptionModel>,
    filter: &ListSubscriptionsFilter,
) -> Vec<SubscriptionModel> {
    let needle = filter
        .search
        .as_deref()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty());
    let wants_cancelled = filter.wants_cancelled();

    let mut subscriptions: Vec<SubscriptionModel> = subscriptions
        .into_iter()
        .filter(|s| wants_cancelled || s.status != SubscriptionStatus::Cancelled)
        .filter(|s| filter.status.is_none_or(|status| s.status == status))
        .filter(|s| filter.category_id.is_none_or(|id| s.category.id == id))
        .filter(|s| filter.billing_cycle.is_none_or(|cycle| s.billing_cycle == cycle))
        .filter(|s| match needle.as_deref() {
            Some(needle) => s.service.name.to_lowercase().contains(needle),
            None => true,
        })
        .collect();

    let sort_by = filter.sort_by.unwrap_or_default();
    subscriptions.sort_by(|a, b| {
        let ordering = match sort_by {
            SubscriptionSortKey::NextBillingDate => a.next_billing_date.cmp(&b.next_billing_date),
            SubscriptionSortKey::Amount => a.amount_minor.cmp(&b.amount_minor),
            SubscriptionSortKey::Name => a
                .service
                .name
                .to_lowercase()
                .cmp(&b.service.name.to_lowercase()),
            SubscriptionSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        ordering.then(a.id.cmp(&b.id))
    });

    if filter.sort_order.unwrap_or_default() == SortOrder::Desc {
        subscriptions.reverse();
    }
    subscriptions
}

/// Form state plus an optional edit, as sent by the preview endpoint.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct PreviewDraftModel {
    #[serde(flatten)]
    pub draft: SubscriptionDraft,
    pub change: Option<DraftChange>,
}

impl PreviewDraftModel {
    pub fn resolve(self) -> SubscriptionDraft {
        match self.change {
            Some(change) => self.draft.apply(change),
            None => self.draft.recompute(),
        }
    }
}
