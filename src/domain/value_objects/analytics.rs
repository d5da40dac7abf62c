use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{
    billing_period::add_period_to_date,
    categories::CategoryModel,
    enums::{
        billing_cycles::BillingCycle, renewal_urgencies::RenewalUrgency,
        subscription_statuses::SubscriptionStatus,
    },
    subscriptions::SubscriptionModel,
};

pub const DEFAULT_CURRENCY: &str = "USD";
pub const UPCOMING_RENEWAL_DAYS: i64 = 14;
pub const DEFAULT_FORECAST_MONTHS: u32 = 6;
pub const MAX_FORECAST_MONTHS: u32 = 24;
const MAX_PROJECTED_CHARGES: u32 = 10_000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryQuery {
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastQuery {
    pub currency: Option<String>,
    pub months: Option<u32>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryModel {
    pub currency: String,
    pub monthly_spending_minor: i64,
    pub yearly_spending_minor: i64,
    pub active_count: usize,
    pub categories: Vec<CategorySpendingModel>,
    pub billing_cycles: Vec<BillingCycleCountModel>,
    pub renewals_count: usize,
    pub renewals: Vec<RenewalModel>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpendingModel {
    pub category: CategoryModel,
    pub monthly_spending_minor: i64,
    pub yearly_spending_minor: i64,
    pub share_percent: f64,
    pub subscription_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillingCycleCountModel {
    pub billing_cycle: BillingCycle,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenewalModel {
    pub subscription_id: Uuid,
    pub service_name: String,
    pub image_url: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub next_billing_date: NaiveDate,
    pub days_left: i64,
    pub urgency: RenewalUrgency,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPointModel {
    /// `YYYY-MM`
    pub month: String,
    pub total_minor: i64,
    pub charges: usize,
}

/// Upper-cases a requested currency, falling back to USD.
pub fn resolve_currency(currency: Option<&str>) -> String {
    currency
        .map(str::trim)
        .filter(|currency| !currency.is_empty())
        .map(str::to_ascii_uppercase)
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

/// Cost per year of one subscription, in minor units.
pub fn yearly_amount_minor(amount_minor: i64, cycle: BillingCycle) -> i64 {
    amount_minor.saturating_mul(cycle.periods_per_year())
}

/// Average cost per month, rounded half up to the nearest minor unit.
pub fn monthly_from_yearly_minor(yearly_minor: i64) -> i64 {
    (yearly_minor + 6).div_euclid(12)
}

fn is_billable(subscription: &SubscriptionModel) -> bool {
    subscription.status != SubscriptionStatus::Cancelled
}

pub fn summarize(subscriptions: &[SubscriptionModel], currency: &str) -> SummaryModel {
    let billable: Vec<&SubscriptionModel> = subscriptions
        .iter()
        .filter(|subscription| is_billable(subscription) && subscription.currency == currency)
        .collect();

    let yearly_spending_minor: i64 = billable
        .iter()
        .map(|s| yearly_amount_minor(s.amount_minor, s.billing_cycle))
        .sum();

    let mut per_category: BTreeMap<i32, (CategoryModel, i64, usize)> = BTreeMap::new();
    for subscription in &billable {
        let entry = per_category
            .entry(subscription.category.id)
            .or_insert((subscription.category, 0, 0));
        entry.1 += yearly_amount_minor(subscription.amount_minor, subscription.billing_cycle);
        entry.2 += 1;
    }

    let mut categories: Vec<CategorySpendingModel> = per_category
        .into_values()
        .map(|(category, yearly, count)| CategorySpendingModel {
            category,
            monthly_spending_minor: monthly_from_yearly_minor(yearly),
            yearly_spending_minor: yearly,
            share_percent: share_percent(yearly, yearly_spending_minor),
            subscription_count: count,
        })
        .collect();
    categories.sort_by(|a, b| {
        b.yearly_spending_minor
            .cmp(&a.yearly_spending_minor)
            .then(a.category.id.cmp(&b.category.id))
    });

    let billing_cycles = BillingCycle::ALL
        .into_iter()
        .map(|cycle| BillingCycleCountModel {
            billing_cycle: cycle,
            count: billable.iter().filter(|s| s.billing_cycle == cycle).count(),
        })
        .collect();

    let renewals = upcoming_renewals(subscriptions);

    SummaryModel {
        currency: currency.to_string(),
        monthly_spending_minor: monthly_from_yearly_minor(yearly_spending_minor),
        yearly_spending_minor,
        active_count: billable.len(),
        categories,
        billing_cycles,
        renewals_count: renewals.len(),
        renewals,
    }
}

fn share_percent(part: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / total as f64).round() / 10.0
}

/// Renewals due today or within the next two weeks, across every currency.
pub fn upcoming_renewals(subscriptions: &[SubscriptionModel]) -> Vec<RenewalModel> {
    let mut renewals: Vec<RenewalModel> = subscriptions
        .iter()
        .filter(|s| is_billable(s) && (0..=UPCOMING_RENEWAL_DAYS).contains(&s.days_left))
        .map(|s| RenewalModel {
            subscription_id: s.id,
            service_name: s.service.name.clone(),
            image_url: s.service.image_url.clone(),
            amount_minor: s.amount_minor,
            currency: s.currency.clone(),
            billing_cycle: s.billing_cycle,
            next_billing_date: s.next_billing_date,
            days_left: s.days_left,
            urgency: RenewalUrgency::from_days_left(s.days_left),
        })
        .collect();

    renewals.sort_by(|a, b| {
        a.next_billing_date
            .cmp(&b.next_billing_date)
            .then_with(|| a.service_name.to_lowercase().cmp(&b.service_name.to_lowercase()))
    });
    renewals
}

/// Projected charges per calendar month, starting with the month containing `today`.
pub fn forecast(
    subscriptions: &[SubscriptionModel],
    currency: &str,
    today: NaiveDate,
    months: u32,
) -> Vec<ForecastPointModel> {
    let months = months.clamp(1, MAX_FORECAST_MONTHS);
    let Some(window_start) = today.with_day(1) else {
        return Vec::new();
    };
    let month_starts: Vec<NaiveDate> = (0..=months)
        .filter_map(|offset| window_start.checked_add_months(Months::new(offset)))
        .collect();
    let Some(&window_end) = month_starts.last() else {
        return Vec::new();
    };

    let mut buckets: Vec<(i64, usize)> = vec![(0, 0); month_starts.len().saturating_sub(1)];

    for subscription in subscriptions
        .iter()
        .filter(|s| is_billable(s) && s.currency == currency)
    {
        for k in 0..MAX_PROJECTED_CHARGES {
            let Some(charge_date) =
                add_period_to_date(subscription.next_billing_date, subscription.billing_cycle, k)
            else {
                break;
            };
            if charge_date >= window_end {
                break;
            }
            if charge_date < window_start {
                continue;
            }
            let index = month_index(window_start, charge_date);
            if let Some(bucket) = buckets.get_mut(index) {
                bucket.0 += subscription.amount_minor;
                bucket.1 += 1;
            }
        }
    }

    month_starts
        .iter()
        .zip(buckets)
        .map(|(month_start, (total_minor, charges))| ForecastPointModel {
            month: month_start.format("%Y-%m").to_string(),
            total_minor,
            charges,
        })
        .collect()
}

fn month_index(window_start: NaiveDate, date: NaiveDate) -> usize {
    let months = (date.year() - window_start.year()) * 12 + date.month0() as i32
        - window_start.month0() as i32;
    usize::try_from(months).unwrap_or(0)
}
