use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{billing_period::add_period_to_date, enums::billing_cycles::BillingCycle};

/// Date fields of the subscription form. Derived fields (`next_billing_date`,
/// `trial_end_date`) are recomputed from the inputs after every change.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubscriptionDraft {
    pub billing_cycle: BillingCycle,
    pub start_date: Option<NaiveDate>,
    pub next_billing_date: Option<NaiveDate>,
    pub is_trial: bool,
    pub trial_start_date: Option<NaiveDate>,
    pub trial_billing_cycle: BillingCycle,
    pub trial_end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum DraftChange {
    StartDate(Option<NaiveDate>),
    BillingCycle(BillingCycle),
    TrialEnabled(bool),
    TrialStartDate(Option<NaiveDate>),
    TrialBillingCycle(BillingCycle),
}

impl SubscriptionDraft {
    pub fn new(
        billing_cycle: BillingCycle,
        start_date: Option<NaiveDate>,
        is_trial: bool,
        trial_start_date: Option<NaiveDate>,
        trial_billing_cycle: BillingCycle,
    ) -> Self {
        Self {
            billing_cycle,
            start_date,
            next_billing_date: None,
            is_trial,
            trial_start_date,
            trial_billing_cycle,
            trial_end_date: None,
        }
        .recompute()
    }

    pub fn apply(mut self, change: DraftChange) -> Self {
        match change {
            DraftChange::StartDate(value) => self.start_date = value,
            DraftChange::BillingCycle(value) => self.billing_cycle = value,
            DraftChange::TrialEnabled(value) => self.is_trial = value,
            DraftChange::TrialStartDate(value) => self.trial_start_date = value,
            DraftChange::TrialBillingCycle(value) => self.trial_billing_cycle = value,
        }
        self.recompute()
    }

    pub fn recompute(mut self) -> Self {
        self.trial_end_date = match (self.is_trial, self.trial_start_date) {
            (true, Some(trial_start)) => {
                add_period_to_date(trial_start, self.trial_billing_cycle, 1)
            }
            _ => None,
        };

        self.next_billing_date = match self.trial_end_date {
            Some(trial_end) => Some(trial_end),
            None => self
                .start_date
                .and_then(|start| add_period_to_date(start, self.billing_cycle, 1)),
        };

        self
    }

    pub fn trial_active(&self) -> bool {
        self.is_trial && self.trial_end_date.is_some()
    }
}
