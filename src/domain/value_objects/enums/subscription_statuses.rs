use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Days-left threshold under which a subscription is reported as about to expire.
pub const TO_EXPIRE_WITHIN_DAYS: i64 = 7;

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    ToExpire,
    Expired,
    Cancelled,
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::ToExpire => "to_expire",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", status)
    }
}

impl SubscriptionStatus {
    pub fn derive(cancelled: bool, days_left: i64) -> Self {
        if cancelled {
            SubscriptionStatus::Cancelled
        } else if days_left < 0 {
            SubscriptionStatus::Expired
        } else if days_left <= TO_EXPIRE_WITHIN_DAYS {
            SubscriptionStatus::ToExpire
        } else {
            SubscriptionStatus::Active
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "Active",
            SubscriptionStatus::ToExpire => "About to expire",
            SubscriptionStatus::Expired => "Expired",
            SubscriptionStatus::Cancelled => "Cancelled",
        }
    }
}
