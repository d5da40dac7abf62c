use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionSortKey {
    #[default]
    NextBillingDate,
    Amount,
    Name,
    CreatedAt,
}
