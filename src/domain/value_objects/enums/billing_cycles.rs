use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingCycle {
    pub const ALL: [BillingCycle; 4] = [
        BillingCycle::Weekly,
        BillingCycle::Monthly,
        BillingCycle::Quarterly,
        BillingCycle::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Weekly => "weekly",
            BillingCycle::Monthly => "monthly",
            BillingCycle::Quarterly => "quarterly",
            BillingCycle::Yearly => "yearly",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "weekly" => Some(BillingCycle::Weekly),
            "monthly" => Some(BillingCycle::Monthly),
            "quarterly" => Some(BillingCycle::Quarterly),
            "yearly" => Some(BillingCycle::Yearly),
            _ => None,
        }
    }

    /// Number of charges a subscription on this cycle makes in one year.
    pub fn periods_per_year(&self) -> i64 {
        match self {
            BillingCycle::Weekly => 52,
            BillingCycle::Monthly => 12,
            BillingCycle::Quarterly => 4,
            BillingCycle::Yearly => 1,
        }
    }

    pub fn price_suffix(&self) -> &'static str {
        match self {
            BillingCycle::Weekly => "wk",
            BillingCycle::Monthly => "mo",
            BillingCycle::Quarterly => "qtr",
            BillingCycle::Yearly => "yr",
        }
    }
}

impl Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_form_matches_storage_and_wire_format() {
        for cycle in BillingCycle::ALL {
            assert_eq!(BillingCycle::from_str(cycle.as_str()), Some(cycle));
            let json = serde_json::to_string(&cycle).unwrap();
            assert_eq!(json, format!("\"{}\"", cycle));
        }
    }

    #[test]
    fn unknown_cycle_is_rejected() {
        assert_eq!(BillingCycle::from_str("daily"), None);
        assert!(serde_json::from_str::<BillingCycle>("\"daily\"").is_err());
    }
}
