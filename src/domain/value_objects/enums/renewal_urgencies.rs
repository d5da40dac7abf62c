use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RenewalUrgency {
    Urgent,
    Warning,
    Normal,
}

impl RenewalUrgency {
    pub fn from_days_left(days_left: i64) -> Self {
        if days_left <= 3 {
            RenewalUrgency::Urgent
        } else if days_left <= 7 {
            RenewalUrgency::Warning
        } else {
            RenewalUrgency::Normal
        }
    }
}
