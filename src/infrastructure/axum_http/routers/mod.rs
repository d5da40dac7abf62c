pub mod analytics;
pub mod authentication;
pub mod services;
pub mod subscriptions;
pub mod users;

use chrono::{NaiveDate, Utc};

/// Calendar date used for `daysLeft`, status and renewal windows.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
