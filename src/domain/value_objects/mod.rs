pub mod analytics;
pub mod billing_period;
pub mod categories;
pub mod enums;
pub mod iam;
pub mod logos;
pub mod services;
pub mod subscription_draft;
pub mod subscriptions;
