pub mod analytics;
pub mod authentication;
pub mod services;
pub mod subscriptions;
pub mod users;
