pub mod services;
pub mod subscriptions;
pub mod users;
