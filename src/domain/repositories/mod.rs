pub mod services;
pub mod storage;
pub mod subscriptions;
pub mod users;
