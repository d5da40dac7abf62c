pub mod email_verifications;
pub mod services;
pub mod subscriptions;
pub mod users;
