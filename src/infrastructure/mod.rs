pub mod argon2_hashing;
pub mod axum_http;
pub mod google_identity;
pub mod jwt_authentication;
pub mod postgres;
pub mod storages;
pub mod verification_mailer;
