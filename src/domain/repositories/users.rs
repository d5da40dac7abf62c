use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::{
    email_verifications::{EmailVerificationEntity, InsertEmailVerificationEntity},
    users::{EditUserEntity, RegisterUserEntity, UserEntity},
};

#[automock]
#[async_trait]
pub trait UserRepository {
    /// Inserts the user and its first verification code in one transaction.
    async fn register_with_verification(
        &self,
        register_user_entity: RegisterUserEntity,
        code_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<Uuid>;
    async fn create_google_user(&self, register_user_entity: RegisterUserEntity)
    -> Result<UserEntity>;
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;
    async fn find_by_email(&self, email: String) -> Result<Option<UserEntity>>;
    async fn find_by_google_sub(&self, google_sub: String) -> Result<Option<UserEntity>>;
    async fn edit(&self, user_id: Uuid, edit_user_entity: EditUserEntity) -> Result<UserEntity>;
    async fn create_email_verification(
        &self,
        insert_email_verification_entity: InsertEmailVerificationEntity,
    ) -> Result<Uuid>;
    async fn find_latest_email_verification(
        &self,
        user_id: Uuid,
    ) -> Result<Option<EmailVerificationEntity>>;
    /// Increments the failure counter and returns the new count.
    async fn record_failed_verification_attempt(&self, verification_id: Uuid) -> Result<i32>;
    /// Consumes the code and activates the user in one transaction.
    async fn complete_email_verification(
        &self,
        user_id: Uuid,
        verification_id: Uuid,
        verified_at: DateTime<Utc>,
    ) -> Result<()>;
}
