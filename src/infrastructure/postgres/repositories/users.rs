use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{insert_into, prelude::*, update};
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            email_verifications::{EmailVerificationEntity, InsertEmailVerificationEntity},
            users::{EditUserEntity, RegisterUserEntity, UserEntity},
        },
        repositories::users::UserRepository,
        value_objects::enums::user_statuses::UserStatus,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{email_verifications, users},
    },
};

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn register_with_verification(
        &self,
        register_user_entity: RegisterUserEntity,
        code_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user_id = conn.transaction::<Uuid, diesel::result::Error, _>(|tx| {
            let user_id = insert_into(users::table)
                .values(&register_user_entity)
                .returning(users::id)
                .get_result::<Uuid>(tx)?;

            insert_into(email_verifications::table)
                .values(&InsertEmailVerificationEntity {
                    user_id,
                    code_hash,
                    expires_at,
                })
                .execute(tx)?;

            Ok(user_id)
        })?;

        Ok(user_id)
    }

    async fn create_google_user(
        &self,
        register_user_entity: RegisterUserEntity,
    ) -> Result<UserEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = insert_into(users::table)
            .values(&register_user_entity)
            .returning(UserEntity::as_returning())
            .get_result::<UserEntity>(&mut conn)?;

        Ok(user)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = users::table
            .filter(users::id.eq(user_id))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(user)
    }

    async fn find_by_email(&self, email: String) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = users::table
            .filter(users::email.eq(email))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(user)
    }

    async fn find_by_google_sub(&self, google_sub: String) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = users::table
            .filter(users::google_sub.eq(google_sub))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(user)
    }

    async fn edit(&self, user_id: Uuid, edit_user_entity: EditUserEntity) -> Result<UserEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = update(users::table)
            .filter(users::id.eq(user_id))
            .set(&edit_user_entity)
            .returning(UserEntity::as_returning())
            .get_result::<UserEntity>(&mut conn)?;

        Ok(user)
    }

    async fn create_email_verification(
        &self,
        insert_email_verification_entity: InsertEmailVerificationEntity,
    ) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let verification_id = insert_into(email_verifications::table)
            .values(&insert_email_verification_entity)
            .returning(email_verifications::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(verification_id)
    }

    async fn find_latest_email_verification(
        &self,
        user_id: Uuid,
    ) -> Result<Option<EmailVerificationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let verification = email_verifications::table
            .filter(email_verifications::user_id.eq(user_id))
            .order(email_verifications::created_at.desc())
            .select(EmailVerificationEntity::as_select())
            .first::<EmailVerificationEntity>(&mut conn)
            .optional()?;

        Ok(verification)
    }

    async fn record_failed_verification_attempt(&self, verification_id: Uuid) -> Result<i32> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let failed_attempts = update(email_verifications::table)
            .filter(email_verifications::id.eq(verification_id))
            .set(email_verifications::failed_attempts.eq(email_verifications::failed_attempts + 1))
            .returning(email_verifications::failed_attempts)
            .get_result::<i32>(&mut conn)?;

        Ok(failed_attempts)
    }

    async fn complete_email_verification(
        &self,
        user_id: Uuid,
        verification_id: Uuid,
        verified_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<(), diesel::result::Error, _>(|tx| {
            update(email_verifications::table)
                .filter(email_verifications::id.eq(verification_id))
                .filter(email_verifications::user_id.eq(user_id))
                .set(email_verifications::used_at.eq(Some(verified_at)))
                .execute(tx)?;

            update(users::table)
                .filter(users::id.eq(user_id))
                .set((
                    users::status.eq(UserStatus::Active.to_string()),
                    users::email_verified_at.eq(Some(verified_at)),
                    users::updated_at.eq(verified_at),
                ))
                .execute(tx)?;

            Ok(())
        })?;

        Ok(())
    }
}
