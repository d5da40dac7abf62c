use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    config::config_model::UserSecret,
    domain::{
        entities::{
            email_verifications::InsertEmailVerificationEntity,
            users::{EditUserEntity, RegisterUserEntity, UserEntity},
        },
        repositories::users::UserRepository,
        value_objects::{
            enums::user_statuses::UserStatus,
            iam::{
                GoogleLoginModel, LinkGoogleModel, LoginModel, RegisterUserModel,
                RegisteredUserModel, TokenModel, VerifyEmailModel, is_verification_code,
                normalize_email,
            },
        },
    },
    infrastructure::{argon2_hashing, jwt_authentication},
};

/// Identity asserted by a verified Google ID token.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleIdentity {
    pub subject: String,
    pub email: String,
    pub email_verified: bool,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GoogleIdentityGateway: Send + Sync {
    async fn verify_credential(&self, credential: String) -> AnyResult<GoogleIdentity>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerificationMailer: Send + Sync {
    async fn send_verification_code(
        &self,
        email: String,
        first_name: String,
        code: String,
    ) -> AnyResult<()>;
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("{0}")]
    Validation(String),
    #[error("Email is already registered")]
    EmailAlreadyRegistered,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Email address has not been verified")]
    EmailNotVerified,
    #[error("Invalid verification code")]
    InvalidVerificationCode,
    #[error("Verification code has expired")]
    VerificationCodeExpired,
    #[error("Too many wrong verification codes. Request a new code.")]
    TooManyVerificationAttempts,
    #[error("Account is blocked")]
    AccountBlocked,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid Google credential")]
    InvalidGoogleCredential,
    #[error("Google email address is not verified")]
    GoogleEmailNotVerified,
    #[error("An account with this email already exists. Link it with Google to continue.")]
    GoogleAccountNotLinked,
    #[error("Account is linked to a different Google account")]
    GoogleAccountMismatch,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthenticationError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AuthenticationError::Validation(_)
            | AuthenticationError::InvalidVerificationCode
            | AuthenticationError::VerificationCodeExpired
            | AuthenticationError::GoogleEmailNotVerified => StatusCode::BAD_REQUEST,
            AuthenticationError::InvalidCredentials
            | AuthenticationError::InvalidGoogleCredential => StatusCode::UNAUTHORIZED,
            AuthenticationError::EmailNotVerified | AuthenticationError::AccountBlocked => {
                StatusCode::FORBIDDEN
            }
            AuthenticationError::UserNotFound => StatusCode::NOT_FOUND,
            AuthenticationError::TooManyVerificationAttempts => StatusCode::TOO_MANY_REQUESTS,
            AuthenticationError::EmailAlreadyRegistered
            | AuthenticationError::GoogleAccountNotLinked
            | AuthenticationError::GoogleAccountMismatch => StatusCode::CONFLICT,
            AuthenticationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Wrong codes tolerated per issued verification code.
pub const MAX_VERIFICATION_ATTEMPTS: i32 = 5;

pub type UseCaseResult<T> = std::result::Result<T, AuthenticationError>;

pub struct AuthenticationUseCase<U, G, M>
where
    U: UserRepository + Send + Sync + 'static,
    G: GoogleIdentityGateway + 'static,
    M: VerificationMailer + 'static,
{
    user_repo: Arc<U>,
    google_gateway: Arc<G>,
    mailer: Arc<M>,
    user_secret: UserSecret,
    code_ttl: Duration,
}

impl<U, G, M> AuthenticationUseCase<U, G, M>
where
    U: UserRepository + Send + Sync + 'static,
    G: GoogleIdentityGateway + 'static,
    M: VerificationMailer + 'static,
{
    pub fn new(
        user_repo: Arc<U>,
        google_gateway: Arc<G>,
        mailer: Arc<M>,
        user_secret: UserSecret,
        code_ttl_minutes: i64,
    ) -> Self {
        Self {
            user_repo,
            google_gateway,
            mailer,
            user_secret,
            code_ttl: Duration::minutes(code_ttl_minutes),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.user_secret.cookie_name
    }

    pub fn token_ttl_days(&self) -> i64 {
        self.user_secret.ttl_days
    }

    pub async fn register(
        &self,
        register_user_model: RegisterUserModel,
    ) -> UseCaseResult<RegisteredUserModel> {
        let register_user_model = register_user_model
            .normalized()
            .map_err(|err| AuthenticationError::Validation(err.to_string()))?;
        let email = register_user_model.email.clone();

        if let Some(existing) = self.find_by_email(&email).await? {
            if existing.email_verified_at.is_some() || existing.password_hash.is_none() {
                info!(user_id = %existing.id, "authentication: email already registered");
                return Err(AuthenticationError::EmailAlreadyRegistered);
            }

            info!(user_id = %existing.id, "authentication: re-sending verification code");
            let expires_at = self.issue_verification_code(&existing).await?;
            return Ok(RegisteredUserModel {
                id: existing.id,
                email: existing.email,
                verification_expires_at: expires_at,
            });
        }

        let password_hash = argon2_hashing::hash(&register_user_model.password)?;
        let code = argon2_hashing::generate_verification_code();
        let code_hash = argon2_hashing::hash(&code)?;
        let expires_at = Utc::now() + self.code_ttl;

        let user_id = self
            .user_repo
            .register_with_verification(
                register_user_model.to_entity(password_hash),
                code_hash,
                expires_at,
            )
            .await
            .map_err(|err| {
                error!(db_error = ?err, "authentication: failed to register user");
                AuthenticationError::Internal(err)
            })?;
        info!(%user_id, "authentication: user registered");

        self.send_code(&email, &register_user_model.first_name, code)
            .await?;

        Ok(RegisteredUserModel {
            id: user_id,
            email,
            verification_expires_at: expires_at,
        })
    }

    pub async fn verify_email(&self, verify_email_model: VerifyEmailModel) -> UseCaseResult<()> {
        let code = verify_email_model.code.trim();
        if !is_verification_code(code) {
            return Err(AuthenticationError::InvalidVerificationCode);
        }
        let email = normalize_email(&verify_email_model.email)
            .map_err(|err| AuthenticationError::Validation(err.to_string()))?;

        let user = self
            .find_by_email(&email)
            .await?
            .ok_or(AuthenticationError::InvalidVerificationCode)?;

        if user.email_verified_at.is_some() {
            info!(user_id = %user.id, "authentication: email already verified");
            return Ok(());
        }

        let verification = self
            .user_repo
            .find_latest_email_verification(user.id)
            .await
            .map_err(|err| {
                error!(user_id = %user.id, db_error = ?err, "authentication: failed to load verification");
                AuthenticationError::Internal(err)
            })?
            .filter(|verification| verification.used_at.is_none())
            .ok_or(AuthenticationError::InvalidVerificationCode)?;

        let now = Utc::now();
        if verification.expires_at < now {
            info!(user_id = %user.id, "authentication: verification code expired");
            return Err(AuthenticationError::VerificationCodeExpired);
        }
        if verification.failed_attempts >= MAX_VERIFICATION_ATTEMPTS {
            warn!(user_id = %user.id, "authentication: verification code locked");
            return Err(AuthenticationError::TooManyVerificationAttempts);
        }
        if !argon2_hashing::verify(code, &verification.code_hash)? {
            let failed_attempts = self
                .user_repo
                .record_failed_verification_attempt(verification.id)
                .await
                .map_err(|err| {
                    error!(user_id = %user.id, db_error = ?err, "authentication: failed to record verification attempt");
                    AuthenticationError::Internal(err)
                })?;
            warn!(user_id = %user.id, failed_attempts, "authentication: wrong verification code");
            if failed_attempts >= MAX_VERIFICATION_ATTEMPTS {
                return Err(AuthenticationError::TooManyVerificationAttempts);
            }
            return Err(AuthenticationError::InvalidVerificationCode);
        }

        self.user_repo
            .complete_email_verification(user.id, verification.id, now)
            .await
            .map_err(|err| {
                error!(user_id = %user.id, db_error = ?err, "authentication: failed to complete verification");
                AuthenticationError::Internal(err)
            })?;
        info!(user_id = %user.id, "authentication: email verified");

        Ok(())
    }

    pub async fn login(&self, login_model: LoginModel) -> UseCaseResult<TokenModel> {
        let email =
            normalize_email(&login_model.email).map_err(|_| AuthenticationError::InvalidCredentials)?;

        let user = self
            .find_by_email(&email)
            .await?
            .ok_or(AuthenticationError::InvalidCredentials)?;

        let password_hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthenticationError::InvalidCredentials)?;
        if !argon2_hashing::verify(&login_model.password, password_hash)? {
            info!(user_id = %user.id, "authentication: password mismatch");
            return Err(AuthenticationError::InvalidCredentials);
        }

        ensure_not_blocked(&user)?;
        if user.email_verified_at.is_none() {
            return Err(AuthenticationError::EmailNotVerified);
        }

        info!(user_id = %user.id, "authentication: login succeeded");
        self.issue_token(&user)
    }

    pub async fn google_login(&self, google_login_model: GoogleLoginModel) -> UseCaseResult<TokenModel> {
        let identity = self.verify_google(google_login_model.credential).await?;

        if let Some(user) = self.find_by_google_sub(&identity.subject).await? {
            ensure_not_blocked(&user)?;
            info!(user_id = %user.id, "authentication: google login succeeded");
            return self.issue_token(&user);
        }

        if let Some(user) = self.find_by_email(&identity.email).await? {
            return Err(match user.google_sub {
                Some(_) => AuthenticationError::GoogleAccountMismatch,
                None => {
                    info!(user_id = %user.id, "authentication: google login needs account link");
                    AuthenticationError::GoogleAccountNotLinked
                }
            });
        }

        let user = self
            .user_repo
            .create_google_user(google_user_entity(&identity))
            .await
            .map_err(|err| {
                error!(db_error = ?err, "authentication: failed to create google user");
                AuthenticationError::Internal(err)
            })?;
        info!(user_id = %user.id, "authentication: google user created");

        self.issue_token(&user)
    }

    pub async fn link_google(&self, link_google_model: LinkGoogleModel) -> UseCaseResult<TokenModel> {
        let identity = self.verify_google(link_google_model.credential).await?;

        let user = self
            .find_by_email(&identity.email)
            .await?
            .ok_or(AuthenticationError::UserNotFound)?;

        let password_hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthenticationError::InvalidCredentials)?;
        if !argon2_hashing::verify(&link_google_model.password, password_hash)? {
            info!(user_id = %user.id, "authentication: link-google password mismatch");
            return Err(AuthenticationError::InvalidCredentials);
        }
        ensure_not_blocked(&user)?;

        if let Some(linked) = self.find_by_google_sub(&identity.subject).await? {
            if linked.id != user.id {
                return Err(AuthenticationError::GoogleAccountMismatch);
            }
        }
        match user.google_sub.as_deref() {
            Some(subject) if subject == identity.subject => {
                return self.issue_token(&user);
            }
            Some(_) => return Err(AuthenticationError::GoogleAccountMismatch),
            None => {}
        }

        let now = Utc::now();
        let edit_user_entity = EditUserEntity {
            google_sub: Some(identity.subject.clone()),
            profile_picture: match user.profile_picture {
                Some(_) => None,
                None => identity.picture.clone(),
            },
            status: (UserStatus::from_str(&user.status) == UserStatus::PendingVerification)
                .then(|| UserStatus::Active.to_string()),
            email_verified_at: user.email_verified_at.is_none().then_some(now),
            updated_at: Some(now),
        };

        let user = self
            .user_repo
            .edit(user.id, edit_user_entity)
            .await
            .map_err(|err| {
                error!(user_id = %user.id, db_error = ?err, "authentication: failed to link google");
                AuthenticationError::Internal(err)
            })?;
        info!(user_id = %user.id, "authentication: google account linked");

        self.issue_token(&user)
    }

    async fn verify_google(&self, credential: String) -> UseCaseResult<GoogleIdentity> {
        let identity = self
            .google_gateway
            .verify_credential(credential)
            .await
            .map_err(|err| {
                warn!(error = ?err, "authentication: google credential rejected");
                AuthenticationError::InvalidGoogleCredential
            })?;

        if !identity.email_verified {
            return Err(AuthenticationError::GoogleEmailNotVerified);
        }

        Ok(GoogleIdentity {
            email: normalize_email(&identity.email)
                .map_err(|_| AuthenticationError::InvalidGoogleCredential)?,
            ..identity
        })
    }

    async fn issue_verification_code(&self, user: &UserEntity) -> UseCaseResult<DateTime<Utc>> {
        let code = argon2_hashing::generate_verification_code();
        let expires_at = Utc::now() + self.code_ttl;

        self.user_repo
            .create_email_verification(InsertEmailVerificationEntity {
                user_id: user.id,
                code_hash: argon2_hashing::hash(&code)?,
                expires_at,
            })
            .await
            .map_err(|err| {
                error!(user_id = %user.id, db_error = ?err, "authentication: failed to store verification code");
                AuthenticationError::Internal(err)
            })?;

        self.send_code(&user.email, &user.first_name, code).await?;
        Ok(expires_at)
    }

    async fn send_code(&self, email: &str, first_name: &str, code: String) -> UseCaseResult<()> {
        self.mailer
            .send_verification_code(email.to_string(), first_name.to_string(), code)
            .await
            .map_err(|err| {
                error!(error = ?err, "authentication: failed to send verification code");
                AuthenticationError::Internal(err)
            })
    }

    async fn find_by_email(&self, email: &str) -> UseCaseResult<Option<UserEntity>> {
        self.user_repo
            .find_by_email(email.to_string())
            .await
            .map_err(|err| {
                error!(db_error = ?err, "authentication: failed to look up user by email");
                AuthenticationError::Internal(err)
            })
    }

    async fn find_by_google_sub(&self, subject: &str) -> UseCaseResult<Option<UserEntity>> {
        self.user_repo
            .find_by_google_sub(subject.to_string())
            .await
            .map_err(|err| {
                error!(db_error = ?err, "authentication: failed to look up user by google subject");
                AuthenticationError::Internal(err)
            })
    }

    fn issue_token(&self, user: &UserEntity) -> UseCaseResult<TokenModel> {
        let claims = jwt_authentication::Claims::new(
            user.id,
            &user.email,
            Utc::now(),
            self.user_secret.ttl_days,
        );
        let token = jwt_authentication::generate_token(&self.user_secret.secret, &claims)?;
        Ok(TokenModel { token })
    }
}

fn ensure_not_blocked(user: &UserEntity) -> UseCaseResult<()> {
    if UserStatus::from_str(&user.status) == UserStatus::Blocked {
        warn!(user_id = %user.id, "authentication: blocked account");
        return Err(AuthenticationError::AccountBlocked);
    }
    Ok(())
}

fn google_user_entity(identity: &GoogleIdentity) -> RegisterUserEntity {
    let fallback_name = identity
        .email
        .split('@')
        .next()
        .unwrap_or_default()
        .to_string();

    RegisterUserEntity {
        first_name: identity.given_name.clone().unwrap_or(fallback_name),
        last_name: identity.family_name.clone().unwrap_or_default(),
        email: identity.email.clone(),
        phone_number: String::new(),
        password_hash: None,
        google_sub: Some(identity.subject.clone()),
        profile_picture: identity.picture.clone(),
        status: UserStatus::Active.to_string(),
        email_verified_at: Some(Utc::now()),
    }
}
