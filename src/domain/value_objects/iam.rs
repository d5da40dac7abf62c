use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::users::{RegisterUserEntity, UserEntity},
    value_objects::enums::user_statuses::UserStatus,
};

pub const MIN_PASSWORD_CHARS: usize = 8;
pub const VERIFICATION_CODE_DIGITS: usize = 6;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserModel {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub profile_picture: Option<String>,
    pub status: UserStatus,
    pub google_linked: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for UserModel {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            first_name: entity.first_name,
            last_name: entity.last_name,
            email: entity.email,
            phone_number: entity.phone_number,
            profile_picture: entity.profile_picture,
            status: UserStatus::from_str(&entity.status),
            google_linked: entity.google_sub.is_some(),
            email_verified_at: entity.email_verified_at,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserModel {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    #[serde(alias = "confirmPassword")]
    pub confirm_password: String,
}

impl RegisterUserModel {
    /// Trims the free-text fields and checks them against the sign-up rules.
    pub fn normalized(self) -> Result<Self> {
        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        let phone_number = self.phone_number.trim().to_string();

        if first_name.is_empty() {
            bail!("First name is required");
        }
        if last_name.is_empty() {
            bail!("Last name is required");
        }
        let email = normalize_email(&self.email)?;
        validate_phone_number(&phone_number)?;
        validate_password(&self.password)?;
        if self.password != self.confirm_password {
            bail!("Passwords don't match");
        }

        Ok(Self {
            first_name,
            last_name,
            email,
            phone_number,
            ..self
        })
    }

    pub fn to_entity(&self, password_hash: String) -> RegisterUserEntity {
        RegisterUserEntity {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            password_hash: Some(password_hash),
            google_sub: None,
            profile_picture: None,
            status: UserStatus::PendingVerification.to_string(),
            email_verified_at: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEmailModel {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginModel {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleLoginModel {
    pub credential: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkGoogleModel {
    pub password: String,
    pub credential: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TokenModel {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUserModel {
    pub id: Uuid,
    pub email: String,
    pub verification_expires_at: DateTime<Utc>,
}

/// Lower-cases and shape-checks an address: one `@`, a non-empty local part and a dotted domain.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
                && domain
                    .split('.')
                    .all(|label| !label.is_empty())
                && domain.contains('.')
        }
        None => false,
    };
    if !valid {
        bail!("Invalid email");
    }
    Ok(email)
}

pub fn validate_phone_number(phone_number: &str) -> Result<()> {
    if phone_number.is_empty() {
        bail!("Phone number is required");
    }
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '(' | ')' | '+' | '-') || c.is_whitespace();
    if !phone_number.chars().all(allowed) {
        bail!("Invalid phone number");
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_CHARS;
    let no_whitespace = !password.chars().any(char::is_whitespace);
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());

    if !(long_enough && no_whitespace && has_lower && has_upper && has_digit && has_symbol) {
        bail!(
            "Password must be at least 8 characters and include lowercase, uppercase, number, and symbol."
        );
    }
    Ok(())
}

pub fn is_verification_code(code: &str) -> bool {
    code.len() == VERIFICATION_CODE_DIGITS && code.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register() -> RegisterUserModel {
        RegisterUserModel {
            first_name: " Ada ".to_string(),
            last_name: "Lovelace".to_string(),
            email: " Ada@Example.COM ".to_string(),
            phone_number: "+1 (555) 010-2030".to_string(),
            password: "Secr3t!pw".to_string(),
            confirm_password: "Secr3t!pw".to_string(),
        }
    }

    #[test]
    fn normalizes_valid_registration() {
        let model = register().normalized().unwrap();
        assert_eq!(model.first_name, "Ada");
        assert_eq!(model.email, "ada@example.com");

        let entity = model.to_entity("hash".to_string());
        assert_eq!(entity.status, "pending_verification");
        assert_eq!(entity.password_hash.as_deref(), Some("hash"));
        assert!(entity.email_verified_at.is_none());
    }

    #[test]
    fn rejects_mismatched_confirmation() {
        let model = RegisterUserModel {
            confirm_password: "Secr3t!px".to_string(),
            ..register()
        };
        let err = model.normalized().unwrap_err();
        assert_eq!(err.to_string(), "Passwords don't match");
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("Secr3t!pw").is_ok());
        assert!(validate_password("Sh0rt!").is_err());
        assert!(validate_password("alllower1!").is_err());
        assert!(validate_password("ALLUPPER1!").is_err());
        assert!(validate_password("NoDigits!!").is_err());
        assert!(validate_password("NoSymbol11").is_err());
        assert!(validate_password("With Space1!").is_err());
    }

    #[test]
    fn phone_number_rules() {
        assert!(validate_phone_number("+66 (0) 81-234-5678").is_ok());
        assert!(validate_phone_number("").is_err());
        assert!(validate_phone_number("call me").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(normalize_email("someone@mail.example").is_ok());
        assert!(normalize_email("someone").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("a@b@example.com").is_err());
        assert!(normalize_email("a@example.").is_err());
        assert!(normalize_email("a b@example.com").is_err());
    }

    #[test]
    fn verification_code_is_six_digits() {
        assert!(is_verification_code("012345"));
        assert!(!is_verification_code("12345"));
        assert!(!is_verification_code("12345a"));
    }

    #[test]
    fn accepts_camel_case_confirmation_field() {
        let json = r#"{"first_name":"A","last_name":"B","email":"a@b.co",
            "phone_number":"1","password":"x","confirmPassword":"x"}"#;
        let model: RegisterUserModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.confirm_password, "x");
    }
}
