use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand::{Rng, rngs::OsRng};

use crate::domain::value_objects::iam::VERIFICATION_CODE_DIGITS;

pub fn hash(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hashed = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|err| anyhow!("Failed to hash secret: {}", err))?;
    Ok(hashed.to_string())
}

pub fn verify(secret: &str, hashed_secret: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hashed_secret)
        .map_err(|err| anyhow!("Stored hash is malformed: {}", err))?;
    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}

/// Zero-padded numeric code, e.g. `004271`.
pub fn generate_verification_code() -> String {
    let upper = 10_u32.pow(VERIFICATION_CODE_DIGITS as u32);
    let code = rand::thread_rng().gen_range(0..upper);
    format!("{:0width$}", code, width = VERIFICATION_CODE_DIGITS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::iam::is_verification_code;

    #[test]
    fn hashed_password_verifies() {
        let hashed = hash("Secr3t!pw").unwrap();
        assert_ne!(hashed, "Secr3t!pw");
        assert!(verify("Secr3t!pw", &hashed).unwrap());
        assert!(!verify("Secr3t!px", &hashed).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn verification_codes_are_six_digits() {
        for _ in 0..50 {
            assert!(is_verification_code(&generate_verification_code()));
        }
    }
}
