use anyhow::{Context, Result};
use url::Url;

use super::{
    config_model::{
        Database, DotEnvyConfig, Google, LogoStorage, Server, UserSecret, Verification,
    },
    stage::Stage,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: required("SERVER_PORT")?
            .parse()
            .context("SERVER_PORT is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
        allowed_origin: optional("SERVER_ALLOWED_ORIGIN"),
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let user_secret = get_user_secret()?;

    let google = Google {
        client_id: required("GOOGLE_CLIENT_ID")?,
    };

    let logo_storage = LogoStorage {
        directory: optional("LOGO_STORAGE_DIR").unwrap_or_else(|| "./media/logos".to_string()),
        public_base_url: optional("LOGO_PUBLIC_BASE_URL")
            .unwrap_or_else(|| "/media/logos".to_string()),
    };

    let mailer_webhook_url = match optional("MAILER_WEBHOOK_URL") {
        Some(raw) => Some(Url::parse(&raw).context("MAILER_WEBHOOK_URL is invalid")?),
        None => None,
    };

    let verification = Verification {
        code_ttl_minutes: optional("VERIFICATION_CODE_TTL_MINUTES")
            .unwrap_or_else(|| "15".to_string())
            .parse()
            .context("VERIFICATION_CODE_TTL_MINUTES is invalid")?,
        mailer_webhook_url,
    };

    Ok(DotEnvyConfig {
        stage: get_stage(),
        server,
        database,
        user_secret,
        google,
        logo_storage,
        verification,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}

pub fn get_user_secret() -> Result<UserSecret> {
    dotenvy::dotenv().ok();

    Ok(UserSecret {
        secret: required("JWT_USER_SECRET")?,
        ttl_days: optional("JWT_USER_TTL_DAYS")
            .unwrap_or_else(|| "7".to_string())
            .parse()
            .context("JWT_USER_TTL_DAYS is invalid")?,
        cookie_name: optional("AUTH_COOKIE_NAME").unwrap_or_else(|| "auth_token".to_string()),
    })
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{} is invalid", key))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
