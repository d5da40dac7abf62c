use url::Url;

use super::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub stage: Stage,
    pub server: Server,
    pub database: Database,
    pub user_secret: UserSecret,
    pub google: Google,
    pub logo_storage: LogoStorage,
    pub verification: Verification,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
    pub allowed_origin: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct UserSecret {
    pub secret: String,
    pub ttl_days: i64,
    pub cookie_name: String,
}

#[derive(Debug, Clone)]
pub struct Google {
    pub client_id: String,
}

#[derive(Debug, Clone)]
pub struct LogoStorage {
    pub directory: String,
    pub public_base_url: String,
}

#[derive(Debug, Clone)]
pub struct Verification {
    pub code_ttl_minutes: i64,
    pub mailer_webhook_url: Option<Url>,
}
