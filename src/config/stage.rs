use std::fmt::Display;

use anyhow::{Result, bail};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Local,
    Development,
    Staging,
    Production,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self {
            Stage::Local => "local",
            Stage::Development => "development",
            Stage::Staging => "staging",
            Stage::Production => "production",
        };
        write!(f, "{}", stage)
    }
}

impl TryFrom<&String> for Stage {
    type Error = anyhow::Error;

    fn try_from(value: &String) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Stage::Local),
            "development" | "dev" => Ok(Stage::Development),
            "staging" => Ok(Stage::Staging),
            "production" | "prod" => Ok(Stage::Production),
            other => bail!("Unknown stage: {}", other),
        }
    }
}

impl Stage {
    /// Auth cookies are only marked `Secure` outside local runs.
    pub fn secure_cookies(&self) -> bool {
        !matches!(self, Stage::Local)
    }
}
