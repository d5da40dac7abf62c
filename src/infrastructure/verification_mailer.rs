use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::application::usecases::authentication::VerificationMailer;

/// Delivers verification codes to a mail relay webhook. Without a webhook the
/// code is only written to the log, which is enough for local development.
pub struct WebhookVerificationMailer {
    http: Client,
    webhook_url: Option<Url>,
    code_ttl_minutes: i64,
}

#[derive(Debug, Serialize, PartialEq)]
struct MailMessage {
    to: String,
    subject: String,
    text: String,
}

impl WebhookVerificationMailer {
    pub fn new(webhook_url: Option<Url>, code_ttl_minutes: i64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .context("failed to build mailer http client")?;

        Ok(Self {
            http,
            webhook_url,
            code_ttl_minutes,
        })
    }

    fn message(&self, email: String, first_name: &str, code: &str) -> MailMessage {
        MailMessage {
            to: email,
            subject: "Your verification code".to_string(),
            text: format!(
                "Hi {},\n\nYour verification code is {}. It expires in {} minutes.",
                first_name, code, self.code_ttl_minutes
            ),
        }
    }
}

#[async_trait]
impl VerificationMailer for WebhookVerificationMailer {
    async fn send_verification_code(
        &self,
        email: String,
        first_name: String,
        code: String,
    ) -> Result<()> {
        let Some(webhook_url) = self.webhook_url.clone() else {
            warn!(%email, %code, "mailer: no webhook configured, verification code logged only");
            return Ok(());
        };

        let message = self.message(email, &first_name, &code);
        let response = self
            .http
            .post(webhook_url)
            .json(&message)
            .send()
            .await
            .context("mailer webhook request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("mailer webhook answered with status {}", status.as_u16());
        }

        info!(to = %message.to, "mailer: verification code sent");
        Ok(())
    }
}
