use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::application::usecases::authentication::{GoogleIdentity, GoogleIdentityGateway};

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Verifies Google ID tokens through the tokeninfo endpoint.
pub struct GoogleTokenInfoClient {
    http: Client,
    tokeninfo_url: Url,
    client_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BoolOrText {
    Bool(bool),
    Text(String),
}

impl BoolOrText {
    fn is_true(&self) -> bool {
        match self {
            BoolOrText::Bool(value) => *value,
            BoolOrText::Text(value) => value.eq_ignore_ascii_case("true"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    iss: String,
    sub: String,
    email: Option<String>,
    email_verified: Option<BoolOrText>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
}

impl GoogleTokenInfoClient {
    pub fn new(client_id: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .context("failed to build google http client")?;

        Ok(Self {
            http,
            tokeninfo_url: Url::parse(TOKENINFO_URL)?,
            client_id,
        })
    }
}

fn into_identity(token_info: TokenInfo, client_id: &str) -> Result<GoogleIdentity> {
    if token_info.aud != client_id {
        bail!("token audience does not match the configured client id");
    }
    if !GOOGLE_ISSUERS.contains(&token_info.iss.as_str()) {
        bail!("unexpected token issuer {}", token_info.iss);
    }
    let email = token_info
        .email
        .filter(|email| !email.is_empty())
        .context("token carries no email")?;

    Ok(GoogleIdentity {
        subject: token_info.sub,
        email,
        email_verified: token_info
            .email_verified
            .as_ref()
            .is_some_and(BoolOrText::is_true),
        given_name: token_info.given_name,
        family_name: token_info.family_name,
        picture: token_info.picture,
    })
}

#[async_trait]
impl GoogleIdentityGateway for GoogleTokenInfoClient {
    async fn verify_credential(&self, credential: String) -> Result<GoogleIdentity> {
        let response = self
            .http
            .get(self.tokeninfo_url.clone())
            .query(&[("id_token", credential.as_str())])
            .send()
            .await
            .context("tokeninfo request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("tokeninfo rejected the credential (status {})", status.as_u16());
        }

        let token_info = response
            .json::<TokenInfo>()
            .await
            .context("tokeninfo returned an unexpected body")?;

        into_identity(token_info, &self.client_id)
    }
}
