//! Service-account authentication: a signed JWT is exchanged for a
//! short-lived bearer token (OAuth2 JWT-bearer grant).

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::FetchError;

/// Read access to spreadsheets and documents is all the matcher needs, but
/// the credential is provisioned with these two scopes.
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/documents",
];

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The subset of a service-account key file we use.
#[derive(Debug, Deserialize)]
struct ServiceAccountKeyFile {
    client_email: String,
    private_key: String,
    #[serde(default)]
    token_uri: Option<String>,
}

/// A parsed, ready-to-sign service-account credential.
#[derive(Clone)]
pub struct ServiceAccount {
    pub client_email: String,
    pub token_uri: String,
    key: EncodingKey,
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ServiceAccount {
    /// Loads the key file at startup. Fails if the file is missing, is not a
    /// service-account key, or carries an unusable private key.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read service account file '{}'", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Invalid service account file '{}'", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let file: ServiceAccountKeyFile =
            serde_json::from_str(raw).context("Malformed service account JSON")?;
        let key = EncodingKey::from_rsa_pem(file.private_key.as_bytes())
            .context("Service account private_key is not an RSA PEM key")?;

        Ok(Self {
            client_email: file.client_email,
            token_uri: file
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            key,
        })
    }

    fn claims(&self, issued_at: i64) -> Claims<'_> {
        Claims {
            iss: &self.client_email,
            scope: SCOPES.join(" "),
            aud: &self.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        }
    }

    /// Signs a fresh assertion and exchanges it for an access token.
    pub async fn access_token(&self, http: &Client) -> Result<String, FetchError> {
        let claims = self.claims(Utc::now().timestamp());
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| FetchError::Auth(format!("cannot sign assertion: {e}")))?;

        let response = http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Auth(format!("unreadable token response: {e}")))?;

        debug!("Obtained access token for {}", self.client_email);
        Ok(token.access_token)
    }
}
