//! IAM bearer-token authentication

use chrono::Utc;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{CloudError, Result};

/// Default IAM token endpoint
pub const DEFAULT_IAM_ENDPOINT: &str = "https://iam.cloud.ibm.com/identity/token";

/// Tokens are refreshed this many seconds before they expire
const REFRESH_MARGIN_SECONDS: i64 = 60;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Unix timestamp
    expiration: i64,
}

struct CachedToken {
    access_token: String,
    expiration: i64,
}

/// Exchanges an API key for short-lived bearer tokens
pub struct IamAuthenticator {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    token: Mutex<Option<CachedToken>>,
}

impl IamAuthenticator {
    /// Create an authenticator for an API key
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            token: Mutex::new(None),
        }
    }

    /// Create an authenticator from an API key stored in a Kubernetes secret
    pub async fn from_secret(
        client: Client,
        namespace: &str,
        name: &str,
        key: &str,
        endpoint: impl Into<String>,
    ) -> Result<Self> {
        let secrets: Api<Secret> = Api::namespaced(client, namespace);
        let secret = secrets.get(name).await?;

        let api_key = secret
            .data
            .as_ref()
            .and_then(|data| data.get(key))
            .map(|value| String::from_utf8_lossy(&value.0).trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                CloudError::Auth(format!("secret {}/{} has no key {}", namespace, name, key))
            })?;

        Ok(Self::new(api_key, endpoint))
    }

    /// Current bearer token, refreshed when close to expiry
    pub async fn token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expiration - REFRESH_MARGIN_SECONDS > Utc::now().timestamp() {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Requesting IAM token from {}", self.endpoint);
        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CloudError::Auth(format!(
                "token request failed ({}): {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expiration: token.expiration,
        });

        Ok(access_token)
    }
}
