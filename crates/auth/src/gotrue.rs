//! HTTP identity provider for a GoTrue-compatible auth service.
//!
//! Also reads the `profiles` table through the provider's REST endpoint,
//! which is where report permissions live.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    AuthUser, Credentials, IdentityProvider, ProfileSource, ProviderError, Session, SessionTokens,
    UserProfile, UserUpdate,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection settings for the hosted provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Public (anon) API key sent as the `apikey` header.
    pub anon_key: String,
    /// Per-request timeout. Ignored in the browser build.
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Provider client holding the current session in memory.
pub struct HttpIdentityProvider {
    config: ProviderConfig,
    client: reqwest::Client,
    session: RwLock<Option<Session>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    user: AuthUser,
}

impl HttpIdentityProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.timeout);

        let client = builder
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            session: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Session most recently established through this provider.
    pub fn current_session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_session(&self, session: Option<Session>) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("apikey", &self.config.anon_key)
    }

    async fn fetch_user(&self, access_token: &str) -> Result<AuthUser, ProviderError> {
        let resp = self
            .request(reqwest::Method::GET, "/auth/v1/user")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network)?;

        let resp = ensure_success(resp).await?;
        resp.json().await.map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl IdentityProvider for HttpIdentityProvider {
    async fn set_session(&self, tokens: SessionTokens) -> Result<Session, ProviderError> {
        let user = self.fetch_user(&tokens.access_token).await?;
        let session = Session {
            tokens,
            user,
            expires_at: None,
        };

        tracing::debug!(user_id = %session.user.id, "session adopted");
        self.store_session(Some(session.clone()));
        Ok(session)
    }

    async fn update_user(&self, update: UserUpdate) -> Result<(), ProviderError> {
        let session = self.current_session().ok_or(ProviderError::NoSession)?;

        let resp = self
            .request(reqwest::Method::PUT, "/auth/v1/user")
            .bearer_auth(session.access_token())
            .json(&update)
            .send()
            .await
            .map_err(network)?;

        ensure_success(resp).await?;
        tracing::info!(user_id = %session.user.id, "user updated");
        Ok(())
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, ProviderError> {
        let resp = self
            .request(reqwest::Method::POST, "/auth/v1/token?grant_type=password")
            .json(credentials)
            .send()
            .await
            .map_err(network)?;

        let resp = ensure_success(resp).await?;
        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let session = Session {
            tokens: SessionTokens::new(body.access_token, body.refresh_token),
            user: body.user,
            expires_at: body
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        };

        self.store_session(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let Some(session) = self.current_session() else {
            return Ok(());
        };
        self.store_session(None);

        let resp = self
            .request(reqwest::Method::POST, "/auth/v1/logout")
            .bearer_auth(session.access_token())
            .send()
            .await
            .map_err(network)?;

        ensure_success(resp).await?;
        Ok(())
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ProfileSource for HttpIdentityProvider {
    async fn fetch_profile(&self, session: &Session) -> Result<UserProfile, ProviderError> {
        let path = format!("/rest/v1/profiles?id=eq.{}&select=*", session.user.id);
        let resp = self
            .request(reqwest::Method::GET, &path)
            .bearer_auth(session.access_token())
            .send()
            .await
            .map_err(network)?;

        let resp = ensure_success(resp).await?;
        let rows: Vec<UserProfile> = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let profile = rows
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::rejected(404, "profile not found"))?;

        // Profile rows may omit the email the auth user already carries.
        Ok(match &session.user.email {
            Some(email) if profile.email.is_none() => profile.with_email(email),
            _ => profile,
        })
    }
}

fn network(err: reqwest::Error) -> ProviderError {
    ProviderError::Network(err.to_string())
}

/// Pass successful responses through; turn everything else into
/// [`ProviderError::Rejected`] carrying the provider's own message.
async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(ProviderError::rejected(status.as_u16(), error_message(status, &body)))
}

/// GoTrue and PostgREST disagree on the field name for the error text.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(Value::String(message)) = fields.get(key) {
                return message.clone();
            }
        }
    }

    if !body.trim().is_empty() {
        return body.trim().to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
