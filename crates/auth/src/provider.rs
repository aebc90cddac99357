//! Seam between the dashboard and the hosted identity provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Session, SessionTokens, UserProfile};

/// Email/password pair for [`IdentityProvider::sign_in_with_password`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Attributes that can be changed on the signed-in user.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserUpdate {
    pub fn password(password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
        }
    }
}

impl core::fmt::Debug for UserUpdate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UserUpdate")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider answered and refused the call.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected provider response: {0}")]
    Parse(String),

    #[error("no active session")]
    NoSession,
}

impl ProviderError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Text suitable for a user-facing notification.
    pub fn message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Auth operations the dashboard needs from the provider.
///
/// Every call is a single async request; implementations must not retry.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait IdentityProvider {
    /// Adopt externally issued tokens (e.g. from a recovery link) as the
    /// current session.
    async fn set_session(&self, tokens: SessionTokens) -> Result<Session, ProviderError>;

    /// Update the signed-in user.
    async fn update_user(&self, update: UserUpdate) -> Result<(), ProviderError>;

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;
}

/// Source of [`UserProfile`] rows.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait ProfileSource {
    async fn fetch_profile(&self, session: &Session) -> Result<UserProfile, ProviderError>;
}
