//! Session state handed to every page.
//!
//! There is no ambient global: pages receive an [`AuthSession`] value (or a
//! reactive wrapper around one) from whoever owns sign-in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fleetdash_core::UserId;

use crate::{Credentials, IdentityProvider, ProfileSource, ProviderError, UserProfile};

/// Token pair as issued by the provider.
///
/// Kept in memory only; the provider's own client storage is the sole
/// persistence.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl SessionTokens {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Tokens from a recovery link, which carries no refresh token.
    pub fn access_only(access_token: impl Into<String>) -> Self {
        Self::new(access_token, "")
    }
}

impl core::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// The provider's view of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub tokens: SessionTokens,
    pub user: AuthUser,
    /// `None` when the provider did not say (e.g. adopted recovery tokens).
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn access_token(&self) -> &str {
        &self.tokens.access_token
    }

    /// Check the validity window at `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), SessionError> {
        match self.expires_at {
            Some(expires_at) if now >= expires_at => Err(SessionError::Expired),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("not signed in")]
    NotSignedIn,

    #[error("session has expired")]
    Expired,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Current identity: session tokens plus the profile loaded for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    session: Option<Session>,
    profile: Option<UserProfile>,
}

impl AuthSession {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn from_parts(session: Session, profile: UserProfile) -> Self {
        Self {
            session: Some(session),
            profile: Some(profile),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(Session::access_token)
    }

    /// Access token that is still inside its validity window at `now`.
    pub fn require_token(&self, now: DateTime<Utc>) -> Result<&str, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NotSignedIn)?;
        session.validate(now)?;
        Ok(session.access_token())
    }

    /// Sign in and load the profile for the new session.
    ///
    /// Any previous identity is dropped first, so a failed sign-in leaves the
    /// session signed out rather than holding the old user's profile. When the
    /// profile cannot be loaded the provider session is signed out as well.
    pub async fn sign_in<P>(
        &mut self,
        provider: &P,
        credentials: &Credentials,
    ) -> Result<&UserProfile, SessionError>
    where
        P: IdentityProvider + ProfileSource + ?Sized,
    {
        self.session = None;
        self.profile = None;

        let session = provider.sign_in_with_password(credentials).await?;
        let profile = match provider.fetch_profile(&session).await {
            Ok(profile) => profile,
            Err(e) => {
                // The provider already holds the new tokens; revoke them.
                if let Err(revoke) = provider.sign_out().await {
                    tracing::warn!(error = %revoke, "could not revoke session after profile load failed");
                }
                return Err(e.into());
            }
        };

        tracing::info!(
            user_id = %session.user.id,
            permissions = profile.permissions.len(),
            "signed in"
        );

        self.session = Some(session);
        Ok(&*self.profile.insert(profile))
    }

    /// Drop the local identity and tell the provider.
    ///
    /// The local state is cleared even when the provider call fails.
    pub async fn sign_out<P>(&mut self, provider: &P) -> Result<(), SessionError>
    where
        P: IdentityProvider + ?Sized,
    {
        let was_signed_in = self.session.take().is_some();
        self.profile = None;

        if !was_signed_in {
            return Ok(());
        }

        provider.sign_out().await.map_err(|e| {
            tracing::warn!(error = %e, "provider sign-out failed; local session cleared anyway");
            SessionError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Duration;

    use super::*;
    use crate::{Permission, UserUpdate};

    struct FakeProvider {
        accept_password: &'static str,
        permissions: Vec<&'static str>,
        has_profile: bool,
        sign_outs: Mutex<u32>,
    }

    impl FakeProvider {
        fn new(permissions: Vec<&'static str>) -> Self {
            Self {
                accept_password: "hunter2",
                permissions,
                has_profile: true,
                sign_outs: Mutex::new(0),
            }
        }
    }

    fn session_for(user_id: UserId, expires_at: Option<DateTime<Utc>>) -> Session {
        Session {
            tokens: SessionTokens::new("access", "refresh"),
            user: AuthUser {
                id: user_id,
                email: Some("ops@fleet.example".to_string()),
            },
            expires_at,
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn set_session(&self, _tokens: SessionTokens) -> Result<Session, ProviderError> {
            Err(ProviderError::NoSession)
        }

        async fn update_user(&self, _update: UserUpdate) -> Result<(), ProviderError> {
            Ok(())
        }

        async fn sign_in_with_password(
            &self,
            credentials: &Credentials,
        ) -> Result<Session, ProviderError> {
            if credentials.password == self.accept_password {
                Ok(session_for(UserId::new(), None))
            } else {
                Err(ProviderError::rejected(400, "Invalid login credentials"))
            }
        }

        async fn sign_out(&self) -> Result<(), ProviderError> {
            *self.sign_outs.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[async_trait]
    impl ProfileSource for FakeProvider {
        async fn fetch_profile(&self, session: &Session) -> Result<UserProfile, ProviderError> {
            if !self.has_profile {
                return Err(ProviderError::rejected(404, "profile not found"));
            }
            Ok(UserProfile::new(
                session.user.id,
                self.permissions.iter().copied().map(Permission::from_static),
            ))
        }
    }

    #[tokio::test]
    async fn sign_in_loads_profile_for_new_session() {
        let provider = FakeProvider::new(vec!["costing", "sla"]);
        let mut auth = AuthSession::signed_out();

        let profile = auth
            .sign_in(&provider, &Credentials::new("ops@fleet.example", "hunter2"))
            .await
            .unwrap();
        assert!(profile.has_permission("costing"));

        let session_user = auth.session().unwrap().user.id;
        assert_eq!(auth.profile().unwrap().id, session_user);
        assert_eq!(auth.access_token(), Some("access"));
    }

    #[tokio::test]
    async fn failed_sign_in_drops_previous_identity() {
        let provider = FakeProvider::new(vec!["rental"]);
        let mut auth = AuthSession::signed_out();
        auth.sign_in(&provider, &Credentials::new("a@b.c", "hunter2"))
            .await
            .unwrap();

        let err = auth
            .sign_in(&provider, &Credentials::new("a@b.c", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid login credentials");
        assert!(!auth.is_authenticated());
        assert!(auth.profile().is_none());
    }

    #[tokio::test]
    async fn missing_profile_revokes_provider_session() {
        let provider = FakeProvider {
            has_profile: false,
            ..FakeProvider::new(vec![])
        };
        let mut auth = AuthSession::signed_out();

        let err = auth
            .sign_in(&provider, &Credentials::new("a@b.c", "hunter2"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "profile not found");
        assert!(!auth.is_authenticated());
        assert_eq!(*provider.sign_outs.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn sign_out_clears_state_and_calls_provider_once() {
        let provider = FakeProvider::new(vec![]);
        let mut auth = AuthSession::signed_out();
        auth.sign_in(&provider, &Credentials::new("a@b.c", "hunter2"))
            .await
            .unwrap();

        auth.sign_out(&provider).await.unwrap();
        auth.sign_out(&provider).await.unwrap();

        assert!(!auth.is_authenticated());
        assert_eq!(*provider.sign_outs.lock().unwrap(), 1);
    }

    #[test]
    fn require_token_checks_expiry() {
        let now = Utc::now();
        let user_id = UserId::new();
        let profile = UserProfile::new(user_id, []);

        let live = AuthSession::from_parts(
            session_for(user_id, Some(now + Duration::minutes(5))),
            profile.clone(),
        );
        assert_eq!(live.require_token(now), Ok("access"));

        let stale = AuthSession::from_parts(session_for(user_id, Some(now)), profile);
        assert_eq!(stale.require_token(now), Err(SessionError::Expired));

        assert_eq!(
            AuthSession::signed_out().require_token(now),
            Err(SessionError::NotSignedIn)
        );
    }
}
