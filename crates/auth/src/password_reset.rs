//! Password-reset page flow.
//!
//! ```text
//! Start ──(token in URL)──▶ Verifying ──(ok or error)──┐
//!   │                                                   ▼
//!   └──────────(no token)─────────────────────────▶ Ready ◀──(update failed)──┐
//!                                                     │                        │
//!                                                     └──(submit)──▶ Submitting┤
//!                                                                              ▼
//!                                                                         Completed
//! ```
//!
//! A failed token check does not block the form: the user still gets to try
//! the update, and the provider decides.

use thiserror::Error;

use crate::{IdentityProvider, SessionTokens, UserUpdate};

/// Query parameter carrying the recovery access token.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Route the page navigates to after a successful reset.
pub const LOGIN_ROUTE: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetState {
    Start,
    Verifying,
    Ready,
    Submitting,
    Completed,
}

/// Result of a submit that reached the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Show `message` and leave the form usable.
    Failed { message: String },
    /// Show a success notice and navigate to `redirect_to`.
    Completed { redirect_to: &'static str },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResetError {
    #[error("password form is not accepting input (state: {0:?})")]
    NotReady(ResetState),
}

/// Extract a non-empty `access_token` query parameter from a page URL.
pub fn access_token_from_url(page_url: &str) -> Option<String> {
    let url = reqwest::Url::parse(page_url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == ACCESS_TOKEN_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
}

#[derive(Debug, Clone)]
pub struct PasswordReset {
    state: ResetState,
    token_verified: Option<bool>,
}

impl Default for PasswordReset {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordReset {
    pub fn new() -> Self {
        Self {
            state: ResetState::Start,
            token_verified: None,
        }
    }

    pub fn state(&self) -> ResetState {
        self.state
    }

    /// `None` when no token was present, otherwise whether the provider
    /// accepted it.
    pub fn token_verified(&self) -> Option<bool> {
        self.token_verified
    }

    pub fn is_submitting(&self) -> bool {
        self.state == ResetState::Submitting
    }

    /// Run the mount step for `page_url` and move to [`ResetState::Ready`].
    pub async fn start<P>(&mut self, provider: &P, page_url: &str) -> ResetState
    where
        P: IdentityProvider + ?Sized,
    {
        if self.state != ResetState::Start {
            return self.state;
        }

        if let Some(token) = access_token_from_url(page_url) {
            self.state = ResetState::Verifying;

            match provider.set_session(SessionTokens::access_only(token)).await {
                Ok(session) => {
                    tracing::info!(user_id = %session.user.id, "recovery session established");
                    self.token_verified = Some(true);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "recovery token rejected; showing reset form anyway");
                    self.token_verified = Some(false);
                }
            }
        }

        self.state = ResetState::Ready;
        self.state
    }

    /// Lock the form for a submit: `Ready` moves to `Submitting`.
    ///
    /// Any other state, including an in-flight submit, is refused.
    pub fn begin_submit(&mut self) -> Result<(), ResetError> {
        if self.state != ResetState::Ready {
            return Err(ResetError::NotReady(self.state));
        }
        self.state = ResetState::Submitting;
        Ok(())
    }

    /// Send `password` for a submit started with [`Self::begin_submit`].
    pub async fn finish_submit<P>(&mut self, provider: &P, password: &str) -> Result<SubmitOutcome, ResetError>
    where
        P: IdentityProvider + ?Sized,
    {
        if !self.is_submitting() {
            return Err(ResetError::NotReady(self.state));
        }

        match provider.update_user(UserUpdate::password(password)).await {
            Ok(()) => {
                self.state = ResetState::Completed;
                Ok(SubmitOutcome::Completed {
                    redirect_to: LOGIN_ROUTE,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "password update failed");
                self.state = ResetState::Ready;
                Ok(SubmitOutcome::Failed { message: e.message() })
            }
        }
    }

    /// Submit `password`. Only valid while [`ResetState::Ready`].
    pub async fn submit<P>(&mut self, provider: &P, password: &str) -> Result<SubmitOutcome, ResetError>
    where
        P: IdentityProvider + ?Sized,
    {
        self.begin_submit()?;
        self.finish_submit(provider, password).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{AuthUser, Credentials, ProviderError, Session};
    use fleetdash_core::UserId;

    #[derive(Default)]
    struct RecordingProvider {
        reject_token: bool,
        reject_update: Option<&'static str>,
        set_session_calls: Mutex<Vec<SessionTokens>>,
        update_calls: Mutex<Vec<UserUpdate>>,
    }

    #[async_trait]
    impl IdentityProvider for RecordingProvider {
        async fn set_session(&self, tokens: SessionTokens) -> Result<Session, ProviderError> {
            self.set_session_calls.lock().unwrap().push(tokens.clone());
            if self.reject_token {
                return Err(ProviderError::rejected(401, "invalid JWT"));
            }
            Ok(Session {
                tokens,
                user: AuthUser {
                    id: UserId::new(),
                    email: None,
                },
                expires_at: None,
            })
        }

        async fn update_user(&self, update: UserUpdate) -> Result<(), ProviderError> {
            self.update_calls.lock().unwrap().push(update);
            match self.reject_update {
                Some(message) => Err(ProviderError::rejected(422, message)),
                None => Ok(()),
            }
        }

        async fn sign_in_with_password(&self, _c: &Credentials) -> Result<Session, ProviderError> {
            unreachable!("reset flow never signs in")
        }

        async fn sign_out(&self) -> Result<(), ProviderError> {
            unreachable!("reset flow never signs out")
        }
    }

    #[test]
    fn token_is_read_from_query_only_when_non_empty() {
        assert_eq!(
            access_token_from_url("https://dash.example/reset-password?access_token=T&type=recovery"),
            Some("T".to_string())
        );
        assert_eq!(access_token_from_url("https://dash.example/reset-password?access_token="), None);
        assert_eq!(access_token_from_url("https://dash.example/reset-password"), None);
        assert_eq!(access_token_from_url("not a url"), None);
    }

    #[tokio::test]
    async fn token_in_url_establishes_session_with_empty_refresh() {
        let provider = RecordingProvider::default();
        let mut flow = PasswordReset::new();

        let state = flow
            .start(&provider, "https://dash.example/reset-password?access_token=T")
            .await;

        assert_eq!(state, ResetState::Ready);
        assert_eq!(flow.token_verified(), Some(true));
        let calls = provider.set_session_calls.lock().unwrap();
        assert_eq!(*calls, vec![SessionTokens::new("T", "")]);
    }

    #[tokio::test]
    async fn missing_token_skips_provider() {
        let provider = RecordingProvider::default();
        let mut flow = PasswordReset::new();

        let state = flow.start(&provider, "https://dash.example/reset-password").await;

        assert_eq!(state, ResetState::Ready);
        assert_eq!(flow.token_verified(), None);
        assert!(provider.set_session_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_token_still_reaches_ready() {
        let provider = RecordingProvider {
            reject_token: true,
            ..Default::default()
        };
        let mut flow = PasswordReset::new();

        let state = flow
            .start(&provider, "https://dash.example/reset-password?access_token=stale")
            .await;

        assert_eq!(state, ResetState::Ready);
        assert_eq!(flow.token_verified(), Some(false));
    }

    #[tokio::test]
    async fn submit_before_start_is_rejected() {
        let provider = RecordingProvider::default();
        let mut flow = PasswordReset::new();

        let err = flow.submit(&provider, "new-secret").await.unwrap_err();
        assert_eq!(err, ResetError::NotReady(ResetState::Start));
        assert!(provider.update_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_submit_while_in_flight_is_rejected() {
        let provider = RecordingProvider::default();
        let mut flow = PasswordReset::new();
        flow.start(&provider, "https://dash.example/reset-password").await;

        flow.begin_submit().unwrap();
        assert!(flow.is_submitting());
        assert_eq!(flow.begin_submit(), Err(ResetError::NotReady(ResetState::Submitting)));

        let err = flow.submit(&provider, "double-click").await.unwrap_err();
        assert_eq!(err, ResetError::NotReady(ResetState::Submitting));
        assert!(provider.update_calls.lock().unwrap().is_empty());

        flow.finish_submit(&provider, "n3w-secret").await.unwrap();
        assert_eq!(flow.state(), ResetState::Completed);
        assert_eq!(provider.update_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn finish_without_begin_is_rejected() {
        let provider = RecordingProvider::default();
        let mut flow = PasswordReset::new();
        flow.start(&provider, "https://dash.example/reset-password").await;

        let err = flow.finish_submit(&provider, "n3w-secret").await.unwrap_err();
        assert_eq!(err, ResetError::NotReady(ResetState::Ready));
        assert!(provider.update_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_update_returns_to_ready_with_provider_message() {
        let provider = RecordingProvider {
            reject_update: Some("Password should be at least 6 characters"),
            ..Default::default()
        };
        let mut flow = PasswordReset::new();
        flow.start(&provider, "https://dash.example/reset-password").await;

        let outcome = flow.submit(&provider, "abc").await.unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Failed {
                message: "Password should be at least 6 characters".to_string()
            }
        );
        assert_eq!(flow.state(), ResetState::Ready);

        // Still usable: a second attempt reaches the provider again.
        flow.submit(&provider, "abcdef").await.unwrap();
        assert_eq!(provider.update_calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn successful_update_completes_and_redirects_to_login() {
        let provider = RecordingProvider::default();
        let mut flow = PasswordReset::new();
        flow.start(&provider, "https://dash.example/reset-password?access_token=T")
            .await;

        let outcome = flow.submit(&provider, "n3w-secret").await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Completed { redirect_to: LOGIN_ROUTE });
        assert_eq!(flow.state(), ResetState::Completed);
        assert_eq!(
            provider.update_calls.lock().unwrap()[0],
            UserUpdate::password("n3w-secret")
        );

        let err = flow.submit(&provider, "again").await.unwrap_err();
        assert_eq!(err, ResetError::NotReady(ResetState::Completed));
    }
}
