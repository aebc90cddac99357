//! Page controllers: everything a page does except drawing it.

use chrono::{DateTime, Utc};
use serde_json::Value;

use fleetdash_auth::{AuthSession, IdentityProvider, PasswordReset, ResetState, SubmitOutcome};
use fleetdash_core::DomainResult;
use fleetdash_reports::{
    EMPTY_STATE_MESSAGE, MonthlyReport, ReportCategory, ReportTab, ReportTabs,
};

use crate::Notifications;

pub const RESET_SUCCESS_MESSAGE: &str = "Password updated. Please sign in with your new password.";

// ─────────────────────────────────────────────────────────────────────────────
// Reset password
// ─────────────────────────────────────────────────────────────────────────────

/// `/reset-password`: the reset flow plus its notifications.
#[derive(Debug, Clone, Default)]
pub struct ResetPasswordPage {
    flow: PasswordReset,
    pub notifications: Notifications,
}

impl ResetPasswordPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ResetState {
        self.flow.state()
    }

    /// The form renders once the mount step has finished.
    pub fn shows_form(&self) -> bool {
        matches!(self.state(), ResetState::Ready | ResetState::Submitting)
    }

    pub fn submit_disabled(&self) -> bool {
        self.state() != ResetState::Ready
    }

    pub async fn mount<P>(&mut self, provider: &P, page_url: &str) -> ResetState
    where
        P: IdentityProvider + ?Sized,
    {
        self.flow.start(provider, page_url).await
    }

    /// Disable the form for a submit. `false` when the click must be ignored
    /// (not ready, or a submit is already in flight).
    pub fn begin_submit(&mut self) -> bool {
        match self.flow.begin_submit() {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "ignored submit");
                false
            }
        }
    }

    /// Finish a submit started with [`Self::begin_submit`]. Returns the route
    /// to navigate to, if any.
    pub async fn finish_submit<P>(&mut self, provider: &P, password: &str, now: DateTime<Utc>) -> Option<&'static str>
    where
        P: IdentityProvider + ?Sized,
    {
        match self.flow.finish_submit(provider, password).await {
            Ok(SubmitOutcome::Completed { redirect_to }) => {
                self.notifications.success(RESET_SUCCESS_MESSAGE, now);
                Some(redirect_to)
            }
            Ok(SubmitOutcome::Failed { message }) => {
                self.notifications.error(message, now);
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "ignored submit");
                None
            }
        }
    }

    /// Submit the form. Returns the route to navigate to, if any.
    pub async fn submit<P>(&mut self, provider: &P, password: &str, now: DateTime<Utc>) -> Option<&'static str>
    where
        P: IdentityProvider + ?Sized,
    {
        if !self.begin_submit() {
            return None;
        }
        self.finish_submit(provider, password, now).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reports
// ─────────────────────────────────────────────────────────────────────────────

/// What the reports page renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportsView {
    /// No tab is allowed; show `message` instead of the tab bar.
    Empty { message: &'static str },
    Tabs {
        tabs: Vec<ReportTab>,
        active: Option<ReportCategory>,
    },
}

/// `/reports`: gated tab bar over the per-category report views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportsPage {
    tabs: ReportTabs,
}

impl ReportsPage {
    pub fn new(session: &AuthSession) -> Self {
        Self {
            tabs: ReportTabs::new(session.profile()),
        }
    }

    pub fn view(&self) -> ReportsView {
        if self.tabs.is_empty() {
            return ReportsView::Empty {
                message: EMPTY_STATE_MESSAGE,
            };
        }
        ReportsView::Tabs {
            tabs: self.tabs.tabs(),
            active: self.tabs.active(),
        }
    }

    pub fn active(&self) -> Option<ReportCategory> {
        self.tabs.active()
    }

    pub fn select(&mut self, category: ReportCategory) -> DomainResult<()> {
        self.tabs.select(category)
    }

    /// Re-gate after sign-in/sign-out.
    pub fn refresh(&mut self, session: &AuthSession) {
        self.tabs.refresh(session.profile());
    }
}

/// Dataset of the monthly report a category view displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Costing,
    Rental,
    Sla,
}

impl Dataset {
    /// `None` for categories served by their own endpoints.
    pub fn for_category(category: ReportCategory) -> Option<Self> {
        match category {
            ReportCategory::Costing => Some(Self::Costing),
            ReportCategory::Rental => Some(Self::Rental),
            ReportCategory::Sla => Some(Self::Sla),
            ReportCategory::Vehicles | ReportCategory::Workshop => None,
        }
    }

    pub fn rows(self, report: &MonthlyReport) -> &[Value] {
        match self {
            Self::Costing => &report.costing,
            Self::Rental => &report.rental,
            Self::Sla => &report.sla,
        }
    }
}

/// Column names for a table of opaque rows: keys of the first row, in order.
pub fn columns(rows: &[Value]) -> Vec<String> {
    rows.first()
        .and_then(Value::as_object)
        .map(|fields| fields.keys().cloned().collect())
        .unwrap_or_default()
}

/// Cell text for `column` in `row`; strings are shown without quotes.
pub fn cell(row: &Value, column: &str) -> String {
    match row.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use fleetdash_auth::{
        AuthUser, Credentials, Permission, ProviderError, Session, SessionTokens, UserProfile,
        UserUpdate,
    };
    use fleetdash_core::UserId;

    #[derive(Default)]
    struct StubProvider {
        fail_with: Option<&'static str>,
        updates: Mutex<u32>,
    }

    #[async_trait]
    impl IdentityProvider for StubProvider {
        async fn set_session(&self, tokens: SessionTokens) -> Result<Session, ProviderError> {
            Ok(Session {
                tokens,
                user: AuthUser {
                    id: UserId::new(),
                    email: None,
                },
                expires_at: None,
            })
        }

        async fn update_user(&self, _update: UserUpdate) -> Result<(), ProviderError> {
            *self.updates.lock().unwrap() += 1;
            match self.fail_with {
                Some(msg) => Err(ProviderError::rejected(422, msg)),
                None => Ok(()),
            }
        }

        async fn sign_in_with_password(&self, _c: &Credentials) -> Result<Session, ProviderError> {
            Err(ProviderError::NoSession)
        }

        async fn sign_out(&self) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    fn session_with(keys: &[&'static str]) -> AuthSession {
        let user_id = UserId::new();
        AuthSession::from_parts(
            Session {
                tokens: SessionTokens::new("a", "r"),
                user: AuthUser {
                    id: user_id,
                    email: None,
                },
                expires_at: None,
            },
            UserProfile::new(user_id, keys.iter().copied().map(Permission::from_static)),
        )
    }

    #[tokio::test]
    async fn reset_failure_shows_error_and_keeps_form() {
        let provider = StubProvider {
            fail_with: Some("New password should be different from the old password."),
            ..Default::default()
        };
        let mut page = ResetPasswordPage::new();
        assert!(!page.shows_form());

        page.mount(&provider, "https://dash.example/reset-password").await;
        assert!(page.shows_form());
        assert!(!page.submit_disabled());

        let nav = page.submit(&provider, "same-as-before", Utc::now()).await;
        assert_eq!(nav, None);
        assert!(page.shows_form());
        let notice = page.notifications.last().unwrap();
        assert_eq!(notice.level, crate::NoticeLevel::Error);
        assert_eq!(notice.message, "New password should be different from the old password.");
    }

    #[tokio::test]
    async fn reset_success_navigates_to_login() {
        let provider = StubProvider::default();
        let mut page = ResetPasswordPage::new();
        page.mount(&provider, "https://dash.example/reset-password?access_token=T")
            .await;

        let nav = page.submit(&provider, "brand-new", Utc::now()).await;
        assert_eq!(nav, Some("/login"));
        assert_eq!(page.notifications.last().unwrap().message, RESET_SUCCESS_MESSAGE);
        assert!(page.submit_disabled());

        // Terminal: further submits do nothing.
        assert_eq!(page.submit(&provider, "again", Utc::now()).await, None);
        assert_eq!(*provider.updates.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn form_locks_while_a_submit_is_in_flight() {
        let provider = StubProvider::default();
        let mut page = ResetPasswordPage::new();
        page.mount(&provider, "https://dash.example/reset-password").await;

        assert!(page.begin_submit());
        assert!(page.shows_form());
        assert!(page.submit_disabled());

        // A second click while the first is pending goes nowhere.
        assert!(!page.begin_submit());
        assert_eq!(page.submit(&provider, "again", Utc::now()).await, None);
        assert_eq!(*provider.updates.lock().unwrap(), 0);

        let nav = page.finish_submit(&provider, "brand-new", Utc::now()).await;
        assert_eq!(nav, Some("/login"));
        assert_eq!(*provider.updates.lock().unwrap(), 1);
    }

    #[test]
    fn reports_page_renders_empty_state_without_permissions() {
        let page = ReportsPage::new(&session_with(&[]));
        assert_eq!(
            page.view(),
            ReportsView::Empty {
                message: EMPTY_STATE_MESSAGE
            }
        );

        let signed_out = ReportsPage::new(&AuthSession::signed_out());
        assert!(matches!(signed_out.view(), ReportsView::Empty { .. }));
    }

    #[test]
    fn reports_page_lists_allowed_tabs_in_order() {
        let mut page = ReportsPage::new(&session_with(&["sla", "costing"]));

        let ReportsView::Tabs { tabs, active } = page.view() else {
            panic!("expected tabs");
        };
        let labels: Vec<_> = tabs.iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["Costing", "SLA"]);
        assert_eq!(active, Some(ReportCategory::Costing));

        page.select(ReportCategory::Sla).unwrap();
        assert_eq!(page.active(), Some(ReportCategory::Sla));
        assert!(page.select(ReportCategory::Vehicles).is_err());

        page.refresh(&AuthSession::signed_out());
        assert!(matches!(page.view(), ReportsView::Empty { .. }));
    }

    #[test]
    fn datasets_and_table_helpers() {
        let report = MonthlyReport {
            costing: vec![json!({ "vehicle": "KX-101", "total": 12.5, "note": null })],
            rental: vec![],
            sla: vec![],
        };

        let rows = Dataset::for_category(ReportCategory::Costing).unwrap().rows(&report);
        assert_eq!(rows.len(), 1);
        assert_eq!(Dataset::for_category(ReportCategory::Workshop), None);

        let cols = columns(rows);
        assert!(cols.contains(&"vehicle".to_string()));
        assert_eq!(cell(&rows[0], "vehicle"), "KX-101");
        assert_eq!(cell(&rows[0], "total"), "12.5");
        assert_eq!(cell(&rows[0], "note"), "");
        assert_eq!(cell(&rows[0], "missing"), "");
        assert!(columns(Dataset::Rental.rows(&report)).is_empty());
    }
}
