//! Tab state for the reports page.
//!
//! Selecting a tab is local state only. Report views fetch their own data
//! when they mount; nothing here performs IO.

use fleetdash_auth::UserProfile;
use fleetdash_core::{DomainError, DomainResult};

use crate::{ReportCategory, visible_categories};

/// Shown in place of the tab bar when the profile grants no report.
pub const EMPTY_STATE_MESSAGE: &str = "No reports are available for your account.";

/// Render data for a single tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportTab {
    pub category: ReportCategory,
    pub label: &'static str,
    pub active: bool,
}

/// Visible report tabs plus the active one.
///
/// `active` is always either `None` or a member of `visible`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTabs {
    visible: Vec<ReportCategory>,
    active: Option<ReportCategory>,
}

impl ReportTabs {
    /// Gate the category table on `profile` and activate the first tab.
    pub fn new(profile: Option<&UserProfile>) -> Self {
        let visible = visible_categories(profile);
        let active = visible.first().copied();
        Self { visible, active }
    }

    pub fn visible(&self) -> &[ReportCategory] {
        &self.visible
    }

    pub fn active(&self) -> Option<ReportCategory> {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn is_active(&self, category: ReportCategory) -> bool {
        self.active == Some(category)
    }

    pub fn tabs(&self) -> Vec<ReportTab> {
        self.visible
            .iter()
            .map(|&category| ReportTab {
                category,
                label: category.label(),
                active: self.is_active(category),
            })
            .collect()
    }

    /// Make `category` the active tab.
    pub fn select(&mut self, category: ReportCategory) -> DomainResult<()> {
        if !self.visible.contains(&category) {
            return Err(DomainError::forbidden(category.permission_key()));
        }
        self.active = Some(category);
        Ok(())
    }

    /// Re-gate after the profile changed (e.g. a different user signed in).
    ///
    /// Keeps the active tab when it is still visible, otherwise falls back to
    /// the first visible tab.
    pub fn refresh(&mut self, profile: Option<&UserProfile>) {
        let previous = self.active;
        *self = Self::new(profile);
        if let Some(previous) = previous.filter(|c| self.visible.contains(c)) {
            self.active = Some(previous);
        }
    }
}
