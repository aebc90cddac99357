//! Transient notifications ("toasts").

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

const DEFAULT_TTL_SECS: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

/// Queue of visible notices, oldest first.
#[derive(Debug, Clone)]
pub struct Notifications {
    next_id: u64,
    ttl: Duration,
    items: Vec<Notice>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_TTL_SECS))
    }
}

impl Notifications {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            next_id: 1,
            ttl,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>, now: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Notice {
            id,
            level,
            message: message.into(),
            expires_at: now + self.ttl,
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> u64 {
        self.push(NoticeLevel::Success, message, now)
    }

    pub fn error(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> u64 {
        self.push(NoticeLevel::Error, message, now)
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|n| n.id != id);
    }

    /// Drop notices whose lifetime ended at or before `now`.
    pub fn expire(&mut self, now: DateTime<Utc>) {
        self.items.retain(|n| n.expires_at > now);
    }

    pub fn active(&self) -> &[Notice] {
        &self.items
    }

    pub fn last(&self) -> Option<&Notice> {
        self.items.last()
    }

    /// Remove and return every notice, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        core::mem::take(&mut self.items)
    }
}
