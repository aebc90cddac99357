//! Profile of the signed-in user.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use fleetdash_core::UserId;

use crate::Permission;

/// Row from the provider's `profiles` table.
///
/// Loaded once per sign-in and never mutated afterwards; a new sign-in
/// replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub full_name: Option<String>,

    /// Report permission keys. A `null` column reads as an empty set.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub permissions: BTreeSet<Permission>,
}

impl UserProfile {
    pub fn new(id: UserId, permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            id,
            email: None,
            full_name: None,
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn has_permission(&self, key: &str) -> bool {
        self.permissions.iter().any(|p| p.as_str() == key)
    }

    /// Name to greet the user with: full name, else email, else the id.
    pub fn display_name(&self) -> String {
        self.full_name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeSet<Permission>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeSet<Permission>>::deserialize(deserializer)?.unwrap_or_default())
}
