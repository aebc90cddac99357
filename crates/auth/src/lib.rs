//! `fleetdash-auth`: identity for the fleet dashboard.
//!
//! Identity itself is delegated to a hosted provider; this crate holds the
//! session/profile values the rest of the app reads, the provider seam, and
//! the password-reset page flow.

pub mod gotrue;
pub mod password_reset;
pub mod permissions;
pub mod profile;
pub mod provider;
pub mod session;

pub use gotrue::{HttpIdentityProvider, ProviderConfig};
pub use password_reset::{PasswordReset, ResetError, ResetState, SubmitOutcome};
pub use permissions::Permission;
pub use profile::UserProfile;
pub use provider::{Credentials, IdentityProvider, ProfileSource, ProviderError, UserUpdate};
pub use session::{AuthSession, AuthUser, Session, SessionError, SessionTokens};
