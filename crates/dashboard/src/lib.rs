//! `fleetdash-dashboard`
//!
//! **Responsibility:** the dashboard's pages.
//!
//! Page logic lives in plain structs (`pages`, `multi_select`,
//! `notifications`) so it can be tested without a browser. The Leptos
//! frontend in `frontend` is a thin rendering layer over them and only builds
//! for `wasm32`.

pub mod config;
pub mod multi_select;
pub mod notifications;
pub mod pages;

#[cfg(target_arch = "wasm32")]
pub mod frontend;

pub use config::{ConfigError, DashboardConfig};
pub use multi_select::{MultiSelect, SelectOption};
pub use notifications::{Notice, NoticeLevel, Notifications};
pub use pages::{Dataset, ReportsPage, ReportsView, ResetPasswordPage};
