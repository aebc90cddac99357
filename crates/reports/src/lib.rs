//! `fleetdash-reports`: which reports a user may open, and how report data
//! is fetched.
//!
//! The aggregation behind the monthly endpoint runs server-side; this crate
//! only speaks its request/response contract.

pub mod category;
pub mod monthly;
pub mod navigation;

pub use category::{CategorySpec, REPORT_CATEGORIES, ReportCategory, visible_categories};
pub use monthly::{
    ClientError, MONTHLY_REPORT_PATH, MonthlyReport, MonthlyReportBody, MonthlyReportClient,
    MonthlyReportOutcome, MonthlyReportRequest,
};
pub use navigation::{EMPTY_STATE_MESSAGE, ReportTab, ReportTabs};
