//! Client for the authenticated monthly report endpoint.
//!
//! One request, one answer. The client never retries; callers that want to
//! try again call again.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use fleetdash_core::{DomainError, DomainResult, dates};

pub const MONTHLY_REPORT_PATH: &str = "/api/reports-monthly";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReportRequest {
    pub year: i32,
    pub month: u32,
}

impl MonthlyReportRequest {
    pub fn new(year: i32, month: u32) -> DomainResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// First and last calendar day covered by the request.
    pub fn period(&self) -> DomainResult<(NaiveDate, NaiveDate)> {
        dates::month_bounds(self.year, self.month)
    }
}

/// Response body as sent by the endpoint.
///
/// Every field is optional: error bodies carry `ok: false` (or nothing at all)
/// and no datasets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReportBody {
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub costing: Option<Vec<Value>>,
    #[serde(default)]
    pub rental: Option<Vec<Value>>,
    #[serde(default)]
    pub sla: Option<Vec<Value>>,
    /// Free-form: a string or an object, depending on the failing layer.
    #[serde(default)]
    pub error: Option<Value>,
}

/// A successful monthly report. Entries are opaque server records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub costing: Vec<Value>,
    pub rental: Vec<Value>,
    pub sla: Vec<Value>,
}

/// Whatever came back from one call: status, parsed body if it was JSON,
/// and the raw text for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReportOutcome {
    pub status: u16,
    pub body: Option<MonthlyReportBody>,
    pub raw: String,
}

impl MonthlyReportOutcome {
    pub fn from_parts(status: u16, raw: String) -> Self {
        let body = serde_json::from_str(&raw).ok();
        Self { status, body, raw }
    }

    /// `ok` as reported by the body; absent or unparseable reads as `false`.
    pub fn ok_flag(&self) -> bool {
        self.body.as_ref().and_then(|b| b.ok).unwrap_or(false)
    }

    /// The report, if this outcome is a full success: 200, `ok: true` and all
    /// three datasets present.
    pub fn report(&self) -> Option<MonthlyReport> {
        if self.status != 200 || !self.ok_flag() {
            return None;
        }
        let body = self.body.as_ref()?;
        Some(MonthlyReport {
            costing: body.costing.clone()?,
            rental: body.rental.clone()?,
            sla: body.sla.clone()?,
        })
    }

    pub fn into_report(self) -> Result<MonthlyReport, ClientError> {
        self.report().ok_or(ClientError::Api {
            status: self.status,
            body: self.raw,
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error("network error: {0}")]
    Network(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
}

pub struct MonthlyReportClient {
    base_url: String,
    client: reqwest::Client,
}

impl MonthlyReportClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// `timeout` bounds each request natively; the browser build ignores it.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(timeout);
        #[cfg(target_arch = "wasm32")]
        let _ = timeout;

        let client = builder
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, MONTHLY_REPORT_PATH)
    }

    /// Validate `year`/`month` and send the request.
    pub async fn fetch_monthly_report(
        &self,
        year: i32,
        month: u32,
        token: Option<&str>,
    ) -> Result<MonthlyReportOutcome, ClientError> {
        let request = MonthlyReportRequest::new(year, month)?;
        self.send(&request, token).await
    }

    /// Send `request`, attaching `token` as a bearer when given.
    ///
    /// Non-2xx statuses are returned as outcomes, not errors; only transport
    /// failures are `Err`.
    pub async fn send(
        &self,
        request: &MonthlyReportRequest,
        token: Option<&str>,
    ) -> Result<MonthlyReportOutcome, ClientError> {
        let url = self.endpoint();
        let mut req = self.client.post(&url).json(request);

        if let Some(token) = token {
            req = req.bearer_auth(token);
        }

        tracing::debug!(
            %url,
            year = request.year,
            month = request.month,
            authenticated = token.is_some(),
            "requesting monthly report"
        );

        let resp = req
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let raw = resp
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(MonthlyReportOutcome::from_parts(status, raw))
    }
}
