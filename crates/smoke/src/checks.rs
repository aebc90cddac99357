//! Assertions over monthly report outcomes.

use thiserror::Error;

use fleetdash_reports::{ClientError, MonthlyReport, MonthlyReportOutcome};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SmokeError {
    #[error("expected HTTP {expected}, got {status}: {body}")]
    UnexpectedStatus { expected: u16, status: u16, body: String },

    #[error("rejection reported ok=true: {body}")]
    OkOnRejection { body: String },

    #[error("HTTP 200 without a complete report: {body}")]
    IncompleteReport { body: String },

    #[error("request failed: {0}")]
    Request(#[from] ClientError),
}

/// Anonymous and bad-token calls must come back 401 with a falsy `ok`.
pub fn expect_rejected(outcome: &MonthlyReportOutcome) -> Result<(), SmokeError> {
    if outcome.status != 401 {
        return Err(SmokeError::UnexpectedStatus {
            expected: 401,
            status: outcome.status,
            body: outcome.raw.clone(),
        });
    }
    if outcome.ok_flag() {
        return Err(SmokeError::OkOnRejection {
            body: outcome.raw.clone(),
        });
    }
    Ok(())
}

/// An authorized call must be 200 with `ok: true` and all three datasets.
pub fn expect_report(outcome: &MonthlyReportOutcome) -> Result<MonthlyReport, SmokeError> {
    if outcome.status != 200 {
        return Err(SmokeError::UnexpectedStatus {
            expected: 200,
            status: outcome.status,
            body: outcome.raw.clone(),
        });
    }
    outcome.report().ok_or_else(|| SmokeError::IncompleteReport {
        body: outcome.raw.clone(),
    })
}
