use std::time::Duration;

use anyhow::{Context, bail};
use chrono::{Datelike, Local};
use clap::Parser;

use fleetdash_auth::{AuthSession, Credentials, HttpIdentityProvider, ProviderConfig};
use fleetdash_reports::MonthlyReportClient;

use checks::{SmokeError, expect_rejected, expect_report};
use cli::Cli;

mod checks;
mod cli;

const INVALID_TOKEN: &str = "fleetdash-smoke-invalid-token";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if cli.json_logs {
        fleetdash_observability::init();
    } else {
        fleetdash_observability::init_pretty();
    }

    if let Err(e) = run(cli).await {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let year = cli.year.unwrap_or(today.year());
    let month = cli.month.unwrap_or(today.month());
    let timeout = Duration::from_secs(cli.timeout_secs);

    let client = MonthlyReportClient::with_timeout(&cli.api_url, timeout)?;
    tracing::info!(endpoint = %client.endpoint(), year, month, "probing monthly report");

    let mut failures = 0;
    let token = match resolve_token(&cli, timeout).await {
        Ok(token) => token,
        Err(e) => {
            let detail = format!("{e:#}");
            tracing::error!(error = %detail, "FAIL obtaining a session token");
            failures += 1;
            None
        }
    };

    failures += run_probes(&client, year, month, token.as_deref()).await;

    if failures > 0 {
        bail!("{failures} check(s) failed");
    }
    tracing::info!("all checks passed");
    Ok(())
}

/// Run every probe and return how many failed. A request that never got a
/// response counts as a failed check; it does not stop the run.
async fn run_probes(client: &MonthlyReportClient, year: i32, month: u32, token: Option<&str>) -> usize {
    let mut failures = 0;

    let anonymous = client.fetch_monthly_report(year, month, None).await;
    failures += record(
        "anonymous request is rejected",
        anonymous.map_err(SmokeError::from).and_then(|o| expect_rejected(&o)),
    );

    let forged = client
        .fetch_monthly_report(year, month, Some(INVALID_TOKEN))
        .await;
    failures += record(
        "invalid token is rejected",
        forged.map_err(SmokeError::from).and_then(|o| expect_rejected(&o)),
    );

    let Some(token) = token else {
        tracing::warn!("no token or credentials given; skipping the authenticated probe");
        return failures;
    };

    let authorized = client
        .fetch_monthly_report(year, month, Some(token))
        .await
        .map_err(SmokeError::from)
        .and_then(|o| expect_report(&o));
    match authorized {
        Ok(report) => tracing::info!(
            costing = report.costing.len(),
            rental = report.rental.len(),
            sla = report.sla.len(),
            "PASS valid token returns the monthly report"
        ),
        Err(e) => {
            tracing::error!(error = %e, "FAIL valid token returns the monthly report");
            failures += 1;
        }
    }
    failures
}

fn record(check: &str, result: Result<(), SmokeError>) -> usize {
    match result {
        Ok(()) => {
            tracing::info!("PASS {check}");
            0
        }
        Err(e) => {
            tracing::error!(error = %e, "FAIL {check}");
            1
        }
    }
}

/// `--token` wins; otherwise sign in with `--email`/`--password`.
async fn resolve_token(cli: &Cli, timeout: Duration) -> anyhow::Result<Option<String>> {
    if let Some(token) = &cli.token {
        return Ok(Some(token.clone()));
    }
    let (Some(email), Some(password)) = (&cli.email, &cli.password) else {
        return Ok(None);
    };
    let (Some(url), Some(anon_key)) = (&cli.supabase_url, &cli.anon_key) else {
        bail!("signing in needs --supabase-url and --anon-key");
    };

    let provider = HttpIdentityProvider::new(ProviderConfig::new(url, anon_key).with_timeout(timeout))?;
    let mut session = AuthSession::signed_out();
    session
        .sign_in(&provider, &Credentials::new(email, password))
        .await
        .context("sign-in failed")?;

    tracing::info!("signed in; using the session token");
    let token = session.require_token(chrono::Utc::now())?;
    Ok(Some(token.to_string()))
}
