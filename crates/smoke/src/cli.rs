use clap::Parser;

/// Probe the monthly report endpoint and check its authorization contract.
#[derive(Debug, Parser)]
#[command(name = "fleetdash-smoke", version, about)]
pub struct Cli {
    /// Base URL of the dashboard API.
    #[arg(long, env = "FLEETDASH_API_URL", default_value = "http://localhost:3000")]
    pub api_url: String,

    /// Report year; defaults to the current year.
    #[arg(long)]
    pub year: Option<i32>,

    /// Report month (1-12); defaults to the current month.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Bearer token for the authenticated probe.
    #[arg(long, env = "FLEETDASH_AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Sign in with these credentials to obtain a token.
    #[arg(long, env = "FLEETDASH_EMAIL", requires = "password")]
    pub email: Option<String>,

    #[arg(long, env = "FLEETDASH_PASSWORD", hide_env_values = true, requires = "email")]
    pub password: Option<String>,

    #[arg(long, env = "FLEETDASH_SUPABASE_URL")]
    pub supabase_url: Option<String>,

    #[arg(long, env = "FLEETDASH_SUPABASE_ANON_KEY", hide_env_values = true)]
    pub anon_key: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "FLEETDASH_HTTP_TIMEOUT_SECS", default_value_t = 15)]
    pub timeout_secs: u64,

    /// Emit JSON log lines (for CI log collectors).
    #[arg(long, env = "FLEETDASH_LOG_JSON")]
    pub json_logs: bool,
}
