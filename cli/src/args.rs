//! Command-line and environment settings.
//!
//! Every connection setting can come from a flag or from the environment
//! (which `main` seeds from a `.env` file first). Validation is left to
//! [`InviteConfig`] so the rules live in one place.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use invite_core::client::DEFAULT_API_BASE;
use invite_core::recipients::DEFAULT_DOMAIN;
use invite_core::{ConfigError, InviteConfig, RetryPolicy};

#[derive(Debug, Parser)]
#[command(name = "org-invite")]
#[command(about = "Send multiple invites to a GitHub organization", long_about = None, version)]
pub struct Cli {
    /// Input file: one address per line, or a CSV with an `emailHandle` column
    #[arg(short, long, default_value = "email_addresses.txt")]
    pub file: PathBuf,

    /// API token
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Organization name
    #[arg(long, env = "ORG_NAME")]
    pub org: Option<String>,

    /// Numeric team id; wins over --team-slug
    #[arg(long, env = "TEAM_ID")]
    pub team_id: Option<String>,

    /// Team slug, resolved to an id before inviting
    #[arg(long, env = "TEAM_SLUG")]
    pub team_slug: Option<String>,

    /// Accepted address domain
    #[arg(long, default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    /// Seconds to wait between invitations
    #[arg(short, long, default_value_t = 5)]
    pub wait: u64,

    /// Log what would be sent without calling the API
    #[arg(long)]
    pub dry_run: bool,

    /// API base URL
    #[arg(long, env = "GH_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Retries after network failures before giving up on a request
    #[arg(long, default_value_t = 6)]
    pub max_retries: u32,

    /// Upper bound on the summed backoff of one request, in seconds
    #[arg(long, default_value_t = 300)]
    pub max_backoff: u64,

    /// Retry network failures forever
    #[arg(long, conflicts_with_all = ["max_retries", "max_backoff"])]
    pub unbounded_retry: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

impl Cli {
    pub fn retry_policy(&self) -> RetryPolicy {
        if self.unbounded_retry {
            return RetryPolicy::unbounded();
        }
        RetryPolicy::unbounded()
            .with_max_retries(self.max_retries)
            .with_max_total_backoff(Duration::from_secs(self.max_backoff))
    }

    pub fn config(&self) -> Result<InviteConfig, ConfigError> {
        let mut builder = InviteConfig::builder()
            .api_base(self.api_base.as_str())
            .pacing(Duration::from_secs(self.wait))
            .dry_run(self.dry_run)
            .retry(self.retry_policy());
        if let Some(token) = &self.token {
            builder = builder.token(token.as_str());
        }
        if let Some(org) = &self.org {
            builder = builder.org(org.as_str());
        }
        if let Some(id) = &self.team_id {
            builder = builder.team_id(id.as_str());
        }
        if let Some(slug) = &self.team_slug {
            builder = builder.team_slug(slug.as_str());
        }
        builder.build()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
