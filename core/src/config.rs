//! Run configuration.
//!
//! `InviteConfig` is built once from whatever the host collected (flags,
//! environment, `.env`), validated, and then passed by reference. Nothing in
//! the core reads the environment itself.

use std::fmt;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::client::DEFAULT_API_BASE;
use crate::error::ConfigError;
use crate::executor::RetryPolicy;

pub const DEFAULT_PACING: Duration = Duration::from_secs(5);

/// Which team the invitations target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamSelector {
    /// Numeric id, used as-is.
    Id(u64),
    /// Slug that must be resolved to an id before inviting.
    Slug(String),
}

impl fmt::Display for TeamSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamSelector::Id(id) => write!(f, "team #{id}"),
            TeamSelector::Slug(slug) => write!(f, "team '{slug}'"),
        }
    }
}

/// Validated, immutable settings for one run.
#[derive(Clone)]
pub struct InviteConfig {
    token: String,
    org: String,
    team: TeamSelector,
    api_base: Url,
    pacing: Duration,
    dry_run: bool,
    retry: RetryPolicy,
}

impl fmt::Debug for InviteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InviteConfig")
            .field("token", &"<redacted>")
            .field("org", &self.org)
            .field("team", &self.team)
            .field("api_base", &self.api_base.as_str())
            .field("pacing", &self.pacing)
            .field("dry_run", &self.dry_run)
            .field("retry", &self.retry)
            .finish()
    }
}

impl InviteConfig {
    pub fn builder() -> InviteConfigBuilder {
        InviteConfigBuilder::default()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn team(&self) -> &TeamSelector {
        &self.team
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }
}

/// Raw, unvalidated settings. Empty or whitespace-only strings count as unset.
#[derive(Debug, Clone, Default)]
pub struct InviteConfigBuilder {
    token: Option<String>,
    org: Option<String>,
    team_id: Option<String>,
    team_slug: Option<String>,
    api_base: Option<String>,
    pacing: Option<Duration>,
    dry_run: bool,
    retry: Option<RetryPolicy>,
}

impl InviteConfigBuilder {
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn org(mut self, org: impl Into<String>) -> Self {
        self.org = Some(org.into());
        self
    }

    /// Team id as text, so out-of-range or malformed values are reported
    /// as configuration errors.
    pub fn team_id(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    pub fn team_slug(mut self, team_slug: impl Into<String>) -> Self {
        self.team_slug = Some(team_slug.into());
        self
    }

    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn pacing(mut self, pacing: Duration) -> Self {
        self.pacing = Some(pacing);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn build(self) -> Result<InviteConfig, ConfigError> {
        let token = non_empty(self.token).ok_or(ConfigError::MissingToken)?;
        let org = non_empty(self.org).ok_or(ConfigError::MissingOrg)?;
        if is_dot_segment(&org) {
            return Err(ConfigError::InvalidOrg(org));
        }
        let team = match (non_empty(self.team_id), non_empty(self.team_slug)) {
            (Some(id), slug) => {
                let parsed = id.parse::<u64>().map_err(|e| ConfigError::InvalidTeamId {
                    value: id.clone(),
                    reason: e.to_string(),
                })?;
                if let Some(slug) = slug {
                    debug!(team_id = parsed, team_slug = %slug, "team id given, ignoring team slug");
                }
                TeamSelector::Id(parsed)
            }
            (None, Some(slug)) if is_dot_segment(&slug) => return Err(ConfigError::InvalidTeamSlug(slug)),
            (None, Some(slug)) => TeamSelector::Slug(slug),
            (None, None) => return Err(ConfigError::MissingTeam),
        };
        let api_base = parse_api_base(non_empty(self.api_base).as_deref().unwrap_or(DEFAULT_API_BASE))?;

        Ok(InviteConfig {
            token,
            org,
            team,
            api_base,
            pacing: self.pacing.unwrap_or(DEFAULT_PACING),
            dry_run: self.dry_run,
            retry: self.retry.unwrap_or_default(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `.` and `..` would be collapsed by URL normalization and send the request
/// to a different endpoint.
fn is_dot_segment(value: &str) -> bool {
    matches!(value, "." | "..")
}

fn parse_api_base(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidApiBase {
        value: value.to_string(),
        reason,
    };
    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("expected an http(s) URL".to_string()));
    }
    Ok(url)
}
