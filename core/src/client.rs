//! Stateless request builder and response parser for the organization API.
//!
//! # Design
//! `OrgClient` holds only the API base URL and the credential, and carries no
//! mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! the `RequestOutcome` the executor returned. The round-trip itself happens
//! elsewhere, keeping this module deterministic and free of I/O.

use std::fmt;

use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::outcome::RequestOutcome;
use crate::types::{InvitationPayload, TeamLookup};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const ACCEPT: &str = "application/vnd.github.v3+json";
pub const USER_AGENT: &str = "OrgBulkInvite";

/// Synchronous, stateless client for the organization invitation API.
#[derive(Clone)]
pub struct OrgClient {
    base: Url,
    token: String,
}

// The token must never end up in logs.
impl fmt::Debug for OrgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrgClient")
            .field("base", &self.base.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

impl OrgClient {
    pub fn new(base: Url, token: &str) -> Self {
        Self {
            base,
            token: token.to_string(),
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `GET /orgs/{org}/teams/{slug}`. Identifiers travel in the path only.
    pub fn build_resolve_team(&self, org: &str, slug: &str) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: self.endpoint(&["orgs", org, "teams", slug])?,
            headers: self.headers(),
            body: None,
        })
    }

    /// `POST /orgs/{org}/invitations` for one address.
    pub fn build_send_invitation(&self, org: &str, email: &str, team_id: u64) -> Result<HttpRequest, ApiError> {
        let payload = InvitationPayload::direct_member(email, team_id);
        let body = serde_json::to_string(&payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.endpoint(&["orgs", org, "invitations"])?,
            headers: self.headers(),
            body: Some(body),
        })
    }

    /// Extract the team id from a successful lookup.
    pub fn parse_team_id(&self, outcome: &RequestOutcome) -> Result<u64, ApiError> {
        let body = match outcome.body() {
            Some(body) if outcome.is_success() => body,
            _ => return Err(ApiError::UnexpectedOutcome(outcome.to_string())),
        };
        let lookup: TeamLookup =
            serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        lookup.id.ok_or(ApiError::MissingTeamId)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<String, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            ("Authorization".to_string(), format!("token {}", self.token)),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), ACCEPT.to_string()),
        ]
    }
}
