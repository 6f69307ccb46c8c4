//! Error types for the invitation core.
//!
//! # Design
//! Received HTTP responses are never errors here: they come back as a
//! classified [`RequestOutcome`](crate::outcome::RequestOutcome). The types
//! below cover what is left: bad configuration, unreadable input, payloads
//! that cannot be encoded or decoded, and transport failures that retrying
//! cannot fix.

use std::path::PathBuf;

use thiserror::Error;

use crate::outcome::RequestOutcome;

/// Errors from building requests, executing them, or parsing their results.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request is missing a URL or headers and was never attempted.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The transport rejected the request in a way retrying cannot fix.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// Team lookup succeeded but the body carried no integer `id`.
    #[error("team response has no integer `id` field")]
    MissingTeamId,

    /// A parse method was handed an outcome it cannot interpret.
    #[error("unexpected outcome: {0}")]
    UnexpectedOutcome(String),
}

/// Invalid or missing configuration. Always fatal, always before any I/O.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing API token (set GH_TOKEN or pass --token)")]
    MissingToken,

    #[error("missing organization name (set ORG_NAME or pass --org)")]
    MissingOrg,

    #[error("missing team (set TEAM_ID or TEAM_SLUG)")]
    MissingTeam,

    #[error("invalid organization name {0:?}: `.` and `..` are not allowed")]
    InvalidOrg(String),

    #[error("invalid team slug {0:?}: `.` and `..` are not allowed")]
    InvalidTeamSlug(String),

    #[error("invalid team id {value:?}: {reason}")]
    InvalidTeamId { value: String, reason: String },

    #[error("invalid API base URL {value:?}: {reason}")]
    InvalidApiBase { value: String, reason: String },
}

/// Failures reading the recipient list.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to open file '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read input: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV header has no `{0}` column")]
    MissingColumn(String),
}

/// Failures that abort a bulk-invitation run.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The team lookup returned something other than a success response.
    #[error("team resolution failed: {outcome}")]
    TeamResolution { outcome: RequestOutcome },

    #[error(transparent)]
    Api(#[from] ApiError),
}
