//! Synchronous core for bulk organization invitations.
//!
//! # Overview
//! Builds invitation and team-lookup requests as plain data, sends them
//! through a caller-supplied [`Transport`] with exponential backoff on
//! network failure, and classifies every received response without retrying
//! it. The host supplies the actual HTTP client and clock, keeping the core
//! deterministic and testable.
//!
//! # Design
//! - `OrgClient` is stateless. It holds only the base URL and credential.
//! - `Executor` owns the retry loop; `RetryPolicy` bounds it.
//! - `BulkInviter` drives a whole run from an immutable `InviteConfig`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod executor;
pub mod http;
pub mod outcome;
pub mod recipients;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::OrgClient;
pub use config::{InviteConfig, InviteConfigBuilder, TeamSelector};
pub use driver::{BulkInviter, InviteReport, InviteResult, InviteStatus, ResolvedTeam};
pub use error::{ApiError, ConfigError, DriverError, InputError};
pub use executor::{Executor, RetryPolicy, Sleeper, ThreadSleeper, Transport, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use outcome::{Classification, RequestOutcome};
pub use recipients::Recipients;
pub use types::{InvitationPayload, Role};
