//! Bulk invitation driver.
//!
//! # Design
//! `BulkInviter` is the one parameterized driver over [`TeamSelector`]:
//! a numeric id is used directly, a slug is resolved through the API first.
//! Recipients are processed strictly in order, one blocking call at a time,
//! with a fixed pacing delay between them. A rejected or failed invitation is
//! recorded and the run moves on, including one that could not be sent at
//! all. Only team resolution failures abort the run.

use std::fmt;

use tracing::{error, info, warn};

use crate::client::OrgClient;
use crate::config::{InviteConfig, TeamSelector};
use crate::error::DriverError;
use crate::executor::{Executor, Sleeper, Transport};
use crate::outcome::{Classification, RequestOutcome};
use crate::recipients::Recipients;

/// The team invitations go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTeam {
    Id(u64),
    /// Dry-run with a slug: the lookup was skipped along with every other call.
    Unresolved(String),
}

impl fmt::Display for ResolvedTeam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedTeam::Id(id) => write!(f, "team #{id}"),
            ResolvedTeam::Unresolved(slug) => write!(f, "team '{slug}' (unresolved)"),
        }
    }
}

/// What happened to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteStatus {
    Invited,
    DryRun,
    Rejected { status: u16, body: String },
    ServerFailed { status: u16, body: String },
    Unrecognized { status: u16, body: String },
    GaveUp { attempts: u32, error: String },
    /// The request could not be built or the transport refused it outright.
    NotSent { error: String },
}

impl InviteStatus {
    pub fn is_failure(&self) -> bool {
        !matches!(self, InviteStatus::Invited | InviteStatus::DryRun)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteResult {
    pub email: String,
    pub status: InviteStatus,
}

/// Per-recipient results of a run, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteReport {
    pub team: ResolvedTeam,
    pub dry_run: bool,
    pub results: Vec<InviteResult>,
}

impl InviteReport {
    pub fn invited(&self) -> usize {
        self.count(|s| matches!(s, InviteStatus::Invited))
    }

    pub fn failed(&self) -> usize {
        self.count(InviteStatus::is_failure)
    }

    pub fn failures(&self) -> impl Iterator<Item = &InviteResult> {
        self.results.iter().filter(|r| r.status.is_failure())
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&InviteStatus) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.status)).count()
    }
}

impl fmt::Display for InviteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            return write!(
                f,
                "[dry-run] {} invitation(s) to {} logged, none sent",
                self.results.len(),
                self.team
            );
        }
        write!(
            f,
            "{} of {} invitation(s) to {} sent, {} failed",
            self.invited(),
            self.results.len(),
            self.team,
            self.failed()
        )
    }
}

/// Sends one invitation per recipient through a retrying executor.
#[derive(Debug)]
pub struct BulkInviter<T, S> {
    config: InviteConfig,
    client: OrgClient,
    executor: Executor<T, S>,
}

impl<T: Transport, S: Sleeper> BulkInviter<T, S> {
    pub fn new(config: InviteConfig, transport: T, sleeper: S) -> Self {
        let client = OrgClient::new(config.api_base().clone(), config.token());
        let executor = Executor::new(transport, sleeper, config.retry());
        Self {
            config,
            client,
            executor,
        }
    }

    pub fn config(&self) -> &InviteConfig {
        &self.config
    }

    pub fn executor(&self) -> &Executor<T, S> {
        &self.executor
    }

    /// Turn the configured team into an id, calling the API only for a slug.
    pub fn resolve_team(&self) -> Result<ResolvedTeam, DriverError> {
        let slug = match self.config.team() {
            TeamSelector::Id(id) => return Ok(ResolvedTeam::Id(*id)),
            TeamSelector::Slug(slug) => slug,
        };
        let org = self.config.org();
        if self.config.dry_run() {
            info!(org, team_slug = %slug, "[dry-run] would resolve team '{slug}'");
            return Ok(ResolvedTeam::Unresolved(slug.clone()));
        }

        let request = self.client.build_resolve_team(org, slug)?;
        let outcome = self.executor.execute(&request)?;
        if !outcome.is_success() {
            return Err(DriverError::TeamResolution { outcome });
        }
        let id = self.client.parse_team_id(&outcome)?;
        info!(org, team_slug = %slug, team_id = id, "resolved team");
        Ok(ResolvedTeam::Id(id))
    }

    /// Resolve the team, then invite every recipient in order.
    pub fn run(&self, recipients: &Recipients) -> Result<InviteReport, DriverError> {
        let team = self.resolve_team()?;
        let mut results = Vec::with_capacity(recipients.len());

        for (index, email) in recipients.iter().enumerate() {
            if index > 0 && !self.config.dry_run() {
                self.executor.sleeper().sleep(self.config.pacing());
            }
            let status = self.invite(email, &team);
            results.push(InviteResult {
                email: email.to_string(),
                status,
            });
        }

        Ok(InviteReport {
            team,
            dry_run: self.config.dry_run(),
            results,
        })
    }

    fn invite(&self, email: &str, team: &ResolvedTeam) -> InviteStatus {
        let team_id = match team {
            ResolvedTeam::Id(id) if !self.config.dry_run() => *id,
            _ => {
                info!(email, %team, "[dry-run] would send an invitation to '{email}'");
                return InviteStatus::DryRun;
            }
        };

        info!(email, team_id, "sending an invitation to '{email}'");
        let outcome = self
            .client
            .build_send_invitation(self.config.org(), email, team_id)
            .and_then(|request| self.executor.execute(&request));
        match outcome {
            Ok(outcome) => status_of(email, outcome),
            Err(e) => {
                error!(email, error = %e, "invitation to '{email}' could not be sent");
                InviteStatus::NotSent { error: e.to_string() }
            }
        }
    }
}

fn status_of(email: &str, outcome: RequestOutcome) -> InviteStatus {
    let attempts = outcome.attempts();
    let (status, body) = match outcome.response() {
        Some(resp) => (resp.status, resp.body.clone()),
        None => {
            let error = outcome.last_error().unwrap_or_default().to_string();
            error!(email, attempts, %error, "invitation to '{email}' abandoned after network failures");
            return InviteStatus::GaveUp { attempts, error };
        }
    };

    match outcome.classification() {
        // The invitations endpoint answers 201 Created.
        Classification::Success | Classification::UnrecognizedStatus if matches!(status, 200 | 201) => {
            info!(email, status, attempts, "invitation sent to '{email}'");
            InviteStatus::Invited
        }
        Classification::ClientError => {
            warn!(email, status, %body, "invitation to '{email}' rejected");
            InviteStatus::Rejected { status, body }
        }
        Classification::ServerError => {
            error!(email, status, %body, "server failed invitation to '{email}'");
            InviteStatus::ServerFailed { status, body }
        }
        _ => {
            warn!(email, status, %body, "unrecognized status for invitation to '{email}', check manually");
            InviteStatus::Unrecognized { status, body }
        }
    }
}
