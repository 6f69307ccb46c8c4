//! Host side of the bulk inviter: wires flags, the recipient file, the ureq
//! transport and a real clock into [`BulkInviter`], and turns the result
//! into a process exit status.

pub mod args;
pub mod transport;

use std::process::ExitCode;

use invite_core::{
    ApiError, BulkInviter, ConfigError, DriverError, InputError, InviteReport, Recipients, ThreadSleeper,
};
use thiserror::Error;
use tracing::{error, info, warn};

pub use args::Cli;
pub use transport::UreqTransport;

/// Why a run stopped before producing a report.
#[derive(Debug, Error)]
pub enum Failure {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl Failure {
    pub fn exit_code(&self) -> u8 {
        match self {
            Failure::Config(_) => 2,
            Failure::Input(_) => 3,
            Failure::Driver(DriverError::TeamResolution { .. })
            | Failure::Driver(DriverError::Api(ApiError::MissingTeamId))
            | Failure::Driver(DriverError::Api(ApiError::DeserializationError(_))) => 4,
            Failure::Driver(DriverError::Api(_)) => 5,
        }
    }
}

/// Exit status when the run finished but some recipients were not invited.
pub const EXIT_PARTIAL: u8 = 1;

/// Validate settings, load recipients, and invite them.
pub fn try_run(cli: &Cli) -> Result<InviteReport, Failure> {
    let config = cli.config()?;
    let recipients = Recipients::load(&cli.file, &cli.domain)?;
    info!(
        file = %cli.file.display(),
        accepted = recipients.len(),
        skipped = recipients.skipped(),
        org = config.org(),
        team = %config.team(),
        dry_run = config.dry_run(),
        "loaded recipients"
    );
    if recipients.is_empty() {
        warn!(file = %cli.file.display(), "no valid addresses to invite");
    }

    let inviter = BulkInviter::new(config, UreqTransport::new(cli.timeout()), ThreadSleeper);
    Ok(inviter.run(&recipients)?)
}

pub fn run(cli: &Cli) -> ExitCode {
    match try_run(cli) {
        Ok(report) => {
            info!("{report}");
            for failure in report.failures() {
                warn!(email = %failure.email, status = ?failure.status, "not invited");
            }
            if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_PARTIAL)
            }
        }
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
