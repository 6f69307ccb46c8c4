//! Wire DTOs for the organization API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.

use serde::{Deserialize, Serialize};

/// Organization role granted by an invitation. Bulk invites only ever grant
/// plain membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    DirectMember,
}

/// Request payload for `POST /orgs/{org}/invitations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationPayload {
    pub email: String,
    pub role: Role,
    pub team_ids: Vec<u64>,
}

impl InvitationPayload {
    /// Invite `email` as a direct member of a single team.
    pub fn direct_member(email: &str, team_id: u64) -> Self {
        Self {
            email: email.to_string(),
            role: Role::DirectMember,
            team_ids: vec![team_id],
        }
    }
}

/// The part of a team lookup response the inviter needs. `id` stays optional
/// so a body without it can be reported precisely.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TeamLookup {
    #[serde(default)]
    pub id: Option<u64>,
}
