//! Member entity.
//!
//! # Invariants
//! - `id` is generated by storage on insert and never reassigned.
//! - `team_id` is the owning side of the member/team association.
//! - `username` is non-empty and `age` is non-negative on every write.

use crate::model::audit::AuditFields;
use crate::model::team::{Team, TeamId};
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};

/// Surrogate key generated by storage.
pub type MemberId = i64;

/// Insert payload for a member that has no identity yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub username: String,
    pub age: i32,
    pub team_id: Option<TeamId>,
}

impl NewMember {
    /// Creates a member payload with age `0` and no team.
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_age(username, 0)
    }

    pub fn with_age(username: impl Into<String>, age: i32) -> Self {
        Self {
            username: username.into(),
            age,
            team_id: None,
        }
    }

    /// Creates a member payload already assigned to `team`.
    pub fn in_team(username: impl Into<String>, age: i32, team: &Team) -> Self {
        Self {
            username: username.into(),
            age,
            team_id: Some(team.id),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.username, self.age)
    }
}

/// Persisted member row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub username: String,
    pub age: i32,
    /// Foreign key to `team.team_id`. The team itself is loaded only on request.
    pub team_id: Option<TeamId>,
    pub audit: AuditFields,
}

impl Member {
    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn set_age(&mut self, age: i32) {
        self.age = age;
    }

    /// Points this member at `team`.
    ///
    /// Only the member side changes; any in-memory member list the caller
    /// keeps for `team` must be updated by the caller.
    pub fn change_team(&mut self, team: &Team) {
        self.team_id = Some(team.id);
    }

    pub fn leave_team(&mut self) {
        self.team_id = None;
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.username, self.age)
    }
}

fn validate_fields(username: &str, age: i32) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    if age < 0 {
        return Err(ValidationError::NegativeAge(age));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::NewMember;
    use crate::model::ValidationError;

    #[test]
    fn validate_rejects_blank_username() {
        let member = NewMember::with_age("   ", 10);
        assert_eq!(member.validate(), Err(ValidationError::EmptyUsername));
    }

    #[test]
    fn validate_rejects_negative_age() {
        let member = NewMember::with_age("member1", -1);
        assert_eq!(member.validate(), Err(ValidationError::NegativeAge(-1)));
    }
}
