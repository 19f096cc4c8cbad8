//! Team entity.

use crate::model::audit::AuditFields;
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};

/// Surrogate key generated by storage.
pub type TeamId = i64;

/// Insert payload for a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
}

impl NewTeam {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyTeamName);
        }
        Ok(())
    }
}

/// Persisted team row.
///
/// Members of a team are not embedded; load them with
/// `TeamRepository::list_members`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub audit: AuditFields,
}
