//! Narrow read shapes over member rows.
//!
//! Every projection selects exactly the columns it exposes. Shapes that
//! include team data select from `member m LEFT JOIN team t`.

use crate::model::member::{Member, MemberId};
use crate::model::team::Team;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Row shape that can be selected from `member m LEFT JOIN team t`.
///
/// Implementors pick their own column list, which lets one query method
/// return different shapes depending on the type parameter.
pub trait MemberView: Sized {
    /// Comma-separated select list using the `m` and `t` aliases.
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Closed projection exposing only the username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsernameOnly {
    pub username: String,
    age: i32,
}

impl UsernameOnly {
    /// Open projection combining two fields: `"<username> <age>"`.
    pub fn username_and_age(&self) -> String {
        format!("{} {}", self.username, self.age)
    }
}

impl MemberView for UsernameOnly {
    const COLUMNS: &'static str = "m.username AS username, m.age AS age";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            username: row.get("username")?,
            age: row.get("age")?,
        })
    }
}

/// Value-type projection built from a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernameOnlyDto {
    pub username: String,
}

impl UsernameOnlyDto {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl MemberView for UsernameOnlyDto {
    const COLUMNS: &'static str = "m.username AS username";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self::new(row.get::<_, String>("username")?))
    }
}

/// Nested projection: username plus the team's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NestedClosedProjection {
    pub username: String,
    pub team: Option<TeamInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamInfo {
    pub name: String,
}

impl MemberView for NestedClosedProjection {
    const COLUMNS: &'static str = "m.username AS username, t.name AS team_name";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            username: row.get("username")?,
            team: row
                .get::<_, Option<String>>("team_name")?
                .map(|name| TeamInfo { name }),
        })
    }
}

/// Member summary used by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub id: MemberId,
    pub username: String,
    pub team_name: Option<String>,
}

impl MemberDto {
    pub fn new(id: MemberId, username: impl Into<String>, team_name: Option<String>) -> Self {
        Self {
            id,
            username: username.into(),
            team_name,
        }
    }

    /// Builds a summary from an already loaded member and its optional team.
    pub fn from_member(member: &Member, team: Option<&Team>) -> Self {
        Self::new(
            member.id,
            member.username.clone(),
            team.map(|team| team.name.clone()),
        )
    }
}

/// Row shape returned by the hand-written native projection query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberProjection {
    pub id: MemberId,
    pub username: String,
    pub team_name: Option<String>,
}

/// Member loaded together with its team in one joined query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberWithTeam {
    pub member: Member,
    pub team: Option<Team>,
}

#[cfg(test)]
mod tests {
    use super::UsernameOnly;

    #[test]
    fn open_projection_joins_username_and_age() {
        let view = UsernameOnly {
            username: "member1".to_string(),
            age: 20,
        };
        assert_eq!(view.username_and_age(), "member1 20");
    }
}
