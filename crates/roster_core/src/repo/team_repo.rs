//! Team repository contract and SQLite implementation.
//!
//! # Invariants
//! - A team's members are always read with a follow-up query; nothing is
//!   cached on the `Team` value.
//! - Deleting a team detaches its members (`team_id` becomes NULL).

use crate::model::audit::{AuditContext, AuditFields};
use crate::model::member::Member;
use crate::model::team::{NewTeam, Team, TeamId};
use crate::repo::{
    ensure_schema_ready, member_from_row, team_from_row, EntityRef, RepoError, RepoResult,
    MEMBER_COLUMNS, TEAM_COLUMNS,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

/// Repository interface for team persistence.
pub trait TeamRepository {
    fn save(&self, team: &NewTeam, audit: &AuditContext) -> RepoResult<Team>;
    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>>;
    /// Loads several teams in one query; missing ids are skipped.
    fn find_by_ids(&self, ids: &[TeamId]) -> RepoResult<Vec<Team>>;
    fn find_all(&self) -> RepoResult<Vec<Team>>;
    /// Members currently pointing at `team_id`, ordered by member id.
    fn list_members(&self, team_id: TeamId) -> RepoResult<Vec<Member>>;
    fn delete(&self, id: TeamId) -> RepoResult<()>;
}

/// SQLite-backed team repository.
pub struct SqliteTeamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeamRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    fn exists(&self, id: TeamId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM team WHERE team_id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl TeamRepository for SqliteTeamRepository<'_> {
    fn save(&self, team: &NewTeam, audit: &AuditContext) -> RepoResult<Team> {
        team.validate()?;
        let fields = AuditFields::created(audit);

        self.conn.execute(
            "INSERT INTO team (
                name,
                created_date,
                last_modified_date,
                created_by,
                last_modified_by
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                team.name.as_str(),
                fields.created_date,
                fields.last_modified_date,
                fields.created_by.as_deref(),
                fields.last_modified_by.as_deref(),
            ],
        )?;

        Ok(Team {
            id: self.conn.last_insert_rowid(),
            name: team.name.clone(),
            audit: fields,
        })
    }

    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TEAM_COLUMNS} FROM team t WHERE t.team_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(team_from_row(row, 0)?));
        }
        Ok(None)
    }

    fn find_by_ids(&self, ids: &[TeamId]) -> RepoResult<Vec<Team>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TEAM_COLUMNS}
             FROM team t
             WHERE t.team_id IN ({placeholders})
             ORDER BY t.team_id ASC;"
        ))?;
        let teams = stmt
            .query_map(
                params_from_iter(ids.iter().map(|id| Value::Integer(*id))),
                |row| team_from_row(row, 0),
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(teams)
    }

    fn find_all(&self) -> RepoResult<Vec<Team>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TEAM_COLUMNS} FROM team t ORDER BY t.team_id ASC;"))?;
        let teams = stmt
            .query_map([], |row| team_from_row(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(teams)
    }

    fn list_members(&self, team_id: TeamId) -> RepoResult<Vec<Member>> {
        if !self.exists(team_id)? {
            return Err(RepoError::NotFound(EntityRef::Team(team_id)));
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEMBER_COLUMNS}
             FROM member m
             WHERE m.team_id = ?1
             ORDER BY m.member_id ASC;"
        ))?;
        let members = stmt
            .query_map([team_id], member_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(members)
    }

    fn delete(&self, id: TeamId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM team WHERE team_id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Team(id)));
        }
        Ok(())
    }
}
