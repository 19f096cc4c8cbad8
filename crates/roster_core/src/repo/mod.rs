//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define one typed data-access contract per entity.
//! - Keep every SQL statement explicit and parameterized.
//! - Translate driver failures into semantic errors (`NotFound`,
//!   `NonUniqueResult`, `ConstraintViolation`).
//!
//! # Invariants
//! - Repositories borrow a connection; a `Transaction` can be passed
//!   wherever a connection is expected, so the caller owns the boundary.
//! - Write paths validate entity input before any SQL mutation.

use crate::db::migrations::latest_version;
use crate::db::schema_version;
use crate::model::audit::AuditFields;
use crate::model::member::Member;
use crate::model::team::Team;
use rusqlite::{Connection, Row};

pub mod error;
pub mod item_repo;
pub mod member_custom;
pub mod member_repo;
pub mod page;
pub mod projection;
pub mod team_repo;

pub use error::{EntityRef, RepoError, RepoResult};

/// Member select list as a literal, for `concat!` in constant queries.
macro_rules! member_columns {
    () => {
        "m.member_id, m.username, m.age, m.team_id, \
         m.created_date, m.last_modified_date, m.created_by, m.last_modified_by"
    };
}
pub(crate) use member_columns;

/// Member columns in the order expected by `member_from_row`.
pub(crate) const MEMBER_COLUMNS: &str = member_columns!();

/// Team columns in the order expected by `team_from_row`.
pub(crate) const TEAM_COLUMNS: &str =
    "t.team_id, t.name, t.created_date, t.last_modified_date, t.created_by, t.last_modified_by";

const MEMBER_COLUMN_COUNT: usize = 8;

/// Rejects connections that have not been migrated by `db::open_db*`.
pub(crate) fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version = schema_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn member_from_row(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(0)?,
        username: row.get(1)?,
        age: row.get(2)?,
        team_id: row.get(3)?,
        audit: audit_from_row(row, 4)?,
    })
}

/// Reads `TEAM_COLUMNS` starting at column `start`.
pub(crate) fn team_from_row(row: &Row<'_>, start: usize) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(start)?,
        name: row.get(start + 1)?,
        audit: audit_from_row(row, start + 2)?,
    })
}

/// Reads a `MEMBER_COLUMNS, TEAM_COLUMNS` row from a left join.
pub(crate) fn member_with_team_from_row(
    row: &Row<'_>,
) -> rusqlite::Result<projection::MemberWithTeam> {
    let member = member_from_row(row)?;
    let team = match row.get::<_, Option<i64>>(MEMBER_COLUMN_COUNT)? {
        Some(_) => Some(team_from_row(row, MEMBER_COLUMN_COUNT)?),
        None => None,
    };
    Ok(projection::MemberWithTeam { member, team })
}

fn audit_from_row(row: &Row<'_>, start: usize) -> rusqlite::Result<AuditFields> {
    Ok(AuditFields {
        created_date: row.get(start)?,
        last_modified_date: row.get(start + 1)?,
        created_by: row.get(start + 2)?,
        last_modified_by: row.get(start + 3)?,
    })
}
