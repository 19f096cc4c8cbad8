//! Hand-written member query that is not part of the generated-style
//! query surface.

use crate::model::member::Member;
use crate::repo::{member_from_row, RepoResult, MEMBER_COLUMNS};
use rusqlite::Connection;

const CUSTOM_MIN_AGE: i32 = 10;

/// Lists members aged 10 or older, ordered by id.
pub fn find_member_custom(conn: &Connection) -> RepoResult<Vec<Member>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEMBER_COLUMNS}
         FROM member m
         WHERE m.age >= ?1
         ORDER BY m.member_id ASC;"
    ))?;
    let members = stmt
        .query_map([CUSTOM_MIN_AGE], member_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(members)
}
