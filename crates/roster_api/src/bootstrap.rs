//! Startup wiring: database, sample data and shared state.

use crate::config::{DatabaseConfig, Settings};
use crate::state::AppState;
use anyhow::{Context, Result};
use log::info;
use roster_core::db::{begin_write, open_db, open_db_in_memory};
use roster_core::{
    AuditContext, Auditor, MemberRepository, NewMember, RandomAuditor, RepoResult,
    SqliteMemberRepository,
};
use rusqlite::Connection;

pub fn open_database(config: &DatabaseConfig) -> Result<Connection> {
    let conn = if config.is_in_memory() {
        open_db_in_memory()
    } else {
        open_db(&config.path)
    };
    conn.with_context(|| format!("failed to open database `{}`", config.path))
}

/// Inserts `count` members named `user0..` with matching ages, but only into
/// an empty member table. Returns the number of inserted rows.
pub fn seed_members(conn: &mut Connection, count: u32, auditor: &dyn Auditor) -> RepoResult<usize> {
    if count == 0 {
        return Ok(0);
    }

    let tx = begin_write(conn)?;
    let inserted = {
        let members = SqliteMemberRepository::try_new(&tx)?;
        if members.count()? > 0 {
            0
        } else {
            for i in 0..count {
                let age = i32::try_from(i).unwrap_or(i32::MAX);
                members.save(
                    &NewMember::with_age(format!("user{i}"), age),
                    &AuditContext::capture(auditor),
                )?;
            }
            count as usize
        }
    };
    tx.commit()?;

    info!("event=seed_members module=api status=ok inserted={inserted}");
    Ok(inserted)
}

/// Opens the configured database, seeds it and builds the handler state.
pub fn build_state(settings: Settings) -> Result<AppState> {
    let mut conn = open_database(&settings.database)?;
    seed_members(&mut conn, settings.seed.members, &RandomAuditor)
        .context("failed to seed members")?;
    Ok(AppState::new(conn, settings))
}

#[cfg(test)]
mod tests {
    use super::{open_database, seed_members};
    use crate::config::DatabaseConfig;
    use roster_core::{FixedAuditor, MemberRepository, SqliteMemberRepository};

    #[test]
    fn seeding_runs_only_on_empty_table() {
        let mut conn = open_database(&DatabaseConfig {
            path: ":memory:".to_string(),
        })
        .unwrap();
        let auditor = FixedAuditor("seed".to_string());

        assert_eq!(seed_members(&mut conn, 3, &auditor).unwrap(), 3);
        assert_eq!(seed_members(&mut conn, 3, &auditor).unwrap(), 0);

        let members = SqliteMemberRepository::try_new(&conn).unwrap();
        assert_eq!(members.count().unwrap(), 3);
        assert_eq!(members.get_by_username("user2").unwrap().age, 2);
    }

    #[test]
    fn file_database_is_created_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.db");
        open_database(&DatabaseConfig {
            path: path.display().to_string(),
        })
        .unwrap();
        assert!(path.exists());
    }
}
