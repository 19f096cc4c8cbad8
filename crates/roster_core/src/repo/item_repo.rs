//! Item repository with read-before-write save semantics.

use crate::model::item::{Item, ItemId};
use crate::repo::error::count_from_db;
use crate::repo::{ensure_schema_ready, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

/// Outcome of `ItemRepository::save`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome<T> {
    /// No row existed; the value was inserted.
    Inserted(T),
    /// A row existed; the stored state was kept and returned.
    Merged(T),
}

impl<T> SaveOutcome<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Inserted(value) | Self::Merged(value) => value,
        }
    }

    pub fn was_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

pub trait ItemRepository {
    fn find_by_id(&self, id: &str) -> RepoResult<Option<Item>>;
    /// Inserts when no row with `item.id` exists, otherwise keeps the stored
    /// creation date. `now_ms` stamps `created_date` on insert.
    fn save(&self, item: &Item, now_ms: i64) -> RepoResult<SaveOutcome<Item>>;
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn find_by_id(&self, id: &str) -> RepoResult<Option<Item>> {
        let item = self
            .conn
            .query_row(
                "SELECT id, created_date FROM item WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Item {
                        id: row.get::<_, ItemId>(0)?,
                        created_date: Some(row.get(1)?),
                    })
                },
            )
            .optional()?;
        Ok(item)
    }

    fn save(&self, item: &Item, now_ms: i64) -> RepoResult<SaveOutcome<Item>> {
        item.validate()?;

        if let Some(existing) = self.find_by_id(&item.id)? {
            debug!("event=item_save module=repo status=ok mode=merge");
            return Ok(SaveOutcome::Merged(existing));
        }

        self.conn.execute(
            "INSERT INTO item (id, created_date) VALUES (?1, ?2);",
            params![item.id.as_str(), now_ms],
        )?;
        debug!("event=item_save module=repo status=ok mode=insert");

        Ok(SaveOutcome::Inserted(Item {
            id: item.id.clone(),
            created_date: Some(now_ms),
        }))
    }

    fn count(&self) -> RepoResult<u64> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM item;", [], |row| row.get(0))?;
        count_from_db(total)
    }
}
