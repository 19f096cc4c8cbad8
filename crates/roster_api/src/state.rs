use crate::config::Settings;
use crate::error::ApiError;
use log::error;
use roster_core::{RepoError, RepoResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex, PoisonError};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    settings: Arc<Settings>,
}

impl AppState {
    pub fn new(conn: Connection, settings: Settings) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs `work` on the blocking pool inside one transaction.
    ///
    /// The transaction commits when `work` returns `Ok` and rolls back
    /// otherwise, including when `work` panics. The next caller after a panic
    /// clears the mutex poison and keeps using the connection.
    pub async fn with_tx<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> RepoResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || -> Result<T, ApiError> {
            let mut conn = db.lock().unwrap_or_else(|poisoned| {
                error!("event=db_mutex_recover module=api status=error reason=poisoned");
                db.clear_poison();
                PoisonError::into_inner(poisoned)
            });
            let tx = conn.transaction().map_err(RepoError::from)?;
            let value = work(&*tx)?;
            tx.commit().map_err(RepoError::from)?;
            Ok(value)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("blocking task failed: {err}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::AppState;
    use crate::config::Settings;
    use crate::error::ApiError;
    use roster_core::db::open_db_in_memory;
    use roster_core::{AuditContext, MemberRepository, NewMember, SqliteMemberRepository};

    #[tokio::test]
    async fn panicking_work_does_not_disable_the_connection() {
        let state = AppState::new(open_db_in_memory().unwrap(), Settings::default());

        let err = state
            .with_tx(|conn| -> roster_core::RepoResult<()> {
                SqliteMemberRepository::try_new(conn)?
                    .save(&NewMember::new("rolled_back"), &AuditContext::new(1, None))?;
                panic!("handler failure");
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));

        let count = state
            .with_tx(|conn| SqliteMemberRepository::try_new(conn)?.count())
            .await
            .unwrap();
        assert_eq!(count, 0);

        let saved = state
            .with_tx(|conn| {
                SqliteMemberRepository::try_new(conn)?
                    .save(&NewMember::new("after_panic"), &AuditContext::new(2, None))
            })
            .await
            .unwrap();
        assert_eq!(saved.username, "after_panic");
    }
}
