//! Repository error taxonomy shared by all entity repositories.

use crate::db::DbError;
use crate::model::item::ItemId;
use crate::model::member::MemberId;
use crate::model::team::TeamId;
use crate::model::ValidationError;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Identifies the row a `NotFound` error refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    Member(MemberId),
    MemberByUsername(String),
    Team(TeamId),
    Item(ItemId),
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Member(id) => write!(f, "member {id}"),
            Self::MemberByUsername(username) => write!(f, "member with username `{username}`"),
            Self::Team(id) => write!(f, "team {id}"),
            Self::Item(id) => write!(f, "item `{id}`"),
        }
    }
}

#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound(EntityRef),
    /// A single-row query matched more rows than it may return.
    NonUniqueResult {
        expected: usize,
        actual: usize,
    },
    /// A unique, foreign-key, or check constraint rejected the write.
    ConstraintViolation(String),
    /// A locking read was issued outside a transaction.
    LockRequiresTransaction,
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::NonUniqueResult { expected, actual } => write!(
                f,
                "incorrect result size: expected at most {expected}, actual {actual}"
            ),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::LockRequiresTransaction => {
                write!(f, "locking reads must run inside a write transaction")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Self::ConstraintViolation(
                    message.clone().unwrap_or_else(|| failure.to_string()),
                )
            }
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// Converts a `COUNT(*)` value into an unsigned total.
pub(crate) fn count_from_db(value: i64) -> RepoResult<u64> {
    u64::try_from(value).map_err(|_| RepoError::InvalidData(format!("negative row count {value}")))
}

/// Collapses a list result into at most one row.
pub(crate) fn single_or_none<T>(mut rows: Vec<T>) -> RepoResult<Option<T>> {
    match rows.len() {
        0 => Ok(None),
        1 => Ok(rows.pop()),
        actual => Err(RepoError::NonUniqueResult {
            expected: 1,
            actual,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{single_or_none, RepoError};

    #[test]
    fn single_or_none_rejects_two_rows() {
        let err = single_or_none(vec![1, 2]).unwrap_err();
        assert!(matches!(
            err,
            RepoError::NonUniqueResult {
                expected: 1,
                actual: 2
            }
        ));
    }

    #[test]
    fn single_or_none_handles_empty_and_single() {
        assert_eq!(single_or_none::<i32>(Vec::new()).unwrap(), None);
        assert_eq!(single_or_none(vec![7]).unwrap(), Some(7));
    }
}
