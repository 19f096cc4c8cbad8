//! Item entity with a caller-assigned identifier.
//!
//! Because the key is known before the first write, "is this new?" cannot be
//! answered from the key. `created_date` is `None` until the item has been
//! stored, and the repository decides insert vs. update by reading first.

use crate::model::ValidationError;
use serde::{Deserialize, Serialize};

pub type ItemId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Unix epoch milliseconds of the first insert.
    pub created_date: Option<i64>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            created_date: None,
        }
    }

    /// Returns whether this value has not been read back from storage yet.
    pub fn is_new(&self) -> bool {
        self.created_date.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyItemId);
        }
        Ok(())
    }
}
