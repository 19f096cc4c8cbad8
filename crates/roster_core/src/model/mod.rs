//! Entity model for members, teams and items.
//!
//! # Responsibility
//! - Define plain records with stable identity and explicit audit fields.
//! - Validate caller input before it reaches storage.
//!
//! # Invariants
//! - Identity is assigned once (by storage for members/teams, by the caller
//!   for items) and never changes afterwards.
//! - Team membership is owned by `Member::team_id`; teams never store a
//!   member list.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod audit;
pub mod item;
pub mod member;
pub mod team;

/// Validation failure for entity input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Username is empty after trimming.
    EmptyUsername,
    /// Age is negative.
    NegativeAge(i32),
    /// Team name is empty after trimming.
    EmptyTeamName,
    /// Item identifier is empty after trimming.
    EmptyItemId,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::NegativeAge(age) => write!(f, "age must not be negative, got {age}"),
            Self::EmptyTeamName => write!(f, "team name must not be empty"),
            Self::EmptyItemId => write!(f, "item id must not be empty"),
        }
    }
}

impl Error for ValidationError {}
