//! Audit fields and the context used to stamp them.
//!
//! Writes never pick timestamps or actors on their own: callers build an
//! `AuditContext` once per operation and hand it to the repository, which
//! copies it into the affected rows.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Creation/modification metadata carried by members and teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFields {
    /// Unix epoch milliseconds of the insert. Never rewritten.
    pub created_date: i64,
    /// Unix epoch milliseconds of the latest write.
    pub last_modified_date: i64,
    /// Actor of the insert. Never rewritten.
    pub created_by: Option<String>,
    /// Actor of the latest write.
    pub last_modified_by: Option<String>,
}

impl AuditFields {
    /// Builds fields for a freshly inserted row.
    pub fn created(ctx: &AuditContext) -> Self {
        Self {
            created_date: ctx.now_ms,
            last_modified_date: ctx.now_ms,
            created_by: ctx.actor.clone(),
            last_modified_by: ctx.actor.clone(),
        }
    }

    /// Applies a modification stamp, keeping creation data untouched.
    pub fn touch(&mut self, ctx: &AuditContext) {
        self.last_modified_date = ctx.now_ms;
        self.last_modified_by = ctx.actor.clone();
    }
}

/// Timestamp and actor applied by a single write operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditContext {
    pub now_ms: i64,
    pub actor: Option<String>,
}

impl AuditContext {
    pub fn new(now_ms: i64, actor: Option<String>) -> Self {
        Self { now_ms, actor }
    }

    /// Uses the system clock and asks `auditor` for the current actor.
    pub fn capture(auditor: &dyn Auditor) -> Self {
        Self {
            now_ms: now_epoch_ms(),
            actor: auditor.current_auditor(),
        }
    }
}

/// Source of the actor name recorded in `created_by`/`last_modified_by`.
pub trait Auditor: Send + Sync {
    fn current_auditor(&self) -> Option<String>;
}

/// Auditor that reports one fixed actor name.
#[derive(Debug, Clone)]
pub struct FixedAuditor(pub String);

impl Auditor for FixedAuditor {
    fn current_auditor(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Auditor that stands in for a missing authentication layer by reporting a
/// fresh random identifier on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAuditor;

impl Auditor for RandomAuditor {
    fn current_auditor(&self) -> Option<String> {
        Some(Uuid::new_v4().to_string())
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
