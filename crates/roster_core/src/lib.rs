//! Core data-access layer for the roster service.
//! Owns the entity model, storage bootstrap, repositories and services.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::audit::{AuditContext, AuditFields, Auditor, FixedAuditor, RandomAuditor};
pub use model::item::{Item, ItemId};
pub use model::member::{Member, MemberId, NewMember};
pub use model::team::{NewTeam, Team, TeamId};
pub use model::ValidationError;
pub use repo::item_repo::{ItemRepository, SaveOutcome, SqliteItemRepository};
pub use repo::member_custom::find_member_custom;
pub use repo::member_repo::{MemberRepository, SqliteMemberRepository};
pub use repo::page::{
    Direction, MemberSortProperty, Order, Page, PageRequest, Slice, Sort, SortParseError,
};
pub use repo::projection::{
    MemberDto, MemberProjection, MemberView, MemberWithTeam, NestedClosedProjection, TeamInfo,
    UsernameOnly, UsernameOnlyDto,
};
pub use repo::team_repo::{SqliteTeamRepository, TeamRepository};
pub use repo::{EntityRef, RepoError, RepoResult};
pub use service::member_service::MemberService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
