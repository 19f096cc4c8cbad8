//! Member use-case service.
//!
//! # Responsibility
//! - Provide member entry points for callers above the repository.
//! - Keep an identity map so repeated reads of one id inside a unit of work
//!   return the same state without another query.
//!
//! # Invariants
//! - Every write goes through the repository first; the map is updated only
//!   after the write succeeds.
//! - Bulk statements clear the map, since they change rows without touching
//!   cached values.
//! - Read-only lookups never populate the map.

use crate::model::audit::AuditContext;
use crate::model::member::{Member, MemberId, NewMember};
use crate::model::team::{Team, TeamId};
use crate::repo::member_repo::MemberRepository;
use crate::repo::team_repo::TeamRepository;
use crate::repo::{EntityRef, RepoError, RepoResult};
use log::info;
use std::collections::HashMap;

/// Member service facade with a per-instance identity map.
pub struct MemberService<R: MemberRepository> {
    repo: R,
    identity_map: HashMap<MemberId, Member>,
}

impl<R: MemberRepository> MemberService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            identity_map: HashMap::new(),
        }
    }

    /// Gives direct access to the repository for queries the service does
    /// not wrap.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn save(&mut self, member: &NewMember, audit: &AuditContext) -> RepoResult<Member> {
        let saved = self.repo.save(member, audit)?;
        self.identity_map.insert(saved.id, saved.clone());
        Ok(saved)
    }

    pub fn update(&mut self, member: &Member, audit: &AuditContext) -> RepoResult<Member> {
        let updated = self.repo.update(member, audit)?;
        self.identity_map.insert(updated.id, updated.clone());
        Ok(updated)
    }

    /// Returns the cached member for `id`, loading and caching it on a miss.
    pub fn find(&mut self, id: MemberId) -> RepoResult<Option<Member>> {
        if let Some(member) = self.identity_map.get(&id) {
            return Ok(Some(member.clone()));
        }

        let loaded = self.repo.find_by_id(id)?;
        if let Some(member) = &loaded {
            self.identity_map.insert(member.id, member.clone());
        }
        Ok(loaded)
    }

    /// Like `find`, but a missing row is `NotFound`.
    pub fn get(&mut self, id: MemberId) -> RepoResult<Member> {
        self.find(id)?
            .ok_or(RepoError::NotFound(EntityRef::Member(id)))
    }

    /// Reads a snapshot without registering it in the identity map.
    pub fn find_read_only_by_username(&self, username: &str) -> RepoResult<Option<Member>> {
        self.repo.find_read_only_by_username(username)
    }

    pub fn delete(&mut self, id: MemberId) -> RepoResult<()> {
        self.repo.delete(id)?;
        self.identity_map.remove(&id);
        Ok(())
    }

    /// Moves a member to `team` and persists the change.
    pub fn change_team(
        &mut self,
        member_id: MemberId,
        team: &Team,
        audit: &AuditContext,
    ) -> RepoResult<Member> {
        let mut member = self.get(member_id)?;
        member.change_team(team);
        self.update(&member, audit)
    }

    /// Loads the team of `member` with a follow-up query.
    pub fn load_team<T: TeamRepository>(
        &self,
        teams: &T,
        member: &Member,
    ) -> RepoResult<Option<Team>> {
        match member.team_id {
            Some(team_id) => load_existing_team(teams, team_id).map(Some),
            None => Ok(None),
        }
    }

    /// Runs the bulk age increment, then drops every cached member.
    pub fn bulk_age_plus(&mut self, min_age: i32, audit: &AuditContext) -> RepoResult<usize> {
        let changed = self.repo.bulk_age_plus(min_age, audit)?;
        self.clear();
        Ok(changed)
    }

    /// Drops every cached member.
    pub fn clear(&mut self) {
        let evicted = self.identity_map.len();
        self.identity_map.clear();
        info!(
            "event=identity_map_clear module=service status=ok evicted={}",
            evicted
        );
    }

    pub fn cached_len(&self) -> usize {
        self.identity_map.len()
    }
}

fn load_existing_team<T: TeamRepository>(teams: &T, team_id: TeamId) -> RepoResult<Team> {
    teams
        .find_by_id(team_id)?
        .ok_or(RepoError::NotFound(EntityRef::Team(team_id)))
}
