//! Member endpoints.
//!
//! `/members/:id` reads straight through the repository. `/members2/:id`
//! resolves the id through `MemberService`, the same lookup path other
//! callers use to turn an identifier into a loaded member.

use crate::dto::{MemberPageQuery, PageResponse};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::{Query, WithRejection};
use roster_core::{
    EntityRef, MemberDto, MemberId, MemberRepository, MemberService, RepoError,
    SqliteMemberRepository, SqliteTeamRepository, Team, TeamId, TeamRepository,
};
use std::collections::HashMap;

pub async fn find_member(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<MemberId>, ApiError>,
) -> Result<String, ApiError> {
    state
        .with_tx(move |conn| {
            let members = SqliteMemberRepository::try_new(conn)?;
            members
                .find_by_id(id)?
                .map(|member| member.username)
                .ok_or(RepoError::NotFound(EntityRef::Member(id)))
        })
        .await
}

pub async fn find_member_by_id_lookup(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<MemberId>, ApiError>,
) -> Result<String, ApiError> {
    state
        .with_tx(move |conn| {
            let mut service = MemberService::new(SqliteMemberRepository::try_new(conn)?);
            Ok(service.get(id)?.username)
        })
        .await
}

/// Lists one page of members as DTOs.
///
/// Teams are loaded with a single follow-up query for the ids on the page.
pub async fn list_members(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<MemberPageQuery>, ApiError>,
) -> Result<Json<PageResponse<MemberDto>>, ApiError> {
    let request = query.into_page_request(&state.settings().paging)?;

    let page = state
        .with_tx(move |conn| {
            let members = SqliteMemberRepository::try_new(conn)?;
            let teams = SqliteTeamRepository::try_new(conn)?;

            let page = members.find_all_paged(&request)?;
            let mut team_ids: Vec<TeamId> =
                page.content.iter().filter_map(|member| member.team_id).collect();
            team_ids.sort_unstable();
            team_ids.dedup();

            let teams_by_id: HashMap<TeamId, Team> = teams
                .find_by_ids(&team_ids)?
                .into_iter()
                .map(|team| (team.id, team))
                .collect();

            Ok(page.map(|member| {
                let team = member.team_id.and_then(|team_id| teams_by_id.get(&team_id));
                MemberDto::from_member(&member, team)
            }))
        })
        .await?;

    Ok(Json(PageResponse::from(page)))
}
