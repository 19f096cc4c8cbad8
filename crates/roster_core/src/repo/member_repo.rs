//! Member repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Expose every member query as a named method with explicit cardinality.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Single-row queries fail with `NonUniqueResult` instead of picking a row.
//! - `bulk_age_plus` bypasses any in-memory member state; callers holding
//!   cached members must reload them (see `MemberService`).
//! - `find_lock_by_username` only runs inside a transaction and escalates it
//!   to a write lock before reading.

use crate::model::audit::{AuditContext, AuditFields};
use crate::model::member::{Member, MemberId, NewMember};
use crate::repo::error::{count_from_db, single_or_none};
use crate::repo::member_custom;
use crate::repo::page::{Page, PageRequest, Slice};
use crate::repo::projection::{
    MemberDto, MemberProjection, MemberView, MemberWithTeam, NestedClosedProjection,
    UsernameOnly, UsernameOnlyDto,
};
use crate::repo::{
    ensure_schema_ready, member_columns, member_from_row, member_with_team_from_row, EntityRef,
    RepoError, RepoResult, MEMBER_COLUMNS, TEAM_COLUMNS,
};
use log::{debug, info};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Params};

/// Named query: members with an exact username, ordered by id.
pub const MEMBER_FIND_BY_USERNAME: &str = concat!(
    "SELECT ",
    member_columns!(),
    " FROM member m WHERE m.username = ?1 ORDER BY m.member_id ASC;"
);

const MEMBER_FROM_JOIN_TEAM: &str = "FROM member m LEFT JOIN team t ON t.team_id = m.team_id";

/// Repository interface for member persistence and queries.
pub trait MemberRepository {
    /// Inserts a member and returns it with its generated id and audit fields.
    fn save(&self, member: &NewMember, audit: &AuditContext) -> RepoResult<Member>;
    /// Writes all mutable fields of an existing member.
    fn update(&self, member: &Member, audit: &AuditContext) -> RepoResult<Member>;
    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>>;
    fn find_all(&self) -> RepoResult<Vec<Member>>;
    fn count(&self) -> RepoResult<u64>;
    fn delete(&self, id: MemberId) -> RepoResult<()>;

    fn find_by_username_and_age_greater_than(
        &self,
        username: &str,
        age: i32,
    ) -> RepoResult<Vec<Member>>;
    /// First three members by id.
    fn find_top3(&self) -> RepoResult<Vec<Member>>;
    /// Runs the `MEMBER_FIND_BY_USERNAME` named query.
    fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>>;
    fn find_user(&self, username: &str, age: i32) -> RepoResult<Vec<Member>>;
    fn find_username_list(&self) -> RepoResult<Vec<String>>;
    /// Members that belong to a team, joined with the team name.
    fn find_member_dto(&self) -> RepoResult<Vec<MemberDto>>;
    fn find_by_names(&self, usernames: &[String]) -> RepoResult<Vec<Member>>;

    /// At most one member; two or more matches are an error.
    fn find_one_by_username(&self, username: &str) -> RepoResult<Option<Member>>;
    /// Exactly one member; zero matches are `NotFound`.
    fn get_by_username(&self, username: &str) -> RepoResult<Member>;

    fn find_by_age(&self, age: i32, request: &PageRequest) -> RepoResult<Page<Member>>;
    fn find_slice_by_age(&self, age: i32, request: &PageRequest) -> RepoResult<Slice<Member>>;
    fn find_all_paged(&self, request: &PageRequest) -> RepoResult<Page<Member>>;

    /// Adds one year to every member aged `min_age` or older in a single
    /// statement and returns the number of updated rows.
    fn bulk_age_plus(&self, min_age: i32, audit: &AuditContext) -> RepoResult<usize>;

    /// All members with their team loaded through a join.
    fn find_member_fetch_join(&self) -> RepoResult<Vec<MemberWithTeam>>;
    fn find_entity_graph_by_username(&self, username: &str) -> RepoResult<Vec<MemberWithTeam>>;

    /// Single-row read intended for snapshots that are never written back.
    fn find_read_only_by_username(&self, username: &str) -> RepoResult<Option<Member>>;
    /// Reads matching members while holding the database write lock.
    fn find_lock_by_username(&self, username: &str) -> RepoResult<Vec<Member>>;

    fn find_projections_by_username(&self, username: &str) -> RepoResult<Vec<UsernameOnly>>;
    fn find_projections_dto_by_username(&self, username: &str)
        -> RepoResult<Vec<UsernameOnlyDto>>;
    fn find_nested_projections_by_username(
        &self,
        username: &str,
    ) -> RepoResult<Vec<NestedClosedProjection>>;
    /// Projection chosen by the caller through the type parameter.
    fn find_view_by_username<V: MemberView>(&self, username: &str) -> RepoResult<Vec<V>>
    where
        Self: Sized;

    fn find_by_native_query(&self, username: &str) -> RepoResult<Option<Member>>;
    fn find_by_native_projection(
        &self,
        request: &PageRequest,
    ) -> RepoResult<Page<MemberProjection>>;

    fn find_member_custom(&self) -> RepoResult<Vec<Member>>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Constructs a repository from a migrated connection or transaction.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_members<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(sql)?;
        let members = stmt
            .query_map(params, member_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(members)
    }

    fn query_members_with_team<P: Params>(
        &self,
        sql: &str,
        params: P,
    ) -> RepoResult<Vec<MemberWithTeam>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, member_with_team_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn count_where<P: Params>(&self, sql: &str, params: P) -> RepoResult<u64> {
        let total: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        count_from_db(total)
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn save(&self, member: &NewMember, audit: &AuditContext) -> RepoResult<Member> {
        member.validate()?;
        let fields = AuditFields::created(audit);

        self.conn.execute(
            "INSERT INTO member (
                username,
                age,
                team_id,
                created_date,
                last_modified_date,
                created_by,
                last_modified_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                member.username.as_str(),
                member.age,
                member.team_id,
                fields.created_date,
                fields.last_modified_date,
                fields.created_by.as_deref(),
                fields.last_modified_by.as_deref(),
            ],
        )?;

        Ok(Member {
            id: self.conn.last_insert_rowid(),
            username: member.username.clone(),
            age: member.age,
            team_id: member.team_id,
            audit: fields,
        })
    }

    fn update(&self, member: &Member, audit: &AuditContext) -> RepoResult<Member> {
        member.validate()?;
        let mut updated = member.clone();
        updated.audit.touch(audit);

        let changed = self.conn.execute(
            "UPDATE member
             SET
                username = ?1,
                age = ?2,
                team_id = ?3,
                last_modified_date = ?4,
                last_modified_by = ?5
             WHERE member_id = ?6;",
            params![
                updated.username.as_str(),
                updated.age,
                updated.team_id,
                updated.audit.last_modified_date,
                updated.audit.last_modified_by.as_deref(),
                updated.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Member(member.id)));
        }

        Ok(updated)
    }

    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let members = self.query_members(
            &format!("SELECT {MEMBER_COLUMNS} FROM member m WHERE m.member_id = ?1;"),
            [id],
        )?;
        Ok(members.into_iter().next())
    }

    fn find_all(&self) -> RepoResult<Vec<Member>> {
        self.query_members(
            &format!("SELECT {MEMBER_COLUMNS} FROM member m ORDER BY m.member_id ASC;"),
            [],
        )
    }

    fn count(&self) -> RepoResult<u64> {
        self.count_where("SELECT COUNT(*) FROM member;", [])
    }

    fn delete(&self, id: MemberId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM member WHERE member_id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Member(id)));
        }
        Ok(())
    }

    fn find_by_username_and_age_greater_than(
        &self,
        username: &str,
        age: i32,
    ) -> RepoResult<Vec<Member>> {
        self.query_members(
            &format!(
                "SELECT {MEMBER_COLUMNS}
                 FROM member m
                 WHERE m.username = ?1
                   AND m.age > ?2
                 ORDER BY m.member_id ASC;"
            ),
            params![username, age],
        )
    }

    fn find_top3(&self) -> RepoResult<Vec<Member>> {
        self.query_members(
            &format!("SELECT {MEMBER_COLUMNS} FROM member m ORDER BY m.member_id ASC LIMIT 3;"),
            [],
        )
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>> {
        self.query_members(MEMBER_FIND_BY_USERNAME, [username])
    }

    fn find_user(&self, username: &str, age: i32) -> RepoResult<Vec<Member>> {
        self.query_members(
            &format!(
                "SELECT {MEMBER_COLUMNS}
                 FROM member m
                 WHERE m.username = ?1
                   AND m.age = ?2
                 ORDER BY m.member_id ASC;"
            ),
            params![username, age],
        )
    }

    fn find_username_list(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT username FROM member ORDER BY member_id ASC;")?;
        let usernames = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(usernames)
    }

    fn find_member_dto(&self) -> RepoResult<Vec<MemberDto>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.member_id, m.username, t.name
             FROM member m
             INNER JOIN team t ON t.team_id = m.team_id
             ORDER BY m.member_id ASC;",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(MemberDto::new(row.get(0)?, row.get::<_, String>(1)?, row.get(2)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn find_by_names(&self, usernames: &[String]) -> RepoResult<Vec<Member>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; usernames.len()].join(", ");
        let bind_values = usernames
            .iter()
            .map(|username| Value::Text(username.clone()));
        self.query_members(
            &format!(
                "SELECT {MEMBER_COLUMNS}
                 FROM member m
                 WHERE m.username IN ({placeholders})
                 ORDER BY m.member_id ASC;"
            ),
            params_from_iter(bind_values),
        )
    }

    fn find_one_by_username(&self, username: &str) -> RepoResult<Option<Member>> {
        single_or_none(self.find_by_username(username)?)
    }

    fn get_by_username(&self, username: &str) -> RepoResult<Member> {
        self.find_one_by_username(username)?
            .ok_or_else(|| RepoError::NotFound(EntityRef::MemberByUsername(username.to_string())))
    }

    fn find_by_age(&self, age: i32, request: &PageRequest) -> RepoResult<Page<Member>> {
        let order_by = request.sort().to_order_by("m");
        let content = self.query_members(
            &format!(
                "SELECT {MEMBER_COLUMNS}
                 {MEMBER_FROM_JOIN_TEAM}
                 WHERE m.age = ?1{order_by}
                 LIMIT ?2 OFFSET ?3;"
            ),
            params![age, request.limit(), request.offset()],
        )?;

        // The count never needs the team join.
        Page::assemble(content, request, || {
            self.count_where("SELECT COUNT(*) FROM member WHERE age = ?1;", [age])
        })
    }

    fn find_slice_by_age(&self, age: i32, request: &PageRequest) -> RepoResult<Slice<Member>> {
        let order_by = request.sort().to_order_by("m");
        let rows = self.query_members(
            &format!(
                "SELECT {MEMBER_COLUMNS}
                 FROM member m
                 WHERE m.age = ?1{order_by}
                 LIMIT ?2 OFFSET ?3;"
            ),
            params![age, request.limit() + 1, request.offset()],
        )?;
        Ok(Slice::from_overfetch(rows, request))
    }

    fn find_all_paged(&self, request: &PageRequest) -> RepoResult<Page<Member>> {
        let order_by = request.sort().to_order_by("m");
        let content = self.query_members(
            &format!(
                "SELECT {MEMBER_COLUMNS}
                 FROM member m{order_by}
                 LIMIT ?1 OFFSET ?2;"
            ),
            params![request.limit(), request.offset()],
        )?;
        Page::assemble(content, request, || self.count())
    }

    fn bulk_age_plus(&self, min_age: i32, audit: &AuditContext) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE member
             SET
                age = age + 1,
                last_modified_date = ?2,
                last_modified_by = ?3
             WHERE age >= ?1;",
            params![min_age, audit.now_ms, audit.actor.as_deref()],
        )?;
        info!(
            "event=member_bulk_update module=repo status=ok op=age_plus min_age={} rows={}",
            min_age, changed
        );
        Ok(changed)
    }

    fn find_member_fetch_join(&self) -> RepoResult<Vec<MemberWithTeam>> {
        self.query_members_with_team(
            &format!(
                "SELECT {MEMBER_COLUMNS}, {TEAM_COLUMNS}
                 {MEMBER_FROM_JOIN_TEAM}
                 ORDER BY m.member_id ASC;"
            ),
            [],
        )
    }

    fn find_entity_graph_by_username(&self, username: &str) -> RepoResult<Vec<MemberWithTeam>> {
        self.query_members_with_team(
            &format!(
                "SELECT {MEMBER_COLUMNS}, {TEAM_COLUMNS}
                 {MEMBER_FROM_JOIN_TEAM}
                 WHERE m.username = ?1
                 ORDER BY m.member_id ASC;"
            ),
            [username],
        )
    }

    fn find_read_only_by_username(&self, username: &str) -> RepoResult<Option<Member>> {
        single_or_none(self.find_by_username(username)?)
    }

    fn find_lock_by_username(&self, username: &str) -> RepoResult<Vec<Member>> {
        if self.conn.is_autocommit() {
            return Err(RepoError::LockRequiresTransaction);
        }

        // A no-op write takes the RESERVED lock even when the transaction was
        // opened as DEFERRED; it is held until the caller commits.
        self.conn.execute(
            "UPDATE member SET member_id = member_id WHERE username = ?1;",
            [username],
        )?;
        debug!("event=member_lock module=repo status=ok mode=write");

        self.find_by_username(username)
    }

    fn find_projections_by_username(&self, username: &str) -> RepoResult<Vec<UsernameOnly>> {
        self.find_view_by_username(username)
    }

    fn find_projections_dto_by_username(
        &self,
        username: &str,
    ) -> RepoResult<Vec<UsernameOnlyDto>> {
        self.find_view_by_username(username)
    }

    fn find_nested_projections_by_username(
        &self,
        username: &str,
    ) -> RepoResult<Vec<NestedClosedProjection>> {
        self.find_view_by_username(username)
    }

    fn find_view_by_username<V: MemberView>(&self, username: &str) -> RepoResult<Vec<V>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}
             {MEMBER_FROM_JOIN_TEAM}
             WHERE m.username = ?1
             ORDER BY m.member_id ASC;",
            V::COLUMNS
        ))?;
        let views = stmt
            .query_map([username], |row| V::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(views)
    }

    fn find_by_native_query(&self, username: &str) -> RepoResult<Option<Member>> {
        let members = self.query_members(
            "SELECT member_id, username, age, team_id,
                    created_date, last_modified_date, created_by, last_modified_by
             FROM member
             WHERE username = ?1
             ORDER BY member_id ASC
             LIMIT 1;",
            [username],
        )?;
        Ok(members.into_iter().next())
    }

    fn find_by_native_projection(
        &self,
        request: &PageRequest,
    ) -> RepoResult<Page<MemberProjection>> {
        let order_by = request.sort().to_order_by("m");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT m.member_id AS id, m.username AS username, t.name AS team_name
             {MEMBER_FROM_JOIN_TEAM}{order_by}
             LIMIT ?1 OFFSET ?2;"
        ))?;
        let content = stmt
            .query_map(params![request.limit(), request.offset()], |row| {
                Ok(MemberProjection {
                    id: row.get("id")?,
                    username: row.get("username")?,
                    team_name: row.get("team_name")?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Page::assemble(content, request, || self.count())
    }

    fn find_member_custom(&self) -> RepoResult<Vec<Member>> {
        member_custom::find_member_custom(self.conn)
    }
}
