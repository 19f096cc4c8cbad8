use roster_core::db::open_db_in_memory;
use roster_core::{
    AuditContext, EntityRef, Member, MemberRepository, NewMember, NewTeam, RepoError,
    SqliteMemberRepository, SqliteTeamRepository, TeamRepository, ValidationError,
};

fn audit_at(now_ms: i64) -> AuditContext {
    AuditContext::new(now_ms, Some("tester".to_string()))
}

#[test]
fn save_and_find_by_id_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let saved = repo
        .save(&NewMember::new("memberA"), &audit_at(1_000))
        .unwrap();
    let found = repo.find_by_id(saved.id).unwrap().unwrap();

    assert_eq!(found, saved);
    assert_eq!(found.username, "memberA");
    assert_eq!(found.audit.created_date, 1_000);
    assert_eq!(found.audit.created_by.as_deref(), Some("tester"));
}

#[test]
fn basic_crud_counts_and_deletes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let member1 = repo.save(&NewMember::new("member1"), &audit_at(1)).unwrap();
    let member2 = repo.save(&NewMember::new("member2"), &audit_at(2)).unwrap();

    assert_eq!(repo.find_by_id(member1.id).unwrap().unwrap(), member1);
    assert_eq!(repo.find_by_id(member2.id).unwrap().unwrap(), member2);
    assert_eq!(repo.find_all().unwrap(), vec![member1.clone(), member2.clone()]);
    assert_eq!(repo.count().unwrap(), 2);

    repo.delete(member1.id).unwrap();
    repo.delete(member2.id).unwrap();
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn delete_missing_member_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let err = repo.delete(42).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(EntityRef::Member(42))));
}

#[test]
fn update_touches_modification_fields_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let mut member = repo
        .save(&NewMember::with_age("draft", 10), &audit_at(1_000))
        .unwrap();
    member.set_username("final");
    member.set_age(11);

    let updated = repo
        .update(&member, &AuditContext::new(2_000, Some("editor".to_string())))
        .unwrap();
    let loaded = repo.find_by_id(member.id).unwrap().unwrap();

    assert_eq!(loaded, updated);
    assert_eq!(loaded.username, "final");
    assert_eq!(loaded.age, 11);
    assert_eq!(loaded.audit.created_date, 1_000);
    assert_eq!(loaded.audit.created_by.as_deref(), Some("tester"));
    assert_eq!(loaded.audit.last_modified_date, 2_000);
    assert_eq!(loaded.audit.last_modified_by.as_deref(), Some("editor"));
}

#[test]
fn update_missing_member_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let ghost = Member {
        id: 7,
        username: "ghost".to_string(),
        age: 1,
        team_id: None,
        audit: roster_core::AuditFields::created(&audit_at(1)),
    };
    let err = repo.update(&ghost, &audit_at(2)).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(EntityRef::Member(7))));
}

#[test]
fn save_rejects_invalid_input_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let err = repo
        .save(&NewMember::with_age("", 10), &audit_at(1))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyUsername)
    ));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn save_with_unknown_team_is_a_constraint_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let orphan = NewMember {
        username: "orphan".to_string(),
        age: 10,
        team_id: Some(999),
    };
    let err = repo.save(&orphan, &audit_at(1)).unwrap_err();
    assert!(matches!(err, RepoError::ConstraintViolation(_)));
}

#[test]
fn change_team_persists_owning_side() {
    let conn = open_db_in_memory().unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();

    let team = teams.save(&NewTeam::new("teamA"), &audit_at(1)).unwrap();
    let mut member = members
        .save(&NewMember::with_age("member1", 10), &audit_at(1))
        .unwrap();

    member.change_team(&team);
    members.update(&member, &audit_at(2)).unwrap();

    let roster = teams.list_members(team.id).unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].id, member.id);
    assert_eq!(roster[0].team_id, Some(team.id));
}
