use roster_core::{
    AuditContext, AuditFields, Item, Member, MemberSortProperty, NewMember, NewTeam, Team,
    ValidationError,
};

fn team_a() -> Team {
    Team {
        id: 3,
        name: "teamA".to_string(),
        audit: AuditFields::created(&AuditContext::new(1_700_000_000_000, None)),
    }
}

#[test]
fn member_serialization_uses_expected_wire_fields() {
    let team = team_a();
    let mut member = Member {
        id: 7,
        username: "member1".to_string(),
        age: 10,
        team_id: None,
        audit: AuditFields::created(&AuditContext::new(
            1_700_000_000_000,
            Some("creator".to_string()),
        )),
    };
    member.change_team(&team);

    let json = serde_json::to_value(&member).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["username"], "member1");
    assert_eq!(json["team_id"], 3);
    assert_eq!(json["audit"]["created_date"], 1_700_000_000_000_i64);
    assert_eq!(json["audit"]["created_by"], "creator");

    let decoded: Member = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, member);
}

#[test]
fn leaving_team_clears_reference() {
    let mut member = Member {
        id: 1,
        username: "member1".to_string(),
        age: 10,
        team_id: Some(3),
        audit: AuditFields::created(&AuditContext::new(1, None)),
    };
    member.leave_team();

    let json = serde_json::to_value(&member).unwrap();
    assert!(json["team_id"].is_null());
}

#[test]
fn unsaved_item_has_no_created_date() {
    let item = Item::new("A");
    let json = serde_json::to_value(&item).unwrap();

    assert_eq!(json["id"], "A");
    assert!(json["created_date"].is_null());
    assert!(item.is_new());
}

#[test]
fn sort_property_uses_snake_case_names() {
    let property: MemberSortProperty = serde_json::from_value(serde_json::json!("username")).unwrap();
    assert_eq!(property, MemberSortProperty::Username);
    assert!(serde_json::from_value::<MemberSortProperty>(serde_json::json!("email")).is_err());
}

#[test]
fn input_validation_rejects_bad_values() {
    assert_eq!(
        NewMember::with_age("someone", -1).validate().unwrap_err(),
        ValidationError::NegativeAge(-1)
    );
    assert_eq!(
        NewTeam::new("").validate().unwrap_err(),
        ValidationError::EmptyTeamName
    );
    assert_eq!(
        Item::new(" ").validate().unwrap_err(),
        ValidationError::EmptyItemId
    );
}
