use casedesk_core::db::open_db_in_memory;
use casedesk_core::{
    AuditAction, AuditLogRepository, EpicRepository, EpicService, Gender, NewEpic, RawCriteria,
    RepoError, RequestContext, SqliteAuditLogRepository, SqliteEpicRepository, EPIC_ENTITY_NAME,
};
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use uuid::Uuid;

fn acting_user() -> (RequestContext, Uuid) {
    let user_id = Uuid::new_v4();
    (RequestContext::for_user(user_id), user_id)
}

fn insert_case(conn: &Connection, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO cases (uuid, name) VALUES (?1, ?2);",
        params![id.to_string(), name],
    )
    .unwrap();
    id
}

#[test]
fn create_and_get_roundtrip_stamps_acting_user() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEpicRepository::try_new(&conn).unwrap();
    let (ctx, user_id) = acting_user();

    let new = NewEpic {
        name: "Jordan Smith".to_string(),
        gender: Some(Gender::Female),
        phone: Some("+44 20 7946 0958".to_string()),
        birthdate: Some(631_152_000_000),
        assign_case: None,
    };
    let created = repo.create_epic(&new, &ctx).unwrap();

    assert_eq!(created.name, "Jordan Smith");
    assert_eq!(created.gender, Some(Gender::Female));
    assert_eq!(created.phone.as_deref(), Some("+44 20 7946 0958"));
    assert_eq!(created.birthdate, Some(631_152_000_000));
    assert_eq!(created.assign_case, None);
    assert_eq!(created.created_by, user_id);
    assert_eq!(created.updated_by, user_id);
    assert!(created.created_at > 0);

    let loaded = repo.get_epic(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn create_expands_assigned_case() {
    let conn = open_db_in_memory().unwrap();
    let case_id = insert_case(&conn, "Intake 2024-117");
    let repo = SqliteEpicRepository::try_new(&conn).unwrap();
    let (ctx, _) = acting_user();

    let mut new = NewEpic::named("Assigned epic");
    new.assign_case = Some(case_id);
    let created = repo.create_epic(&new, &ctx).unwrap();

    let case_ref = created.assign_case.expect("association should be expanded");
    assert_eq!(case_ref.id, case_id);
    assert_eq!(case_ref.name, "Intake 2024-117");
}

#[test]
fn create_without_current_user_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEpicRepository::try_new(&conn).unwrap();

    let err = repo
        .create_epic(&NewEpic::named("orphan"), &RequestContext::anonymous())
        .unwrap_err();
    assert!(matches!(err, RepoError::MissingCurrentUser));
}

#[test]
fn create_with_unknown_case_propagates_store_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEpicRepository::try_new(&conn).unwrap();
    let (ctx, _) = acting_user();

    let mut new = NewEpic::named("broken reference");
    new.assign_case = Some(Uuid::new_v4());
    let err = repo.create_epic(&new, &ctx).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn destroy_removes_row_and_appends_one_delete_audit_entry() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEpicRepository::try_new(&conn).unwrap();
    let (ctx, user_id) = acting_user();

    let created = repo.create_epic(&NewEpic::named("to delete"), &ctx).unwrap();
    repo.destroy_epic(created.id, &ctx).unwrap();

    assert_eq!(repo.get_epic(created.id).unwrap(), None);

    let audit = SqliteAuditLogRepository::try_new(&conn).unwrap();
    let entries = audit
        .list_for_entity(EPIC_ENTITY_NAME, &created.id.to_string())
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::Delete);
    assert_eq!(entries[0].values, None);
    assert_eq!(entries[0].created_by, Some(user_id));
    assert!(entries[0].created_at > 0);
}

#[test]
fn destroy_of_missing_id_succeeds_and_still_audits() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEpicRepository::try_new(&conn).unwrap();
    let (ctx, _) = acting_user();

    let missing = Uuid::new_v4();
    repo.destroy_epic(missing, &ctx).unwrap();

    let audit = SqliteAuditLogRepository::try_new(&conn).unwrap();
    let entries = audit
        .list_for_entity(EPIC_ENTITY_NAME, &missing.to_string())
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::Delete);
    assert_eq!(entries[0].values, None);
}

#[test]
fn count_with_and_without_raw_criteria() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEpicRepository::try_new(&conn).unwrap();
    let (ctx, _) = acting_user();

    for (name, gender) in [
        ("one", Gender::Male),
        ("two", Gender::Female),
        ("three", Gender::Female),
    ] {
        let mut new = NewEpic::named(name);
        new.gender = Some(gender);
        repo.create_epic(&new, &ctx).unwrap();
    }

    assert_eq!(repo.count_epics(None).unwrap(), 3);

    let criteria = RawCriteria {
        where_sql: "e.gender = ?".to_string(),
        binds: vec![Value::Text("female".to_string())],
    };
    assert_eq!(repo.count_epics(Some(&criteria)).unwrap(), 2);
}

#[test]
fn service_delegates_to_repository() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEpicRepository::try_new(&conn).unwrap();
    let service = EpicService::new(repo);
    let (ctx, _) = acting_user();

    let created = service
        .create_epic(&NewEpic::named("via service"), &ctx)
        .unwrap();
    assert_eq!(
        service.get_epic(created.id).unwrap().unwrap().name,
        "via service"
    );
    assert_eq!(service.count_epics(None).unwrap(), 1);

    service.destroy_epic(created.id, &ctx).unwrap();
    assert_eq!(service.get_epic(created.id).unwrap(), None);
}
