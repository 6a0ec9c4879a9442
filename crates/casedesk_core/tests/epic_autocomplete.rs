use casedesk_core::db::open_db_in_memory;
use casedesk_core::{EpicRepository, NewEpic, RequestContext, SqliteEpicRepository};
use uuid::Uuid;

fn ctx() -> RequestContext {
    RequestContext::for_user(Uuid::new_v4())
}

fn create_named(repo: &SqliteEpicRepository<'_>, ctx: &RequestContext, name: &str) -> Uuid {
    repo.create_epic(&NewEpic::named(name), ctx).unwrap().id
}

#[test]
fn empty_search_returns_all_sorted_by_name_ascending() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEpicRepository::try_new(&conn).unwrap();
    let ctx = ctx();

    create_named(&repo, &ctx, "beta");
    create_named(&repo, &ctx, "Alpha");
    create_named(&repo, &ctx, "gamma");

    let hits = repo.autocomplete_epics("", 10).unwrap();
    let labels: Vec<&str> = hits.iter().map(|hit| hit.label.as_str()).collect();
    assert_eq!(labels, vec!["Alpha", "beta", "gamma"]);
}

#[test]
fn search_matches_name_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEpicRepository::try_new(&conn).unwrap();
    let ctx = ctx();

    create_named(&repo, &ctx, "Riverside placement");
    create_named(&repo, &ctx, "Hillside placement");
    create_named(&repo, &ctx, "Unrelated");

    let hits = repo.autocomplete_epics("SIDE PLACE", 10).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].label, "Hillside placement");
    assert_eq!(hits[1].label, "Riverside placement");
}

#[test]
fn search_matching_an_id_returns_that_epic() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEpicRepository::try_new(&conn).unwrap();
    let ctx = ctx();

    let target = create_named(&repo, &ctx, "plain name");
    create_named(&repo, &ctx, "another name");

    let hits = repo.autocomplete_epics(&target.to_string(), 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, target);
    assert_eq!(hits[0].label, "plain name");
}

#[test]
fn metacharacters_in_search_match_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEpicRepository::try_new(&conn).unwrap();
    let ctx = ctx();

    create_named(&repo, &ctx, "50% off");
    create_named(&repo, &ctx, "50x off");

    let hits = repo.autocomplete_epics("50%", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].label, "50% off");
}

#[test]
fn limit_caps_results() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEpicRepository::try_new(&conn).unwrap();
    let ctx = ctx();

    for name in ["a", "b", "c", "d"] {
        create_named(&repo, &ctx, name);
    }

    let hits = repo.autocomplete_epics("", 2).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].label, "a");
    assert_eq!(hits[1].label, "b");
}
