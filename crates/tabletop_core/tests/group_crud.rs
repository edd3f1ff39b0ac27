use rusqlite::Connection;
use tabletop_core::db::open_db_in_memory;
use tabletop_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use tabletop_core::{
    GroupDraft, GroupValidationError, GroupsRepository, RepoError, SiteRole,
    SqliteGroupsRepository, User,
};

fn standard_user(conn: &Connection, email: &str) -> User {
    SqliteUserRepository::new(conn)
        .create_user(email, SiteRole::Standard)
        .unwrap()
}

fn admin_level(conn: &Connection, user_id: i64, group_id: i64) -> Option<String> {
    conn.query_row(
        "SELECT group_admin_level FROM group_admin_data WHERE user_id = ?1 AND group_id = ?2;",
        [user_id, group_id],
        |row| row.get(0),
    )
    .ok()
}

#[test]
fn insert_then_get_roundtrip_records_creator_as_admin() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupsRepository::new(&conn);
    let creator = standard_user(&conn, "creator@example.com");

    let draft = GroupDraft::new("Chess Club", "chess", "Weekly blitz nights")
        .with_cities(["Seattle, WA", "bellevue, wa"]);
    let group = repo.insert_group(&creator, &draft).unwrap();

    assert!(group.id > 0);
    assert_eq!(group.name, "Chess Club");
    assert_eq!(group.url, "chess");
    assert_eq!(group.summary, "Weekly blitz nights");
    assert_eq!(group.cities, vec!["bellevue", "Seattle"]);

    assert_eq!(repo.get_group(group.id).unwrap(), Some(group.clone()));
    assert_eq!(repo.get_group_id_by_url("chess").unwrap(), Some(group.id));
    assert_eq!(
        admin_level(&conn, creator.id, group.id).as_deref(),
        Some("group_admin")
    );
}

#[test]
fn insert_group_rejects_invalid_drafts_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupsRepository::new(&conn);
    let creator = standard_user(&conn, "creator@example.com");

    let err = repo
        .insert_group(&creator, &GroupDraft::new("  ", "blank-name", ""))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(GroupValidationError::BlankName)
    ));

    let err = repo
        .insert_group(&creator, &GroupDraft::new("Spaced", "has space", ""))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(GroupValidationError::UrlContainsWhitespace(_))
    ));
    assert!(repo.urls_in_database().unwrap().is_empty());
}

#[test]
fn failed_admin_grant_rolls_back_the_group_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupsRepository::new(&conn);
    let ghost = User {
        id: 4242,
        email: "ghost@example.com".to_string(),
        site_role: SiteRole::Standard,
    };

    let err = repo
        .insert_group(&ghost, &GroupDraft::new("Orphans", "orphans", ""))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert_eq!(repo.get_group_id_by_url("orphans").unwrap(), None);
}

#[test]
fn duplicate_url_surfaces_store_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupsRepository::new(&conn);
    let creator = standard_user(&conn, "creator@example.com");

    repo.insert_group(&creator, &GroupDraft::new("One", "same", ""))
        .unwrap();
    let err = repo
        .insert_group(&creator, &GroupDraft::new("Two", "same", ""))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert_eq!(repo.urls_in_database().unwrap().len(), 1);
}

#[test]
fn update_then_get_roundtrips_every_field() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupsRepository::new(&conn);
    let creator = standard_user(&conn, "creator@example.com");

    let mut group = repo
        .insert_group(
            &creator,
            &GroupDraft::new("Old", "old-url", "old").with_cities(["Austin, TX"]),
        )
        .unwrap();

    group.name = "New".to_string();
    group.url = "new-url".to_string();
    group.summary = "new summary".to_string();
    group.cities = vec!["Boston, MA".to_string()];
    repo.update_group(&group).unwrap();

    let loaded = repo.get_group(group.id).unwrap().unwrap();
    assert_eq!(loaded.name, "New");
    assert_eq!(loaded.url, "new-url");
    assert_eq!(loaded.summary, "new summary");
    assert_eq!(loaded.cities, vec!["Boston"]);
    assert_eq!(repo.get_group_id_by_url("old-url").unwrap(), None);
}

#[test]
fn update_of_unknown_group_is_a_noop() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupsRepository::new(&conn);
    let creator = standard_user(&conn, "creator@example.com");
    let group = repo
        .insert_group(&creator, &GroupDraft::new("Kept", "kept", ""))
        .unwrap();

    let mut phantom = group.clone();
    phantom.id = group.id + 100;
    phantom.url = "phantom".to_string();
    repo.update_group(&phantom).unwrap();

    assert_eq!(repo.get_group(phantom.id).unwrap(), None);
    assert_eq!(repo.get_group(group.id).unwrap(), Some(group));
}

#[test]
fn delete_then_get_returns_none_and_drops_roles() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupsRepository::new(&conn);
    let creator = standard_user(&conn, "creator@example.com");
    let group = repo
        .insert_group(&creator, &GroupDraft::new("Gone", "gone", ""))
        .unwrap();

    repo.delete_group(group.id).unwrap();
    assert_eq!(repo.get_group(group.id).unwrap(), None);
    assert_eq!(admin_level(&conn, creator.id, group.id), None);

    // Deleting again is not an error.
    repo.delete_group(group.id).unwrap();
}

#[test]
fn insert_groups_skips_known_urls_and_links_cities() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupsRepository::new(&conn);
    let creator = standard_user(&conn, "creator@example.com");
    repo.insert_group(&creator, &GroupDraft::new("Existing", "existing", ""))
        .unwrap();

    let drafts = vec![
        GroupDraft::new("Existing again", "existing", ""),
        GroupDraft::new("Meeples", "meeples", "").with_cities(["Denver, CO", "Denver, CO"]),
        GroupDraft::new("Meeples twin", "meeples", ""),
    ];
    let inserted = repo.insert_groups(&drafts).unwrap();
    assert_eq!(inserted, 1);

    let id = repo.get_group_id_by_url("meeples").unwrap().unwrap();
    let meeples = repo.get_group(id).unwrap().unwrap();
    assert_eq!(meeples.name, "Meeples");
    assert_eq!(meeples.cities, vec!["Denver"]);

    let existing_id = repo.get_group_id_by_url("existing").unwrap().unwrap();
    assert_eq!(
        repo.get_group(existing_id).unwrap().unwrap().name,
        "Existing"
    );
    assert_eq!(repo.insert_groups(&drafts).unwrap(), 0);
}

#[test]
fn insert_inside_caller_transaction_follows_its_outcome() {
    let conn = open_db_in_memory().unwrap();
    let creator = standard_user(&conn, "creator@example.com");

    let tx = conn.unchecked_transaction().unwrap();
    {
        let repo = SqliteGroupsRepository::new(&tx);
        repo.insert_group(&creator, &GroupDraft::new("Draft", "draft", ""))
            .unwrap();
    }
    tx.rollback().unwrap();

    let repo = SqliteGroupsRepository::new(&conn);
    assert_eq!(repo.get_group_id_by_url("draft").unwrap(), None);
}

#[test]
fn insert_groups_keeps_earlier_groups_when_a_later_draft_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupsRepository::new(&conn);

    let drafts = vec![
        GroupDraft::new("First", "first", "").with_cities(["Reno, NV"]),
        GroupDraft::new("Broken", "broken", "").with_cities(["Reno, NV", ", NV"]),
        GroupDraft::new("Never", "never", ""),
    ];
    let err = repo.insert_groups(&drafts).unwrap_err();
    assert!(matches!(err, RepoError::InvalidAddress(ref city) if city == ", NV"));

    let first = repo.get_group_id_by_url("first").unwrap().unwrap();
    assert_eq!(repo.get_group(first).unwrap().unwrap().cities, vec!["Reno"]);
    assert_eq!(repo.get_group_id_by_url("broken").unwrap(), None);
    assert_eq!(repo.get_group_id_by_url("never").unwrap(), None);

    let linked: i64 = conn
        .query_row("SELECT COUNT(*) FROM location_group_map;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(linked, 1);
}

#[test]
fn cities_with_dotted_states_or_extra_commas_are_linked() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupsRepository::new(&conn);

    let drafts = vec![GroupDraft::new("Capital Gamers", "capital", "")
        .with_cities(["Washington, D.C.", "Arlington, Virginia", "Fairfax, VA, US 1"])];
    assert_eq!(repo.insert_groups(&drafts).unwrap(), 1);

    let id = repo.get_group_id_by_url("capital").unwrap().unwrap();
    assert_eq!(
        repo.get_group(id).unwrap().unwrap().cities,
        vec!["Arlington", "Fairfax, VA, US 1", "Washington"]
    );
}
