use rusqlite::Connection;
use tabletop_core::db::migrations::latest_version;
use tabletop_core::db::{open_db, open_db_in_memory, DbError, DbTarget, SqliteConnectionProvider};
use tabletop_core::{CommunityServices, RepoError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "users",
        "groups",
        "locations",
        "group_admin_data",
        "location_group_map",
        "game_restaurants",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tabletop.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "groups");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn deleting_a_group_cascades_to_role_and_city_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO users (id, email, site_role) VALUES (1, 'a@example.com', 'standard');
         INSERT INTO groups (id, name, url, summary) VALUES (10, 'Dice', 'dice', '');
         INSERT INTO locations (id, city, state) VALUES (5, 'Austin', 'TX');
         INSERT INTO group_admin_data (user_id, group_id, group_admin_level)
            VALUES (1, 10, 'group_admin');
         INSERT INTO location_group_map (location_id, group_id) VALUES (5, 10);
         DELETE FROM groups WHERE id = 10;",
    )
    .unwrap();

    assert_eq!(count(&conn, "group_admin_data"), 0);
    assert_eq!(count(&conn, "location_group_map"), 0);
    assert_eq!(count(&conn, "locations"), 1);
}

#[test]
fn services_reject_connections_without_migrations() {
    let raw = Connection::open_in_memory().unwrap();
    let err = CommunityServices::from_provider(&raw).err().unwrap();
    match err {
        RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        } => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn file_provider_opens_migrated_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("provided.db");
    let provider = SqliteConnectionProvider::file(&path);
    assert_eq!(provider.target(), &DbTarget::File(path.clone()));

    let services = CommunityServices::from_provider(&provider).unwrap();
    assert_eq!(schema_version(services.connection()), latest_version());
    assert!(path.exists());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
