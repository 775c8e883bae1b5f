use racetimer_core::db::schema::{schema_version, SCHEMA_VERSION};
use racetimer_core::db::{open_db, open_db_in_memory, DbError};
use racetimer_core::{PersistentStore, RegistrySession, SqliteKvStore};
use rusqlite::Connection;

fn updated_at(conn: &Connection, key: &str) -> i64 {
    conn.query_row(
        "SELECT updated_at FROM kv_entries WHERE key = ?1;",
        [key],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn upsert_replaces_value_and_stamps_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();

    store.save("nextParticipantNumber", "2").unwrap();
    conn.execute(
        "UPDATE kv_entries SET updated_at = 0 WHERE key = 'nextParticipantNumber';",
        [],
    )
    .unwrap();
    store.save("nextParticipantNumber", "7").unwrap();

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(
        store.load("nextParticipantNumber").unwrap().as_deref(),
        Some("7")
    );
    assert!(updated_at(&conn, "nextParticipantNumber") > 1_577_836_800_000);
}

#[test]
fn column_default_fills_updated_at_for_raw_inserts() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES ('participants', '[]');",
        [],
    )
    .unwrap();

    assert!(updated_at(&conn, "participants") > 1_577_836_800_000);
}

#[test]
fn roster_written_before_reopen_is_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.db");

    {
        let conn = open_db(&path).unwrap();
        let mut session = RegistrySession::open(SqliteKvStore::try_new(&conn).unwrap()).unwrap();
        let created = session.create(2).unwrap();
        session.rename(created[1].id, "Ana").unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    let session = RegistrySession::open(SqliteKvStore::try_new(&conn).unwrap()).unwrap();
    assert_eq!(session.participants().len(), 2);
    assert_eq!(session.participants()[1].name, "Ana");
    assert_eq!(session.next_number(), 3);
}

#[test]
fn newer_layout_is_rejected_and_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), 999);
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = 'kv_entries';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 0);
}

#[test]
fn open_failure_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("roster.db");

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::Open { .. }));
    assert!(err.to_string().contains("roster.db"));
}
