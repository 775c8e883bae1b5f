//! Roster database layout and its upgrade steps.
//!
//! Step `n` in `LAYOUT_STEPS` upgrades a file from version `n` to `n + 1`.
//! Steps are only ever appended.

use super::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

const LAYOUT_STEPS: &[&str] = &[include_str!("sql/0001_kv_entries.sql")];

/// Layout version written by this build.
pub const SCHEMA_VERSION: u32 = LAYOUT_STEPS.len() as u32;

/// Reads the layout version recorded in the file.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Brings the file up to `SCHEMA_VERSION` in one transaction.
///
/// # Errors
/// - `SchemaTooNew` when the file is ahead of this build. The file is left
///   unchanged so a newer build can still read the roster.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    if found > SCHEMA_VERSION {
        warn!(
            "event=db_schema module=db status=rejected found={found} supported={SCHEMA_VERSION}"
        );
        return Err(DbError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        });
    }
    if found == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (step, sql) in LAYOUT_STEPS.iter().enumerate().skip(found as usize) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", step as u32 + 1)?;
    }
    tx.commit()?;

    info!("event=db_schema module=db status=upgraded from={found} to={SCHEMA_VERSION}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_schema, schema_version, SCHEMA_VERSION};
    use rusqlite::Connection;

    #[test]
    fn blank_file_is_upgraded_once() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);

        ensure_schema(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES ('nextParticipantNumber', '4');",
            [],
        )
        .unwrap();

        ensure_schema(&mut conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
        let kept: String = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = 'nextParticipantNumber';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(kept, "4");
    }
}
