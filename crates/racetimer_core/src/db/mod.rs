//! SQLite database backing the roster key-value store.
//!
//! A roster database holds one table, `kv_entries`, and records its layout
//! version in `PRAGMA user_version`. Connections handed out by `open_db`
//! are always at `schema::SCHEMA_VERSION`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// The database file could not be opened or created.
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    /// Statement failure on an open connection.
    Sqlite(rusqlite::Error),
    /// File was written by a build with a newer roster layout.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "cannot open roster database {}: {source}", path.display())
            }
            Self::Sqlite(err) => write!(f, "roster database error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "roster database layout v{found} is newer than this build (v{supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
