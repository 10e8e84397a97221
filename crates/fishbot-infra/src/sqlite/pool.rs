//! Split SQLite pool for the session database.
//!
//! Every dialogue turn loads a session and saves it back. Loads go
//! through a read-only pool, saves through a single writer connection;
//! WAL journal mode keeps loads from blocking while a save commits.
//! Migrations run on the writer before the reader pool opens.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

const READER_CONNECTIONS: u32 = 8;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Reader/writer pair over one SQLite file.
#[derive(Clone)]
pub struct DatabasePool {
    /// Read-only pool serving session loads.
    pub reader: SqlitePool,
    /// Single-connection pool for saves and migrations.
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open both pools against `database_url` and bring the schema up
    /// to date.
    ///
    /// The writer connects first and applies migrations; the reader
    /// pool opens against the migrated schema.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;

        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(options.read_only(true))
            .await?;

        Ok(Self { reader, writer })
    }
}
