//! SQLite-backed warehouse store.
//!
//! `SqliteWarehouse` owns the single connection of a run and manages schema
//! and transactions. `SqliteLoader` implements `WarehouseStore` over any
//! borrowed connection, including an open transaction.

use super::models::*;
use super::schema::{
    ARTISTS_TABLE, SONGPLAYS_TABLE, SONGS_TABLE, TIME_TABLE, USERS_TABLE,
    WAREHOUSE_VERSIONED_SCHEMAS,
};
use super::trait_def::{StoreError, WarehouseStore};
use crate::sqlite_persistence::VersionedSchema;
use anyhow::{bail, Context, Result};
use rusqlite::{params, types::Type, Connection, Statement, Transaction};
use std::path::Path;
use tracing::{debug, info};

fn latest_schema() -> &'static VersionedSchema {
    &WAREHOUSE_VERSIONED_SCHEMAS[WAREHOUSE_VERSIONED_SCHEMAS.len() - 1]
}

/// The warehouse database of one ingestion run.
pub struct SqliteWarehouse {
    conn: Connection,
}

impl SqliteWarehouse {
    /// Opens (or creates) the warehouse database at `db_path`.
    ///
    /// A database without tables gets the latest schema, an existing one must
    /// validate against it.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        Self::init(Self::connect(db_path.as_ref())?)
    }

    /// Opens the database at `db_path` and recreates the warehouse tables,
    /// empty. Existing tables are dropped without being validated first.
    pub fn open_reset<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Self::connect(db_path.as_ref())?;
        conn.pragma_update(None, "foreign_keys", true)?;
        let mut warehouse = SqliteWarehouse { conn };
        warehouse.reset()?;
        Ok(warehouse)
    }

    fn connect(db_path: &Path) -> Result<Connection> {
        Connection::open_with_flags(
            db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open warehouse database {:?}", db_path))
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;

        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )?;

        let schema = latest_schema();
        if table_count == 0 {
            info!("Creating warehouse schema at version {}", schema.version);
            schema.create(&conn)?;
        } else {
            match VersionedSchema::read_version(&conn)? {
                Some(version) if version > schema.version => {
                    bail!("Database version {} is too new", version)
                }
                _ => schema
                    .validate(&conn)
                    .context("Existing database does not match the warehouse schema")?,
            }
        }

        Ok(SqliteWarehouse { conn })
    }

    /// Drops all warehouse tables and creates them again, empty.
    pub fn reset(&mut self) -> Result<()> {
        info!("Resetting warehouse schema");
        let tx = self.conn.transaction()?;
        latest_schema().reset(&tx)?;
        tx.commit()?;
        Ok(())
    }

    /// Starts the transaction a single file is loaded in.
    pub fn begin(&mut self) -> Result<Transaction<'_>, StoreError> {
        self.conn.transaction().map_err(StoreError::Transaction)
    }

    /// A loader writing straight to the connection, one implicit
    /// transaction per statement.
    pub fn loader(&self) -> SqliteLoader<'_> {
        SqliteLoader::new(&self.conn)
    }

    pub fn table_counts(&self) -> Result<TableCounts, StoreError> {
        let count = |table: &'static str| -> Result<usize, StoreError> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
                    r.get::<_, i64>(0)
                })
                .map(|n| n as usize)
                .map_err(|e| StoreError::from_sqlite(table, e))
        };

        Ok(TableCounts {
            users: count(USERS_TABLE.name)?,
            songs: count(SONGS_TABLE.name)?,
            artists: count(ARTISTS_TABLE.name)?,
            time: count(TIME_TABLE.name)?,
            songplays: count(SONGPLAYS_TABLE.name)?,
        })
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<UserRow>, StoreError> {
        match self.conn.query_row(
            "SELECT user_id, first_name, last_name, gender, level FROM users WHERE user_id = ?1",
            params![user_id],
            |r| {
                Ok(UserRow {
                    user_id: r.get(0)?,
                    first_name: r.get(1)?,
                    last_name: r.get(2)?,
                    gender: r.get(3)?,
                    level: r.get(4)?,
                })
            },
        ) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::from_sqlite(USERS_TABLE.name, e)),
        }
    }

    pub fn get_song(&self, song_id: &str) -> Result<Option<SongRow>, StoreError> {
        match self.conn.query_row(
            "SELECT song_id, title, artist_id, year, duration FROM songs WHERE song_id = ?1",
            params![song_id],
            |r| {
                Ok(SongRow {
                    song_id: r.get(0)?,
                    title: r.get(1)?,
                    artist_id: r.get(2)?,
                    year: r.get(3)?,
                    duration: r.get(4)?,
                })
            },
        ) {
            Ok(song) => Ok(Some(song)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::from_sqlite(SONGS_TABLE.name, e)),
        }
    }

    /// All play events in insertion order.
    pub fn list_songplays(&self) -> Result<Vec<SongplayRow>, StoreError> {
        let table = SONGPLAYS_TABLE.name;
        let mut stmt = self
            .conn
            .prepare(
                "SELECT start_time, user_id, level, song_id, artist_id, session_id, location, user_agent
                 FROM songplays ORDER BY songplay_id",
            )
            .map_err(|e| StoreError::from_sqlite(table, e))?;

        let rows = stmt
            .query_map([], |r| {
                let start_time: String = r.get(0)?;
                Ok(SongplayRow {
                    start_time: parse_start_time(&start_time).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
                    })?,
                    user_id: r.get(1)?,
                    level: r.get(2)?,
                    song_id: r.get(3)?,
                    artist_id: r.get(4)?,
                    session_id: r.get(5)?,
                    location: r.get(6)?,
                    user_agent: r.get(7)?,
                })
            })
            .map_err(|e| StoreError::from_sqlite(table, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::from_sqlite(table, e))?;
        Ok(rows)
    }
}

/// A dimension row and how it is written to its table.
trait DimensionRow {
    const TABLE: &'static str;
    const KEY: &'static str;
    const COLUMNS: &'static [&'static str];
    const POLICY: ConflictPolicy;

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize>;

    fn upsert_sql() -> String {
        let placeholders: Vec<String> = (1..=Self::COLUMNS.len())
            .map(|i| format!("?{i}"))
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}) {}",
            Self::TABLE,
            Self::COLUMNS.join(", "),
            placeholders.join(", "),
            Self::POLICY.on_conflict_clause(Self::KEY)
        )
    }
}

impl DimensionRow for SongRow {
    const TABLE: &'static str = SONGS_TABLE.name;
    const KEY: &'static str = "song_id";
    const COLUMNS: &'static [&'static str] = &["song_id", "title", "artist_id", "year", "duration"];
    const POLICY: ConflictPolicy = SongRow::CONFLICT_POLICY;

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.song_id,
            self.title,
            self.artist_id,
            self.year,
            self.duration
        ])
    }
}

impl DimensionRow for ArtistRow {
    const TABLE: &'static str = ARTISTS_TABLE.name;
    const KEY: &'static str = "artist_id";
    const COLUMNS: &'static [&'static str] =
        &["artist_id", "name", "location", "longitude", "latitude"];
    const POLICY: ConflictPolicy = ArtistRow::CONFLICT_POLICY;

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.artist_id,
            self.name,
            self.location,
            self.longitude,
            self.latitude
        ])
    }
}

impl DimensionRow for UserRow {
    const TABLE: &'static str = USERS_TABLE.name;
    const KEY: &'static str = "user_id";
    const COLUMNS: &'static [&'static str] =
        &["user_id", "first_name", "last_name", "gender", "level"];
    const POLICY: ConflictPolicy = UserRow::CONFLICT_POLICY;

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.user_id,
            self.first_name,
            self.last_name,
            self.gender,
            self.level
        ])
    }
}

impl DimensionRow for TimeRow {
    const TABLE: &'static str = TIME_TABLE.name;
    const KEY: &'static str = "start_time";
    const COLUMNS: &'static [&'static str] =
        &["start_time", "hour", "day", "week", "month", "year", "weekday"];
    const POLICY: ConflictPolicy = TimeRow::CONFLICT_POLICY;

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            format_start_time(&self.start_time),
            self.hour,
            self.day,
            self.week,
            self.month,
            self.year,
            self.weekday_name()
        ])
    }
}

const INSERT_SONGPLAY_SQL: &str = "INSERT INTO songplays
    (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const FIND_SONG_IDENTITY_SQL: &str = "SELECT s.song_id, a.artist_id
    FROM songs s
    JOIN artists a ON a.artist_id = s.artist_id
    WHERE s.title = ?1 AND a.name = ?2 AND s.duration = ?3
    ORDER BY s.song_id
    LIMIT 1";

/// `WarehouseStore` over a borrowed connection. Each batch runs through one
/// cached prepared statement.
pub struct SqliteLoader<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteLoader<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        SqliteLoader { conn }
    }

    fn upsert_rows<R: DimensionRow>(&self, rows: &[R]) -> Result<usize, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let mut stmt = self
            .conn
            .prepare_cached(&R::upsert_sql())
            .map_err(|e| StoreError::from_sqlite(R::TABLE, e))?;

        let mut changed = 0;
        for row in rows {
            changed += row
                .execute(&mut stmt)
                .map_err(|e| StoreError::from_sqlite(R::TABLE, e))?;
        }
        debug!(
            "Upserted {} rows into {}, {} changed",
            rows.len(),
            R::TABLE,
            changed
        );
        Ok(changed)
    }
}

impl WarehouseStore for SqliteLoader<'_> {
    fn upsert_songs(&self, songs: &[SongRow]) -> Result<usize, StoreError> {
        self.upsert_rows(songs)
    }

    fn upsert_artists(&self, artists: &[ArtistRow]) -> Result<usize, StoreError> {
        self.upsert_rows(artists)
    }

    fn upsert_users(&self, users: &[UserRow]) -> Result<usize, StoreError> {
        self.upsert_rows(users)
    }

    fn upsert_times(&self, times: &[TimeRow]) -> Result<usize, StoreError> {
        self.upsert_rows(times)
    }

    fn insert_songplays(&self, songplays: &[SongplayRow]) -> Result<usize, StoreError> {
        let table = SONGPLAYS_TABLE.name;
        if songplays.is_empty() {
            return Ok(0);
        }
        let mut stmt = self
            .conn
            .prepare_cached(INSERT_SONGPLAY_SQL)
            .map_err(|e| StoreError::from_sqlite(table, e))?;

        let mut inserted = 0;
        for songplay in songplays {
            inserted += stmt
                .execute(params![
                    format_start_time(&songplay.start_time),
                    songplay.user_id,
                    songplay.level,
                    songplay.song_id,
                    songplay.artist_id,
                    songplay.session_id,
                    songplay.location,
                    songplay.user_agent
                ])
                .map_err(|e| StoreError::from_sqlite(table, e))?;
        }
        debug!("Inserted {} songplays", inserted);
        Ok(inserted)
    }

    fn find_song_identity(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongIdentity>, StoreError> {
        let table = SONGS_TABLE.name;
        let mut stmt = self
            .conn
            .prepare_cached(FIND_SONG_IDENTITY_SQL)
            .map_err(|e| StoreError::from_sqlite(table, e))?;

        match stmt.query_row(params![title, artist_name, duration], |r| {
            Ok(SongIdentity {
                song_id: r.get(0)?,
                artist_id: r.get(1)?,
            })
        }) {
            Ok(identity) => Ok(Some(identity)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::from_sqlite(table, e)),
        }
    }
}
