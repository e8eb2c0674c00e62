//! Location repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Append accepted samples to the local `locations` log.
//! - Serve history in capture order and track remote-upload state.
//!
//! # Invariants
//! - Write paths call `LocationSample::validate()` before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Listing order is always `timestamp ASC, id ASC`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::sample::{LocationId, LocationSample, SampleValidationError, StoredLocation};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const LOCATION_SELECT_SQL: &str = "SELECT
    id,
    latitude,
    longitude,
    timestamp,
    synced_at
FROM locations";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for location persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(SampleValidationError),
    Db(DbError),
    NotFound(LocationId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "location not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted location data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_db first"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SampleValidationError> for RepoError {
    fn from(value: SampleValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing stored locations.
#[derive(Debug, Clone, Default)]
pub struct LocationListQuery {
    /// Only rows captured at or after this epoch millisecond.
    pub since_ms: Option<i64>,
    /// Only rows not yet acknowledged by the remote store.
    pub only_unsynced: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for the local location log.
pub trait LocationRepository {
    fn insert_location(&self, sample: &LocationSample) -> RepoResult<LocationId>;
    fn get_location(&self, id: LocationId) -> RepoResult<Option<StoredLocation>>;
    fn list_locations(&self, query: &LocationListQuery) -> RepoResult<Vec<StoredLocation>>;
    /// Marks rows as uploaded. Fails with `NotFound` on the first unknown id
    /// and leaves every row untouched in that case.
    fn mark_synced(&self, ids: &[LocationId], synced_at_ms: i64) -> RepoResult<usize>;
    fn count_locations(&self) -> RepoResult<u64>;
}

/// SQLite-backed location repository.
pub struct SqliteLocationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLocationRepository<'conn> {
    /// Creates a repository over a connection returned by `open_db`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl LocationRepository for SqliteLocationRepository<'_> {
    fn insert_location(&self, sample: &LocationSample) -> RepoResult<LocationId> {
        sample.validate()?;

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO locations (id, latitude, longitude, timestamp)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                sample.latitude,
                sample.longitude,
                sample.captured_at_ms,
            ],
        )?;

        Ok(id)
    }

    fn get_location(&self, id: LocationId) -> RepoResult<Option<StoredLocation>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LOCATION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_location_row(row)?));
        }
        Ok(None)
    }

    fn list_locations(&self, query: &LocationListQuery) -> RepoResult<Vec<StoredLocation>> {
        let mut sql = format!("{LOCATION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if query.only_unsynced {
            sql.push_str(" AND synced_at IS NULL");
        }

        if let Some(since_ms) = query.since_ms {
            sql.push_str(" AND timestamp >= ?");
            bind_values.push(Value::Integer(since_ms));
        }

        sql.push_str(" ORDER BY timestamp ASC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut locations = Vec::new();
        while let Some(row) = rows.next()? {
            locations.push(parse_location_row(row)?);
        }

        Ok(locations)
    }

    fn mark_synced(&self, ids: &[LocationId], synced_at_ms: i64) -> RepoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut changed = 0;
        {
            let mut stmt = tx.prepare("UPDATE locations SET synced_at = ?1 WHERE id = ?2;")?;
            for id in ids {
                if stmt.execute(params![synced_at_ms, id.to_string()])? == 0 {
                    // Dropping `tx` without commit rolls back earlier updates.
                    return Err(RepoError::NotFound(*id));
                }
                changed += 1;
            }
        }
        tx.commit()?;

        Ok(changed)
    }

    fn count_locations(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM locations;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn parse_location_row(row: &Row<'_>) -> RepoResult<StoredLocation> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in locations.id"))
    })?;

    let location = StoredLocation {
        id,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        timestamp_ms: row.get("timestamp")?,
        synced_at_ms: row.get("synced_at")?,
    };

    LocationSample::new(
        location.latitude,
        location.longitude,
        None,
        location.timestamp_ms,
    )
    .map_err(|err| RepoError::InvalidData(format!("location {id}: {err}")))?;

    Ok(location)
}
