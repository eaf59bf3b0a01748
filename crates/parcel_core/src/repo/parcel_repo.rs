//! Parcel store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the five parcel operations over the `parcel` table.
//! - Map rows back to `Parcel` values.
//!
//! # Invariants
//! - The store borrows an open connection and never owns its lifetime.
//! - Each operation is a single SQL statement.
//!
//! # Gotcha
//! `set_address` and `delete` only touch rows whose status is `registered`.
//! When the precondition fails, or the number does not exist, the call
//! still returns `Ok(())`. Read the parcel back if the outcome matters.

use crate::db::DbError;
use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use log::{debug, error};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by parcel store operations.
#[derive(Debug)]
pub enum RepoError {
    /// No row carries the requested number.
    NotFound(ParcelNumber),
    /// Any other storage failure, tagged with the failing operation.
    Storage {
        operation: &'static str,
        target: String,
        source: DbError,
    },
    /// A stored row cannot be mapped to a `Parcel`.
    InvalidData(String),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(number) => write!(f, "parcel not found: {number}"),
            Self::Storage {
                operation,
                target,
                source,
            } => write!(f, "parcel {operation} failed for {target}: {source}"),
            Self::InvalidData(message) => write!(f, "invalid persisted parcel data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage { source, .. } => Some(source),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

/// Data access contract for parcels.
pub trait ParcelRepository {
    /// Inserts a parcel and returns its assigned number; `parcel.number` is ignored.
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber>;
    /// Loads one parcel, or `RepoError::NotFound`.
    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel>;
    /// Lists a client's parcels ordered by number; empty when the client has none.
    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;
    /// Changes the address of a `registered` parcel; silent no-op otherwise.
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()>;
    /// Changes the status regardless of the current one.
    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()>;
    /// Removes a `registered` parcel; silent no-op otherwise.
    fn delete(&self, number: ParcelNumber) -> RepoResult<()>;
}

/// SQLite-backed parcel store.
pub struct SqliteParcelStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Updates the address when the parcel is still registered.
    ///
    /// Returns the number of affected rows (0 or 1).
    pub fn update_address_if_registered(
        &self,
        number: ParcelNumber,
        address: &str,
    ) -> RepoResult<usize> {
        self.conn
            .execute(
                "UPDATE parcel
                 SET address = ?1
                 WHERE number = ?2 AND status = ?3;",
                params![address, number, ParcelStatus::Registered.as_str()],
            )
            .map_err(storage_error("set_address", number))
    }

    /// Deletes the parcel when it is still registered.
    ///
    /// Returns the number of affected rows (0 or 1).
    pub fn delete_if_registered(&self, number: ParcelNumber) -> RepoResult<usize> {
        self.conn
            .execute(
                "DELETE FROM parcel WHERE number = ?1 AND status = ?2;",
                params![number, ParcelStatus::Registered.as_str()],
            )
            .map_err(storage_error("delete", number))
    }
}

impl ParcelRepository for SqliteParcelStore<'_> {
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        self.conn
            .execute(
                "INSERT INTO parcel (client, status, address, created_at)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    parcel.client,
                    parcel.status.as_str(),
                    parcel.address.as_str(),
                    parcel.created_at.as_str(),
                ],
            )
            .map_err(storage_error("add", format!("client {}", parcel.client)))?;

        let number = self.conn.last_insert_rowid();
        debug!(
            "event=parcel_add module=repo status=ok number={} client={}",
            number, parcel.client
        );
        Ok(number)
    }

    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        let on_error = || storage_error("get", number);
        let mut stmt = self
            .conn
            .prepare(&format!("{PARCEL_SELECT_SQL} WHERE number = ?1;"))
            .map_err(on_error())?;

        let mut rows = stmt.query([number]).map_err(on_error())?;
        let Some(row) = rows.next().map_err(on_error())? else {
            return Err(RepoError::NotFound(number));
        };
        let parcel = parse_parcel_row(row).map_err(|err| with_operation(err, "get", number))?;
        Ok(parcel)
    }

    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let target = format!("client {client}");
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{PARCEL_SELECT_SQL} WHERE client = ?1 ORDER BY number ASC;"
            ))
            .map_err(storage_error("get_by_client", &target))?;

        let mut rows = stmt
            .query([client])
            .map_err(storage_error("get_by_client", &target))?;
        let mut parcels = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(storage_error("get_by_client", &target))?
        {
            parcels.push(
                parse_parcel_row(row)
                    .map_err(|err| with_operation(err, "get_by_client", &target))?,
            );
        }

        Ok(parcels)
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        // Zero affected rows means the parcel is gone or no longer registered;
        // both are reported as success.
        let changed = self.update_address_if_registered(number, address)?;
        debug!(
            "event=parcel_set_address module=repo status=ok number={} updated={}",
            number,
            changed > 0
        );
        Ok(())
    }

    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()> {
        self.conn
            .execute(
                "UPDATE parcel SET status = ?1 WHERE number = ?2;",
                params![status.as_str(), number],
            )
            .map_err(storage_error("set_status", number))?;
        debug!(
            "event=parcel_set_status module=repo status=ok number={} new_status={}",
            number, status
        );
        Ok(())
    }

    fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        // Same policy as `set_address`: a skipped delete is not an error.
        let changed = self.delete_if_registered(number)?;
        debug!(
            "event=parcel_delete module=repo status=ok number={} deleted={}",
            number,
            changed > 0
        );
        Ok(())
    }
}

fn storage_error(
    operation: &'static str,
    target: impl Display,
) -> impl FnOnce(rusqlite::Error) -> RepoError {
    let target = target.to_string();
    move |err| {
        error!(
            "event=parcel_{} module=repo status=error target=\"{}\" error={}",
            operation, target, err
        );
        RepoError::Storage {
            operation,
            target,
            source: DbError::Sqlite(err),
        }
    }
}

// Row mapping runs without knowing the caller; tag driver failures here.
fn with_operation(err: RepoError, operation: &'static str, target: impl Display) -> RepoError {
    match err {
        RepoError::Storage { source, .. } => RepoError::Storage {
            operation,
            target: target.to_string(),
            source,
        },
        other => other,
    }
}

fn parse_parcel_row(row: &Row<'_>) -> RepoResult<Parcel> {
    let read = |err: rusqlite::Error| storage_error("read_row", "parcel row")(err);

    let status_text: String = row.get("status").map_err(read)?;
    let status = status_text.parse::<ParcelStatus>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in parcel.status"
        ))
    })?;

    Ok(Parcel {
        number: row.get("number").map_err(read)?,
        client: row.get("client").map_err(read)?,
        status,
        address: row.get("address").map_err(read)?,
        created_at: row.get("created_at").map_err(read)?,
    })
}
