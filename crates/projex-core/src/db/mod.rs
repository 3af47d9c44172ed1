//! SQLite storage: connection setup, schema, query builders and the
//! row-streaming fetcher.
//!
//! Connections are opened with `foreign_keys = ON` and a 5s busy timeout.
//! The browser only reads, so the journal mode is left as created.

mod fetch;
pub mod migrations;
pub mod projects;
pub mod query;
pub mod schema;
pub mod sql;

pub use fetch::{FetchError, RecordFetcher, SqliteFetcher};

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Busy timeout used for every connection.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the project database, apply runtime pragmas, and
/// migrate the schema to the latest version.
///
/// # Errors
///
/// Returns an error if opening, configuring or migrating the database fails.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create database directory {}", parent.display()))?;
    }

    let mut conn =
        Connection::open(path).with_context(|| format!("open database {}", path.display()))?;

    configure_connection(&conn).context("configure sqlite pragmas")?;
    let version = migrations::migrate(&mut conn).context("apply schema migrations")?;
    tracing::debug!(path = %path.display(), version, "database ready");

    Ok(conn)
}

/// The configured database file is absent.
#[derive(Debug, thiserror::Error)]
#[error("database {} does not exist", path.display())]
pub struct DatabaseMissing {
    pub path: PathBuf,
}

/// Open an existing database without creating it.
///
/// # Errors
///
/// [`DatabaseMissing`] if the file does not exist, otherwise as
/// [`open_database`].
pub fn open_existing(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        return Err(DatabaseMissing {
            path: path.to_path_buf(),
        }
        .into());
    }
    open_database(path)
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}
