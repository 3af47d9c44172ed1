use rusqlite::Connection;
use rusqlite::types::Value;
use tracing::debug;

use crate::model::Row;

/// Errors raised by a [`RecordFetcher`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The query builder produced no SQL, usually because no filter is
    /// registered for the query hook.
    #[error("query text is empty; is a query builder registered?")]
    EmptyQuery,

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Executes query text and streams result rows to a callback.
///
/// Rows arrive in storage order; ordering is the query's business. The
/// callback may fail with the caller's own error type, which stops
/// iteration and is returned unchanged.
pub trait RecordFetcher {
    /// Run `query`, calling `on_row` once per result row. Returns the
    /// number of rows delivered.
    ///
    /// # Errors
    ///
    /// Storage errors surface as `E::from(FetchError)`; callback errors are
    /// returned as-is.
    fn execute<E, F>(&self, query: &str, on_row: F) -> Result<usize, E>
    where
        E: From<FetchError>,
        F: FnMut(Row) -> Result<(), E>;
}

/// [`RecordFetcher`] over a borrowed SQLite connection.
#[derive(Debug, Clone, Copy)]
pub struct SqliteFetcher<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteFetcher<'c> {
    #[must_use]
    pub const fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl RecordFetcher for SqliteFetcher<'_> {
    fn execute<E, F>(&self, query: &str, mut on_row: F) -> Result<usize, E>
    where
        E: From<FetchError>,
        F: FnMut(Row) -> Result<(), E>,
    {
        if query.trim().is_empty() {
            return Err(FetchError::EmptyQuery.into());
        }

        let mut stmt = self.conn.prepare(query).map_err(FetchError::from)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt.query([]).map_err(FetchError::from)?;
        let mut count = 0_usize;
        while let Some(row) = rows.next().map_err(FetchError::from)? {
            let mut mapped = Row::new();
            for (index, column) in columns.iter().enumerate() {
                let value: Value = row.get(index).map_err(FetchError::from)?;
                mapped.insert(column.clone(), value);
            }
            on_row(mapped)?;
            count += 1;
        }

        debug!(rows = count, "query executed");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute_batch(
            "CREATE TABLE t (id INTEGER, name TEXT);
             INSERT INTO t VALUES (1, 'a'), (2, NULL), (3, 'c');",
        )
        .expect("seed");
        conn
    }

    #[test]
    fn streams_rows_by_column_name() {
        let conn = conn();
        let mut seen = Vec::new();
        let count = SqliteFetcher::new(&conn)
            .execute::<FetchError, _>("SELECT id, name AS label FROM t ORDER BY id", |row| {
                seen.push(row);
                Ok(())
            })
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(seen[0]["id"], Value::Integer(1));
        assert_eq!(seen[0]["label"], Value::Text("a".into()));
        assert_eq!(seen[1]["label"], Value::Null);
    }

    #[test]
    fn callback_error_stops_iteration() {
        #[derive(Debug)]
        enum TestError {
            Fetch,
            Stop,
        }
        impl From<FetchError> for TestError {
            fn from(_: FetchError) -> Self {
                Self::Fetch
            }
        }

        let conn = conn();
        let mut calls = 0;
        let result = SqliteFetcher::new(&conn).execute("SELECT id FROM t", |_| {
            calls += 1;
            Err(TestError::Stop)
        });
        assert!(matches!(result, Err(TestError::Stop)));
        assert_eq!(calls, 1);
    }

    #[test]
    fn empty_and_invalid_queries_are_errors() {
        let conn = conn();
        let fetcher = SqliteFetcher::new(&conn);
        assert!(matches!(
            fetcher.execute::<FetchError, _>("  ", |_| Ok(())),
            Err(FetchError::EmptyQuery)
        ));
        assert!(matches!(
            fetcher.execute::<FetchError, _>("SELECT nope FROM missing", |_| Ok(())),
            Err(FetchError::Sqlite(_))
        ));
    }
}
