// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use courier_core::CourierError;
use tracing::debug;

use crate::migrations;

/// Handle to the single SQLite connection shared by all query modules.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path`, applies PRAGMAs and
    /// runs pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, CourierError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(CourierError::storage)?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(CourierError::storage)?;

        conn.call(move |conn| -> Result<(), CourierError> {
            let journal = if wal_mode { "WAL" } else { "DELETE" };
            conn.execute_batch(&format!(
                "PRAGMA journal_mode = {journal};
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;"
            ))
            .map_err(CourierError::storage)?;
            migrations::run_migrations(conn)
        })
        .await
        .map_err(|e| match e {
            tokio_rusqlite::Error::Error(inner) => inner,
            other => CourierError::storage(other.to_string()),
        })?;

        debug!(path, wal_mode, "database opened and migrated");
        Ok(Self { conn })
    }

    /// The connection every query goes through.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }
}

/// Converts a tokio-rusqlite call error into a storage error.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> CourierError {
    CourierError::Storage {
        source: Box::new(e),
    }
}
