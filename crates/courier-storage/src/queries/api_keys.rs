// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! API key management and verification.

use courier_core::CourierError;
use courier_core::types::ApiKeyRecord;
use rusqlite::params;

use crate::database::Database;

const KEY_PREFIX: &str = "ek_live_";

fn row_to_key(row: &rusqlite::Row<'_>) -> rusqlite::Result<ApiKeyRecord> {
    Ok(ApiKeyRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        api_key: row.get(2)?,
        is_active: row.get(3)?,
        created_at: row.get(4)?,
        last_used_at: row.get(5)?,
    })
}

fn generate_key() -> String {
    format!("{KEY_PREFIX}{}", uuid::Uuid::new_v4().simple())
}

/// Create a new active key with a freshly generated secret.
pub async fn create_api_key(db: &Database, name: &str) -> Result<ApiKeyRecord, CourierError> {
    let name = name.to_string();
    let key = generate_key();
    db.connection()
        .call(move |conn| -> Result<ApiKeyRecord, rusqlite::Error> {
            conn.query_row(
                "INSERT INTO api_keys (name, api_key) VALUES (?1, ?2)
                 RETURNING id, name, api_key, is_active, created_at, last_used_at",
                params![name, key],
                row_to_key,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All keys, oldest first.
pub async fn list_api_keys(db: &Database) -> Result<Vec<ApiKeyRecord>, CourierError> {
    db.connection()
        .call(|conn| -> Result<Vec<ApiKeyRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, name, api_key, is_active, created_at, last_used_at
                 FROM api_keys ORDER BY id ASC",
            )?;
            let rows = stmt.query_map([], row_to_key)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Deactivate a key. Returns `false` if the key does not exist.
pub async fn revoke_api_key(db: &Database, api_key: &str) -> Result<bool, CourierError> {
    let api_key = api_key.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE api_keys SET is_active = 0 WHERE api_key = ?1",
                params![api_key],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Check that a key exists and is active; stamps `last_used_at` on success.
pub async fn verify_api_key(db: &Database, api_key: &str) -> Result<bool, CourierError> {
    let api_key = api_key.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE api_keys SET last_used_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE api_key = ?1 AND is_active = 1",
                params![api_key],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
