// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider configuration records.

use courier_core::CourierError;
use courier_core::types::{ConnectionStatus, NewProvider, ProviderOverview, ProviderRecord};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, params};
use serde_json::{Map, Value};

use crate::database::Database;
use crate::queries::parse_text;

const PROVIDER_COLUMNS: &str = "provider_code, provider_name, provider_type, is_active, config,
     connection_status, created_at, updated_at";

fn row_to_provider(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProviderRecord> {
    let config: String = row.get(4)?;
    let config: Map<String, Value> = serde_json::from_str(&config)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    let connection_status: String = row.get(5)?;
    Ok(ProviderRecord {
        provider_code: row.get(0)?,
        provider_name: row.get(1)?,
        provider_type: row.get(2)?,
        is_active: row.get(3)?,
        config,
        connection_status: parse_text(5, &connection_status)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn config_json(config: &Map<String, Value>) -> String {
    Value::Object(config.clone()).to_string()
}

/// All providers ordered by name, each joined with its most recent attempt.
pub async fn list_providers(db: &Database) -> Result<Vec<ProviderOverview>, CourierError> {
    db.connection()
        .call(|conn| -> Result<Vec<ProviderOverview>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "WITH latest AS (
                    SELECT provider, status, response_code, attempted_at,
                           ROW_NUMBER() OVER (
                               PARTITION BY provider ORDER BY attempted_at DESC, id DESC
                           ) AS rn
                    FROM delivery_attempts
                 )
                 SELECT p.provider_code, p.provider_name, p.provider_type, p.is_active, p.config,
                        p.connection_status, p.created_at, p.updated_at,
                        l.status, l.response_code, l.attempted_at
                 FROM providers p
                 LEFT JOIN latest l ON l.provider = p.provider_code AND l.rn = 1
                 ORDER BY p.provider_name ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                let last_status: Option<String> = row.get(8)?;
                Ok(ProviderOverview {
                    provider: row_to_provider(row)?,
                    last_attempt_status: last_status
                        .map(|s| parse_text(8, &s))
                        .transpose()?,
                    last_response_code: row.get(9)?,
                    last_attempt_at: row.get(10)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a provider by code.
pub async fn get_provider(db: &Database, code: &str) -> Result<Option<ProviderRecord>, CourierError> {
    let code = code.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<ProviderRecord>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {PROVIDER_COLUMNS} FROM providers WHERE provider_code = ?1"),
                params![code],
                row_to_provider,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert an active provider. Returns `None` when the code already exists.
pub async fn create_provider(
    db: &Database,
    provider: &NewProvider,
) -> Result<Option<ProviderRecord>, CourierError> {
    let provider = provider.clone();
    db.connection()
        .call(move |conn| -> Result<Option<ProviderRecord>, rusqlite::Error> {
            let status = if provider.config.is_empty() {
                ConnectionStatus::NotConfigured
            } else {
                ConnectionStatus::Configured
            };
            conn.query_row(
                &format!(
                    "INSERT INTO providers
                        (provider_code, provider_name, provider_type, is_active, config,
                         connection_status)
                     VALUES (?1, ?2, ?3, 1, ?4, ?5)
                     ON CONFLICT(provider_code) DO NOTHING
                     RETURNING {PROVIDER_COLUMNS}"
                ),
                params![
                    provider.provider_code,
                    provider.provider_name,
                    provider.provider_type,
                    config_json(&provider.config),
                    status.to_string(),
                ],
                row_to_provider,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Replace a provider's config and mark it active and `configured`.
pub async fn update_provider_config(
    db: &Database,
    code: &str,
    config: &Map<String, Value>,
) -> Result<Option<ProviderRecord>, CourierError> {
    let code = code.to_string();
    let config = config_json(config);
    db.connection()
        .call(move |conn| -> Result<Option<ProviderRecord>, rusqlite::Error> {
            conn.query_row(
                &format!(
                    "UPDATE providers SET
                        config = ?1,
                        is_active = 1,
                        connection_status = 'configured',
                        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE provider_code = ?2
                     RETURNING {PROVIDER_COLUMNS}"
                ),
                params![config, code],
                row_to_provider,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a provider, returning the removed row.
pub async fn delete_provider(
    db: &Database,
    code: &str,
) -> Result<Option<ProviderRecord>, CourierError> {
    let code = code.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<ProviderRecord>, rusqlite::Error> {
            conn.query_row(
                &format!("DELETE FROM providers WHERE provider_code = ?1 RETURNING {PROVIDER_COLUMNS}"),
                params![code],
                row_to_provider,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
