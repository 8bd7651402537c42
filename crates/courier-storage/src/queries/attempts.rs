// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery-attempt log. Rows are only ever inserted.

use courier_core::CourierError;
use courier_core::types::{DeliveryAttempt, MessageStatus, NewAttempt, StatusTransition};
use rusqlite::params;

use crate::database::Database;
use crate::queries::{get_u64, parse_text};

fn insert_row(conn: &rusqlite::Connection, attempt: &NewAttempt) -> rusqlite::Result<()> {
    let duration_ms = i64::try_from(attempt.duration_ms).unwrap_or(i64::MAX);
    conn.execute(
        "INSERT INTO delivery_attempts
            (message_id, attempt_number, provider, status, response_code,
             response_body, error_message, duration_ms)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            attempt.message_id,
            attempt.attempt_number,
            attempt.provider,
            attempt.status.to_string(),
            attempt.response_code,
            attempt.response_body,
            attempt.error_message,
            duration_ms,
        ],
    )?;
    Ok(())
}

fn row_to_attempt(row: &rusqlite::Row<'_>) -> rusqlite::Result<DeliveryAttempt> {
    let status: String = row.get(4)?;
    Ok(DeliveryAttempt {
        id: row.get(0)?,
        message_id: row.get(1)?,
        attempt_number: row.get(2)?,
        provider: row.get(3)?,
        status: parse_text(4, &status)?,
        response_code: row.get(5)?,
        response_body: row.get(6)?,
        error_message: row.get(7)?,
        duration_ms: get_u64(row, 8)?,
        attempted_at: row.get(9)?,
    })
}

/// Append an attempt without touching the message row.
pub async fn record_attempt(db: &Database, attempt: &NewAttempt) -> Result<(), CourierError> {
    let attempt = attempt.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> { insert_row(conn, &attempt) })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Append an attempt and apply the message status transition atomically.
///
/// `last_attempt_at` is always stamped; `completed_at` only on delivery.
/// If the message row does not exist the transaction is rolled back and
/// `NotFound` is returned.
pub async fn commit_attempt(
    db: &Database,
    attempt: &NewAttempt,
    transition: &StatusTransition,
) -> Result<(), CourierError> {
    let attempt = attempt.clone();
    let transition = transition.clone();
    let message_id = transition.message_id.clone();

    let updated = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            insert_row(&tx, &attempt)?;
            let delivered = transition.status == MessageStatus::Delivered;
            let changed = tx.execute(
                "UPDATE messages SET
                    status = ?1,
                    attempts = ?2,
                    last_error = ?3,
                    last_attempt_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                    completed_at = CASE WHEN ?4
                        THEN strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                        ELSE completed_at END
                 WHERE message_id = ?5",
                params![
                    transition.status.as_str(),
                    transition.attempts,
                    transition.last_error,
                    delivered,
                    transition.message_id,
                ],
            )?;
            if changed == 0 {
                // Dropping the transaction rolls back the attempt insert.
                return Ok(false);
            }
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if updated {
        Ok(())
    } else {
        Err(CourierError::not_found("message", message_id))
    }
}

/// All attempts for a message in insertion order.
pub async fn list_attempts(
    db: &Database,
    message_id: &str,
) -> Result<Vec<DeliveryAttempt>, CourierError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<DeliveryAttempt>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, message_id, attempt_number, provider, status, response_code,
                        response_body, error_message, duration_ms, attempted_at
                 FROM delivery_attempts
                 WHERE message_id = ?1
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![message_id], row_to_attempt)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
