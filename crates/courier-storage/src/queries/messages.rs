// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.

use courier_core::CourierError;
use courier_core::types::{Message, MessageStatus, NewMessage};
use rusqlite::{OptionalExtension, params};

use crate::database::Database;

pub(crate) const MESSAGE_COLUMNS: &str = "message_id, provider, recipient, message_text, status,
     attempts, max_attempts, last_error, created_at, last_attempt_at, completed_at";

pub(crate) fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let status: String = row.get(4)?;
    Ok(Message {
        message_id: row.get(0)?,
        provider: row.get(1)?,
        recipient: row.get(2)?,
        message_text: row.get(3)?,
        status: MessageStatus::from(status),
        attempts: row.get(5)?,
        max_attempts: row.get(6)?,
        last_error: row.get(7)?,
        created_at: row.get(8)?,
        last_attempt_at: row.get(9)?,
        completed_at: row.get(10)?,
    })
}

/// Insert a new message in `pending` state with zero attempts.
pub async fn insert_message(db: &Database, message: &NewMessage) -> Result<(), CourierError> {
    let msg = message.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO messages (message_id, provider, recipient, message_text, max_attempts)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    msg.message_id,
                    msg.provider,
                    msg.recipient,
                    msg.message_text,
                    msg.max_attempts,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a message by id.
pub async fn get_message(db: &Database, message_id: &str) -> Result<Option<Message>, CourierError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Message>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE message_id = ?1"),
                params![message_id],
                row_to_message,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List the newest messages first, at most `limit` rows.
pub async fn list_messages(db: &Database, limit: u32) -> Result<Vec<Message>, CourierError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], row_to_message)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("messages.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn new_message(id: &str) -> NewMessage {
        NewMessage {
            message_id: id.to_string(),
            provider: "wappi".to_string(),
            recipient: "+7 900 000-00-00".to_string(),
            message_text: "hello".to_string(),
            max_attempts: 3,
        }
    }

    #[tokio::test]
    async fn insert_and_get_message() {
        let (db, _dir) = setup().await;
        insert_message(&db, &new_message("msg_1")).await.unwrap();

        let msg = get_message(&db, "msg_1").await.unwrap().unwrap();
        assert_eq!(msg.status, MessageStatus::Pending);
        assert_eq!(msg.attempts, 0);
        assert_eq!(msg.max_attempts, 3);
        assert!(msg.last_error.is_none());
        assert!(msg.last_attempt_at.is_none());
        assert!(msg.completed_at.is_none());
        assert!(msg.created_at.ends_with('Z'));
    }

    #[tokio::test]
    async fn get_missing_message_returns_none() {
        let (db, _dir) = setup().await;
        assert!(get_message(&db, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_message_id_is_rejected() {
        let (db, _dir) = setup().await;
        insert_message(&db, &new_message("dup")).await.unwrap();
        assert!(insert_message(&db, &new_message("dup")).await.is_err());
    }

    #[tokio::test]
    async fn list_returns_newest_first_and_respects_limit() {
        let (db, _dir) = setup().await;
        for i in 0..5 {
            insert_message(&db, &new_message(&format!("msg_{i}")))
                .await
                .unwrap();
        }

        let listed = list_messages(&db, 3).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|m| m.message_id.as_str()).collect();
        assert_eq!(ids, vec!["msg_4", "msg_3", "msg_2"]);
    }

    #[tokio::test]
    async fn unknown_status_values_are_preserved() {
        let (db, _dir) = setup().await;
        insert_message(&db, &new_message("odd")).await.unwrap();
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "UPDATE messages SET status = 'queued' WHERE message_id = 'odd'",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let msg = get_message(&db, "odd").await.unwrap().unwrap();
        assert_eq!(msg.status, MessageStatus::Other("queued".into()));
    }
}
