// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator commands that talk to the store directly.
//!
//! Results are printed to stdout as JSON.

use courier_config::model::CourierConfig;
use courier_core::types::NewMessage;
use courier_core::{CourierError, DeliveryStore, StorageAdapter};
use courier_delivery::{RetryError, RetryOutcome};
use serde_json::{Value, json};

use crate::serve::{build_orchestrator, open_storage};

fn print_json(value: &Value) -> Result<(), CourierError> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| CourierError::Internal(e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn retry_error(err: RetryError) -> CourierError {
    match err {
        RetryError::BadRequest(msg) => CourierError::Validation(msg),
        RetryError::NotFound { message_id } => CourierError::not_found("message", message_id),
        RetryError::AlreadyDelivered { message_id } => {
            CourierError::Validation(format!("message {message_id} already delivered"))
        }
        RetryError::Store(e) => e,
    }
}

/// `courier retry <id>`: fails the process unless the message is delivered.
pub async fn retry(config: &CourierConfig, message_id: &str) -> Result<(), CourierError> {
    let storage = open_storage(config).await?;
    let orchestrator = build_orchestrator(config, storage)?;

    let outcome = orchestrator.retry(message_id).await.map_err(retry_error)?;
    let (body, failure) = match outcome {
        RetryOutcome::Delivered {
            message_id,
            attempts,
        } => (
            json!({ "message_id": message_id, "status": "delivered", "attempts": attempts }),
            None,
        ),
        RetryOutcome::Rejected {
            message_id,
            attempts,
            error,
        } => (
            json!({
                "message_id": message_id,
                "status": "failed",
                "attempts": attempts,
                "error": error,
            }),
            Some(error),
        ),
        RetryOutcome::Errored { message_id, error } => (
            json!({ "message_id": message_id, "status": "failed", "error": error }),
            Some(error),
        ),
    };
    print_json(&body)?;

    match failure {
        None => Ok(()),
        Some(error) => Err(CourierError::Transport {
            message: error,
            source: None,
        }),
    }
}

pub async fn add_message(
    config: &CourierConfig,
    id: Option<String>,
    provider: String,
    recipient: String,
    text: String,
    max_attempts: u32,
) -> Result<(), CourierError> {
    let storage = open_storage(config).await?;
    let message = NewMessage {
        message_id: id.unwrap_or_else(|| format!("msg_{}", uuid::Uuid::new_v4().simple())),
        provider,
        recipient,
        message_text: text,
        max_attempts,
    };
    storage.insert_message(&message).await?;
    print_json(&json!({ "message_id": message.message_id, "status": "pending" }))
}

pub async fn list_messages(config: &CourierConfig, limit: u32) -> Result<(), CourierError> {
    let storage = open_storage(config).await?;
    let messages = storage.list_messages(limit.clamp(1, 100)).await?;
    let value = serde_json::to_value(&messages).map_err(|e| CourierError::Internal(e.to_string()))?;
    print_json(&value)
}

pub async fn show_message(config: &CourierConfig, message_id: &str) -> Result<(), CourierError> {
    let storage = open_storage(config).await?;
    let message = storage
        .get_message(message_id)
        .await?
        .ok_or_else(|| CourierError::not_found("message", message_id))?;
    let attempts = storage.list_attempts(message_id).await?;
    print_json(&json!({ "message": message, "delivery_attempts": attempts }))
}

pub async fn create_key(config: &CourierConfig, name: &str) -> Result<(), CourierError> {
    let storage = open_storage(config).await?;
    let key = storage.create_api_key(name).await?;
    print_json(&json!({ "name": key.name, "api_key": key.api_key }))
}

pub async fn list_keys(config: &CourierConfig) -> Result<(), CourierError> {
    let storage = open_storage(config).await?;
    let keys = storage.list_api_keys().await?;
    let value = serde_json::to_value(&keys).map_err(|e| CourierError::Internal(e.to_string()))?;
    print_json(&value)
}

pub async fn revoke_key(config: &CourierConfig, api_key: &str) -> Result<(), CourierError> {
    let storage = open_storage(config).await?;
    if !storage.revoke_api_key(api_key).await? {
        return Err(CourierError::not_found("api key", api_key));
    }
    print_json(&json!({ "api_key": api_key, "revoked": true }))
}

/// Prints the effective configuration with the Wappi token masked.
pub fn config_check(config: &CourierConfig) -> Result<(), CourierError> {
    let mut value =
        serde_json::to_value(config).map_err(|e| CourierError::Internal(e.to_string()))?;
    if let Some(token) = value.pointer_mut("/transport/wappi/token") {
        if !token.is_null() {
            *token = Value::String("[redacted]".to_string());
        }
    }
    print_json(&value)
}
