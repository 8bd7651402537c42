// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider management endpoints.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use courier_core::types::{NewProvider, ProviderOverview};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::auth::ApiKey;
use crate::error::ApiError;
use crate::server::GatewayState;

/// Credential fields accepted in provider bodies. Anything else is ignored.
pub const CREDENTIAL_FIELDS: &[&str] = &[
    "wappi_token",
    "wappi_profile_id",
    "postbox_access_key",
    "postbox_secret_key",
    "postbox_from_email",
    "fcm_project_id",
    "fcm_private_key",
    "fcm_client_email",
    "apns_team_id",
    "apns_key_id",
    "apns_private_key",
    "apns_bundle_id",
];

const DEFAULT_PROVIDER_TYPE: &str = "custom";

#[derive(Debug, Deserialize)]
pub struct ProviderCodeQuery {
    pub provider_code: Option<String>,
}

impl ProviderCodeQuery {
    fn require(&self) -> Result<&str, ApiError> {
        self.provider_code
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Missing provider_code parameter".to_string()))
    }
}

/// Builds the stored config from the non-empty credential strings in `body`.
pub fn extract_credentials(body: &Map<String, Value>) -> Map<String, Value> {
    CREDENTIAL_FIELDS
        .iter()
        .filter_map(|field| {
            body.get(*field)
                .and_then(Value::as_str)
                .filter(|v| !v.is_empty())
                .map(|v| (field.to_string(), Value::String(v.to_string())))
        })
        .collect()
}

fn parse_object(body: &Bytes) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Ok(Map::new()),
        Err(_) => Err(ApiError::InvalidJson),
    }
}

fn non_empty_str<'a>(body: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn overview_json(overview: &ProviderOverview) -> Value {
    let p = &overview.provider;
    json!({
        "provider_code": p.provider_code,
        "provider_name": p.provider_name,
        "provider_type": p.provider_type,
        "is_active": p.is_active,
        "config": p.config,
        "connection_status": overview.effective_connection_status().to_string(),
        "last_attempt_status": overview.last_attempt_status.map(|s| s.to_string()),
        "last_response_code": overview.last_response_code,
        "last_attempt_at": overview.last_attempt_at,
        "created_at": p.created_at,
        "updated_at": p.updated_at,
    })
}

/// GET /api/providers
pub async fn list_providers(
    _key: ApiKey,
    State(state): State<GatewayState>,
) -> Result<Response, ApiError> {
    let providers = state.storage.list_providers().await?;
    let providers: Vec<Value> = providers.iter().map(overview_json).collect();
    Ok(Json(json!({ "success": true, "providers": providers })).into_response())
}

/// GET /api/providers/config?provider_code=X
pub async fn get_provider_config(
    _key: ApiKey,
    State(state): State<GatewayState>,
    Query(query): Query<ProviderCodeQuery>,
) -> Result<Response, ApiError> {
    let code = query.require()?;
    let provider = state
        .storage
        .get_provider(code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Provider not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "provider_code": code,
        "config": provider.config,
    }))
    .into_response())
}

/// PUT /api/providers
pub async fn create_provider(
    _key: ApiKey,
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body = parse_object(&body)?;
    let code = non_empty_str(&body, "provider_code")
        .ok_or_else(|| ApiError::BadRequest("Missing provider_code".to_string()))?;
    let name = non_empty_str(&body, "provider_name").ok_or_else(|| {
        ApiError::BadRequest("Missing provider_name for new provider".to_string())
    })?;

    let new_provider = NewProvider {
        provider_code: code.to_string(),
        provider_name: name.to_string(),
        provider_type: non_empty_str(&body, "provider_type")
            .unwrap_or(DEFAULT_PROVIDER_TYPE)
            .to_string(),
        config: extract_credentials(&body),
    };

    let created = state
        .storage
        .create_provider(&new_provider)
        .await?
        .ok_or_else(|| ApiError::Conflict(format!("Provider {code} already exists")))?;

    tracing::info!(provider_code = %created.provider_code, "provider created");
    Ok(Json(json!({
        "success": true,
        "provider_code": created.provider_code,
        "provider_name": created.provider_name,
        "is_active": created.is_active,
        "message": "Provider created successfully",
    }))
    .into_response())
}

/// POST /api/providers
///
/// Replaces the whole config; fields omitted from the body are dropped.
pub async fn update_provider(
    _key: ApiKey,
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body = parse_object(&body)?;
    let code = non_empty_str(&body, "provider_code")
        .ok_or_else(|| ApiError::BadRequest("Missing provider_code".to_string()))?;

    let updated = state
        .storage
        .update_provider_config(code, &extract_credentials(&body))
        .await?
        .ok_or_else(|| ApiError::NotFound("Provider not found".to_string()))?;

    tracing::info!(provider_code = %updated.provider_code, "provider configuration updated");
    Ok(Json(json!({
        "success": true,
        "provider_code": updated.provider_code,
        "provider_name": updated.provider_name,
        "is_active": updated.is_active,
        "message": "Provider configuration updated successfully",
    }))
    .into_response())
}

/// DELETE /api/providers?provider_code=X
pub async fn delete_provider(
    _key: ApiKey,
    State(state): State<GatewayState>,
    Query(query): Query<ProviderCodeQuery>,
) -> Result<Response, ApiError> {
    let code = query.require()?;
    let deleted = state
        .storage
        .delete_provider(code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Provider not found".to_string()))?;

    tracing::info!(provider_code = %deleted.provider_code, "provider deleted");
    Ok(Json(json!({
        "success": true,
        "provider_code": deleted.provider_code,
        "provider_name": deleted.provider_name,
        "message": format!("Provider {} deleted successfully", deleted.provider_name),
    }))
    .into_response())
}
