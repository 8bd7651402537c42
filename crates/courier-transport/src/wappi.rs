// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wappi HTTP transport for WhatsApp and Telegram delivery.

use std::time::Duration;

use async_trait::async_trait;
use courier_config::model::WappiConfig;
use courier_core::{
    AdapterType, CourierError, DispatchResponse, HealthStatus, PluginAdapter, Transport,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::normalize_recipient;

const SEND_PATH: &str = "/api/sync/message/send";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    recipient: &'a str,
    body: &'a str,
}

/// Sends messages through the Wappi sync API.
///
/// Missing credentials are not an error at construction time: `send`
/// reports them as a 500 without touching the network.
pub struct WappiTransport {
    client: reqwest::Client,
    send_url: reqwest::Url,
    token: Option<String>,
    profile_id: Option<String>,
}

impl WappiTransport {
    /// Builds the transport with a fixed per-request timeout.
    pub fn new(config: &WappiConfig, timeout: Duration) -> Result<Self, CourierError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CourierError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let base_url = config.base_url.trim_end_matches('/');
        let send_url = reqwest::Url::parse(&format!("{base_url}{SEND_PATH}")).map_err(|e| {
            CourierError::Config(format!("invalid Wappi base_url `{}`: {e}", config.base_url))
        })?;

        Ok(Self {
            client,
            send_url,
            token: config.token.clone().filter(|t| !t.is_empty()),
            profile_id: config.profile_id.clone().filter(|p| !p.is_empty()),
        })
    }

    /// Whether both the token and the profile id are present.
    pub fn is_configured(&self) -> bool {
        self.token.is_some() && self.profile_id.is_some()
    }

    async fn post(
        &self,
        token: &str,
        profile_id: &str,
        recipient: &str,
        text: &str,
    ) -> Result<DispatchResponse, reqwest::Error> {
        let mut url = self.send_url.clone();
        url.query_pairs_mut().append_pair("profile_id", profile_id);
        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, token)
            .json(&SendRequest {
                recipient,
                body: text,
            })
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, "wappi responded");
        Ok(DispatchResponse::new(status, body))
    }
}

impl std::fmt::Debug for WappiTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WappiTransport")
            .field("send_url", &self.send_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("profile_id", &self.profile_id)
            .finish()
    }
}

#[async_trait]
impl PluginAdapter for WappiTransport {
    fn name(&self) -> &str {
        "wappi"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        if self.is_configured() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(
                "Wappi credentials not configured".to_string(),
            ))
        }
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        debug!("wappi transport shutting down");
        Ok(())
    }
}

#[async_trait]
impl Transport for WappiTransport {
    async fn send(&self, recipient: &str, text: &str) -> DispatchResponse {
        let (Some(token), Some(profile_id)) = (&self.token, &self.profile_id) else {
            warn!("wappi send skipped: credentials not configured");
            return DispatchResponse::transport_error("Wappi credentials not configured");
        };

        let recipient = normalize_recipient(recipient);
        match self.post(token, profile_id, &recipient, text).await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!("wappi request timed out");
                DispatchResponse::transport_error("Request timeout")
            }
            Err(e) => {
                warn!(error = %e, "wappi request failed");
                DispatchResponse::transport_error(e)
            }
        }
    }
}
