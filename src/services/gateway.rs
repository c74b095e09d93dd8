use std::time::Duration;

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use serde_json::Value;

use crate::error::{AuraRelayError, Result};
use crate::interfaces::gateway::{GatewayClient, GatewayReply};

/// [`GatewayClient`] over `reqwest`. No timeout unless one is configured.
#[derive(Clone)]
pub struct HttpGatewayClient {
    client: reqwest::Client,
}

impl HttpGatewayClient {
    pub fn new(timeout_seconds: Option<u64>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout.max(1)));
        }
        let client = builder
            .build()
            .map_err(|e| AuraRelayError::Http(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<GatewayReply> {
        let response = request
            .send()
            .await
            .map_err(|e| AuraRelayError::Http(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuraRelayError::Http(e.to_string()))?;
        Ok(GatewayReply {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}

#[async_trait]
impl GatewayClient for HttpGatewayClient {
    async fn post_json(&self, url: &str, body: &Value) -> Result<GatewayReply> {
        self.send(self.client.post(url).json(body)).await
    }

    async fn post_empty(&self, url: &str) -> Result<GatewayReply> {
        self.send(self.client.post(url).header(CONTENT_TYPE, "application/json"))
            .await
    }
}
