use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Raw reply from the gateway, before any interpretation of the body.
#[derive(Debug, Clone)]
pub struct GatewayReply {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl GatewayReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// POSTs `body` as JSON. Transport failures are errors; any HTTP status is a reply.
    async fn post_json(&self, url: &str, body: &Value) -> Result<GatewayReply>;

    /// POSTs with a JSON content type and no body.
    async fn post_empty(&self, url: &str) -> Result<GatewayReply>;
}
