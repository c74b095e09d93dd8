use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AuraRelayError, Result};
use crate::schedule::DEFAULT_HEARTBEAT_SCHEDULE;

pub const DEFAULT_BASE_URL: &str = "https://aura.anth.dev/api/";
pub const DEFAULT_HEARTBEAT_PATH: &str = "heartbeat";
pub const DEFAULT_INBOUND_QUEUE: &str = "aura-gateway-sender";
pub const DEFAULT_OUTBOUND_QUEUE: &str = "aura-gateway-receiver";
pub const BASE_URL_ENV: &str = "AURA_RELAY_BASE_URL";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GatewayConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// What the forwarder sends as the request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadPolicy {
    /// `{ "attempts": <delivery count>, "data": <envelope> }`
    #[default]
    Envelope,
    /// Only the envelope's `d`.
    Payload,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DispatchConfig {
    pub payload: Option<PayloadPolicy>,
    pub strict: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QueueConfig {
    pub inbound: Option<String>,
    pub outbound: Option<String>,
    pub publish_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HeartbeatConfig {
    pub enabled: Option<bool>,
    pub path: Option<String>,
    pub schedule: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub gateway: Option<GatewayConfig>,
    pub dispatch: Option<DispatchConfig>,
    pub queue: Option<QueueConfig>,
    pub heartbeat: Option<HeartbeatConfig>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| AuraRelayError::Config(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| AuraRelayError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise starts from defaults, then applies
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.apply_env())
    }

    pub fn apply_env(self) -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(value) => self.with_base_url(value),
            Err(_) => self,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return self;
        }
        self.gateway.get_or_insert_with(Default::default).base_url = Some(base_url);
        self
    }

    pub fn base_url(&self) -> String {
        self.gateway
            .as_ref()
            .and_then(|g| g.base_url.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string()
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.gateway.as_ref().and_then(|g| g.timeout_seconds)
    }

    pub fn payload_policy(&self) -> PayloadPolicy {
        self.dispatch
            .as_ref()
            .and_then(|d| d.payload)
            .unwrap_or_default()
    }

    pub fn strict(&self) -> bool {
        self.dispatch.as_ref().and_then(|d| d.strict).unwrap_or(true)
    }

    pub fn inbound_queue(&self) -> String {
        self.queue
            .as_ref()
            .and_then(|q| q.inbound.clone())
            .unwrap_or_else(|| DEFAULT_INBOUND_QUEUE.to_string())
    }

    pub fn outbound_queue(&self) -> String {
        self.queue
            .as_ref()
            .and_then(|q| q.outbound.clone())
            .unwrap_or_else(|| DEFAULT_OUTBOUND_QUEUE.to_string())
    }

    pub fn publish_url(&self) -> Option<String> {
        self.queue
            .as_ref()
            .and_then(|q| q.publish_url.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn heartbeat_enabled(&self) -> bool {
        self.heartbeat
            .as_ref()
            .and_then(|h| h.enabled)
            .unwrap_or(true)
    }

    pub fn heartbeat_path(&self) -> String {
        self.heartbeat
            .as_ref()
            .and_then(|h| h.path.clone())
            .unwrap_or_else(|| DEFAULT_HEARTBEAT_PATH.to_string())
    }

    pub fn heartbeat_schedule(&self) -> String {
        self.heartbeat
            .as_ref()
            .and_then(|h| h.schedule.clone())
            .unwrap_or_else(|| DEFAULT_HEARTBEAT_SCHEDULE.to_string())
    }
}
