#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use httpmock::MockServer;
use tokio::sync::Mutex;

use aura_relay::client::AuraRelay;
use aura_relay::config::{Config, DispatchConfig, PayloadPolicy};
use aura_relay::domains::response::OutboundEnvelope;
use aura_relay::error::{AuraRelayError, Result};
use aura_relay::factories::relay_factory::RelayFactory;
use aura_relay::interfaces::queue::QueuePublisher;

#[derive(Default)]
pub struct RecordingPublisher {
    messages: Mutex<Vec<OutboundEnvelope>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<OutboundEnvelope> {
        self.messages.lock().await.clone()
    }
}

#[async_trait]
impl QueuePublisher for RecordingPublisher {
    async fn publish(&self, message: &OutboundEnvelope) -> Result<()> {
        self.messages.lock().await.push(message.clone());
        Ok(())
    }
}

pub struct FailingPublisher;

#[async_trait]
impl QueuePublisher for FailingPublisher {
    async fn publish(&self, _message: &OutboundEnvelope) -> Result<()> {
        Err(AuraRelayError::Publish("queue unavailable".to_string()))
    }
}

pub fn config_for(server: &MockServer) -> Config {
    Config::default().with_base_url(server.url("/api/"))
}

pub fn config_with_policy(server: &MockServer, payload: PayloadPolicy, strict: bool) -> Config {
    let mut config = config_for(server);
    config.dispatch = Some(DispatchConfig {
        payload: Some(payload),
        strict: Some(strict),
    });
    config
}

pub fn relay_for(config: &Config, publisher: Arc<dyn QueuePublisher>) -> AuraRelay {
    RelayFactory::create_from_config(config, publisher).unwrap()
}
