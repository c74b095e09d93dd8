use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::error::{AuraRelayError, Result};
use crate::interfaces::gateway::GatewayClient;
use crate::interfaces::scheduler::ScheduledJob;
use crate::schedule::{CronSchedule, Schedule};

pub struct HeartbeatPinger {
    client: Arc<dyn GatewayClient>,
    url: String,
}

impl HeartbeatPinger {
    pub fn new(client: Arc<dyn GatewayClient>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn ping(&self) -> Result<()> {
        let reply = self
            .client
            .post_empty(&self.url)
            .await
            .map_err(|err| AuraRelayError::Heartbeat {
                status: None,
                message: err.to_string(),
            })?;
        if !reply.is_success() {
            error!(url = %self.url, status = reply.status, reason = %reply.reason, "error sending heartbeat");
            return Err(AuraRelayError::Heartbeat {
                status: Some(reply.status),
                message: reply.reason,
            });
        }
        info!(url = %self.url, "heartbeat sent");
        Ok(())
    }
}

pub struct HeartbeatJob {
    pinger: Arc<HeartbeatPinger>,
    schedule: CronSchedule,
}

impl HeartbeatJob {
    pub fn new(pinger: Arc<HeartbeatPinger>, schedule: CronSchedule) -> Self {
        Self { pinger, schedule }
    }
}

#[async_trait]
impl ScheduledJob for HeartbeatJob {
    fn name(&self) -> &str {
        "heartbeat"
    }

    fn schedule(&self) -> Schedule {
        Schedule::Cron(self.schedule.clone())
    }

    async fn run(&self) -> Result<()> {
        self.pinger.ping().await
    }
}
