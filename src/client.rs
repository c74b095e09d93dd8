use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::domains::envelope::{DeliveryContext, InboundMessage};
use crate::error::Result;
use crate::factories::relay_factory::RelayFactory;
use crate::interfaces::queue::QueuePublisher;
use crate::schedule::CronSchedule;
use crate::services::dispatch::{DispatchHandler, DispatchOutcome};
use crate::services::heartbeat::{HeartbeatJob, HeartbeatPinger};

/// Both trigger handlers, wired and ready to be invoked by a host.
pub struct AuraRelay {
    handler: DispatchHandler,
    pinger: Arc<HeartbeatPinger>,
    heartbeat_schedule: CronSchedule,
}

impl AuraRelay {
    pub fn new(
        handler: DispatchHandler,
        pinger: Arc<HeartbeatPinger>,
        heartbeat_schedule: CronSchedule,
    ) -> Self {
        Self {
            handler,
            pinger,
            heartbeat_schedule,
        }
    }

    pub fn from_config(config: &Config, publisher: Arc<dyn QueuePublisher>) -> Result<Self> {
        RelayFactory::create_from_config(config, publisher)
    }

    pub fn from_config_path<P: AsRef<Path>>(
        path: P,
        publisher: Arc<dyn QueuePublisher>,
    ) -> Result<Self> {
        let config = Config::from_file(path)?.apply_env();
        Self::from_config(&config, publisher)
    }

    pub async fn handle_message(
        &self,
        message: impl Into<InboundMessage>,
        ctx: &DeliveryContext,
    ) -> Result<DispatchOutcome> {
        self.handler.handle(message, ctx).await
    }

    pub async fn heartbeat(&self) -> Result<()> {
        self.pinger.ping().await
    }

    pub fn resolve(&self, type_tag: &str) -> String {
        self.handler.resolver().resolve(type_tag)
    }

    pub fn heartbeat_url(&self) -> &str {
        self.pinger.url()
    }

    pub fn heartbeat_schedule(&self) -> &CronSchedule {
        &self.heartbeat_schedule
    }

    pub fn heartbeat_job(&self) -> HeartbeatJob {
        HeartbeatJob::new(self.pinger.clone(), self.heartbeat_schedule.clone())
    }
}
