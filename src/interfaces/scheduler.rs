use async_trait::async_trait;

use crate::error::Result;
use crate::schedule::Schedule;

#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &str;
    fn schedule(&self) -> Schedule;
    async fn run(&self) -> Result<()>;
}
