mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use httpmock::Method::POST;
use httpmock::MockServer;

use aura_relay::error::{AuraRelayError, Result};
use aura_relay::interfaces::scheduler::ScheduledJob;
use aura_relay::schedule::Schedule;
use aura_relay::scheduler::Scheduler;

use common::{config_for, relay_for, RecordingPublisher};

#[tokio::test]
async fn heartbeat_posts_to_fixed_endpoint() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/heartbeat")
                .header("content-type", "application/json");
            then.status(204);
        })
        .await;

    let relay = relay_for(&config_for(&server), Arc::new(RecordingPublisher::new()));
    assert_eq!(relay.heartbeat_url(), server.url("/api/heartbeat"));
    relay.heartbeat().await.unwrap();
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn heartbeat_server_error_is_fatal() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/heartbeat");
            then.status(500);
        })
        .await;

    let relay = relay_for(&config_for(&server), Arc::new(RecordingPublisher::new()));
    let err = relay.heartbeat().await.unwrap_err();
    match err {
        AuraRelayError::Heartbeat { status, .. } => assert_eq!(status, Some(500)),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn heartbeat_job_uses_configured_schedule() {
    let server = MockServer::start_async().await;
    let relay = relay_for(&config_for(&server), Arc::new(RecordingPublisher::new()));

    let job = relay.heartbeat_job();
    assert_eq!(job.name(), "heartbeat");
    match job.schedule() {
        Schedule::Cron(cron) => assert_eq!(cron.to_string(), "0 0 10-18 * * *"),
        other => panic!("unexpected schedule: {other:?}"),
    }
}

struct TickJob {
    count: Arc<Mutex<u32>>,
}

#[async_trait]
impl ScheduledJob for TickJob {
    fn name(&self) -> &str {
        "tick"
    }

    fn schedule(&self) -> Schedule {
        Schedule::Interval(Duration::from_millis(10))
    }

    async fn run(&self) -> Result<()> {
        let mut guard = self.count.lock().unwrap();
        *guard += 1;
        Ok(())
    }
}

struct FailingJob {
    count: Arc<Mutex<u32>>,
}

#[async_trait]
impl ScheduledJob for FailingJob {
    fn name(&self) -> &str {
        "failing"
    }

    fn schedule(&self) -> Schedule {
        Schedule::Interval(Duration::from_millis(10))
    }

    async fn run(&self) -> Result<()> {
        *self.count.lock().unwrap() += 1;
        Err(AuraRelayError::Runtime("boom".to_string()))
    }
}

#[tokio::test]
async fn scheduler_runs_jobs_until_stopped() {
    let result = tokio::time::timeout(Duration::from_secs(1), async {
        let ticks = Arc::new(Mutex::new(0u32));
        let failures = Arc::new(Mutex::new(0u32));
        let mut scheduler = Scheduler::new();
        scheduler.register_job(Arc::new(TickJob {
            count: ticks.clone(),
        }));
        scheduler.register_job(Arc::new(FailingJob {
            count: failures.clone(),
        }));
        assert_eq!(scheduler.job_names(), vec!["tick", "failing"]);

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(45)).await;
        scheduler.stop().await;

        let after_stop = *ticks.lock().unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(*ticks.lock().unwrap(), after_stop);

        let failed = *failures.lock().unwrap();
        (after_stop, failed)
    })
    .await;

    let (ticks, failures) = result.expect("scheduler test timed out");
    assert!(ticks >= 2);
    assert!(failures >= 2);
}
