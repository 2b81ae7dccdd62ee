#[cfg(test)]
#[path = "poller_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Event;
use crate::domain::models::GenerationTask;
use crate::domain::models::Photo;
use crate::infrastructure::backends::BackendBox;

const GENERIC_FAILURE: &str = "The service reported a failure without details.";

/// Drives an asynchronous generation task to a terminal status by polling
/// the service's status endpoint on a fixed interval, up to a bounded
/// attempt count. A poll that errors in transit still consumes an attempt,
/// so a dead service can never hold a task open past the ceiling.
pub struct Poller {
    interval_ms: u64,
    attempts: u32,
}

impl Default for Poller {
    fn default() -> Poller {
        return Poller {
            interval_ms: Config::get(ConfigKey::PollInterval)
                .parse::<u64>()
                .unwrap_or(2000),
            attempts: Config::get(ConfigKey::PollAttempts)
                .parse::<u32>()
                .unwrap_or(120),
        };
    }
}

impl Poller {
    pub fn new(interval_ms: u64, attempts: u32) -> Poller {
        return Poller {
            interval_ms,
            attempts,
        };
    }

    pub async fn poll(
        &self,
        backend: &BackendBox,
        task: &mut GenerationTask,
        tx: &mpsc::UnboundedSender<Event>,
    ) -> Result<()> {
        let server_task_id = match &task.server_task_id {
            Some(id) => id.to_string(),
            None => bail!("cannot poll a task the service never accepted"),
        };

        for _ in 0..self.attempts {
            tokio::time::sleep(Duration::from_millis(self.interval_ms)).await;

            let status = match backend.status(&server_task_id).await {
                Ok(status) => status,
                Err(err) => {
                    tracing::warn!(task_id = server_task_id, err = ?err, "status poll failed");
                    continue;
                }
            };

            if status.is_completed() {
                let result = status.result.unwrap_or_default();
                match result.url() {
                    Some(url) => {
                        task.succeed(Photo::new(
                            &url,
                            result.filename.as_deref(),
                            result.generation_time,
                        ));
                    }
                    None => {
                        task.fail("The service completed without returning an image.");
                    }
                }
                return Ok(());
            }

            if status.is_failed() {
                let reason = status
                    .error
                    .unwrap_or_else(|| return GENERIC_FAILURE.to_string());
                task.fail(&reason);
                return Ok(());
            }

            if let Some(percent) = status.progress_percent() {
                task.set_progress(percent);
                tx.send(Event::TaskProgress(
                    task.request_id.to_string(),
                    percent.min(99),
                ))?;
            }
        }

        task.time_out();
        return Ok(());
    }
}
