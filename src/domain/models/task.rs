#[cfg(test)]
#[path = "task_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Local;
use uuid::Uuid;

use super::Photo;

#[derive(Clone, Debug, PartialEq)]
pub enum TaskStatus {
    Queued,
    Submitted,
    InProgress(u8),
    Succeeded(Photo),
    Failed(String),
    TimedOut,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        match self {
            TaskStatus::Succeeded(_) | TaskStatus::Failed(_) | TaskStatus::TimedOut => return true,
            _ => return false,
        }
    }
}

/// One generation request, from the moment the user asks for a portrait
/// until its photo lands in the gallery or its error is surfaced.
///
/// `request_id` is assigned client-side for correlation; `server_task_id`
/// only exists when the service answered asynchronously. Terminal statuses
/// are sticky: every transition on a finished task is ignored, so a late
/// poll response can never resurrect a timed-out request.
#[derive(Clone, Debug)]
pub struct GenerationTask {
    pub request_id: String,
    pub server_task_id: Option<String>,
    pub status: TaskStatus,
    pub submitted_at: Option<DateTime<Local>>,
}

impl GenerationTask {
    pub fn new() -> GenerationTask {
        return GenerationTask::with_request_id(GenerationTask::create_id());
    }

    pub fn with_request_id(request_id: String) -> GenerationTask {
        return GenerationTask {
            request_id,
            server_task_id: None,
            status: TaskStatus::Queued,
            submitted_at: None,
        };
    }

    pub fn create_id() -> String {
        return Uuid::new_v4()
            .to_string()
            .split('-')
            .enumerate()
            .filter_map(|(idx, str)| {
                if idx > 1 {
                    return None;
                }
                return Some(str);
            })
            .collect::<Vec<&str>>()
            .join("-");
    }

    /// Marks the request as sent over the network. Called when the request
    /// leaves the queue, not when it was first asked for.
    pub fn mark_submitted(&mut self) {
        if self.status.is_terminal() {
            return;
        }

        self.status = TaskStatus::Submitted;
        self.submitted_at = Some(Local::now());
    }

    pub fn attach_server_task(&mut self, server_task_id: &str) {
        self.server_task_id = Some(server_task_id.to_string());
    }

    /// Records reported progress, clamped to 99. Full progress is reserved
    /// for the terminal transition so the UI never shows a finished bar with
    /// no photo behind it.
    pub fn set_progress(&mut self, percent: u8) {
        if self.status.is_terminal() {
            return;
        }

        self.status = TaskStatus::InProgress(percent.min(99));
    }

    pub fn succeed(&mut self, photo: Photo) {
        if self.status.is_terminal() {
            return;
        }

        self.status = TaskStatus::Succeeded(photo);
    }

    pub fn fail(&mut self, reason: &str) {
        if self.status.is_terminal() {
            return;
        }

        self.status = TaskStatus::Failed(reason.to_string());
    }

    pub fn time_out(&mut self) {
        if self.status.is_terminal() {
            return;
        }

        self.status = TaskStatus::TimedOut;
    }
}
