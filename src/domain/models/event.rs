use super::Photo;
use super::StudioError;

/// Progress reports from the generator service back to the console. Task
/// events carry the client-side request id for correlation; a request ends
/// in exactly one `TaskSucceeded` or `TaskFailed`.
#[derive(Debug)]
pub enum Event {
    TaskQueued(String, usize),
    TaskSubmitted(String),
    TaskProgress(String, u8),
    TaskSucceeded(String, Photo),
    TaskFailed(String, StudioError),
    SelectionSaved(Vec<Photo>),
    SelectionFailed(StudioError),
    WalletBalance(i64),
}
