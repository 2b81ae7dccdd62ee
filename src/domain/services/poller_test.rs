use anyhow::Result;
use test_utils::completed_status;
use test_utils::failed_status;
use test_utils::processing_status;
use tokio::sync::mpsc;

use super::Poller;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendName;
use crate::domain::models::Event;
use crate::domain::models::GenerationTask;
use crate::domain::models::TaskStatus;
use crate::infrastructure::backends::BackendBox;
use crate::infrastructure::backends::BackendManager;

fn backend_for(server: &mockito::Server) -> Result<BackendBox> {
    Config::set(ConfigKey::ApiUrl, &server.url());
    Config::set(ConfigKey::AuthToken, "token");
    Config::set(ConfigKey::HealthCheckTimeout, "1000");
    return BackendManager::get(BackendName::Platform);
}

fn accepted_task(server_task_id: &str) -> GenerationTask {
    let mut task = GenerationTask::new();
    task.mark_submitted();
    task.attach_server_task(server_task_id);
    return task;
}

#[tokio::test]
async fn it_succeeds_when_the_task_completes() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let backend = backend_for(&server)?;

    let mock = server
        .mock("GET", "/generation-status/task-1")
        .with_status(200)
        .with_body(completed_status("https://cdn.example.com/1.png", "1.png", 14.5))
        .expect(1)
        .create_async()
        .await;

    let (tx, _rx) = mpsc::unbounded_channel::<Event>();
    let mut task = accepted_task("task-1");
    Poller::new(0, 5).poll(&backend, &mut task, &tx).await?;

    match &task.status {
        TaskStatus::Succeeded(photo) => {
            assert_eq!(photo.url, "https://cdn.example.com/1.png");
            assert_eq!(photo.generation_time_seconds, Some(14.5));
        }
        other => panic!("expected Succeeded, got {other:?}"),
    }

    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_fails_with_the_reason_the_service_reported() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let backend = backend_for(&server)?;

    server
        .mock("GET", "/generation-status/task-1")
        .with_status(200)
        .with_body(failed_status(Some("NSFW content detected")))
        .create_async()
        .await;

    let (tx, _rx) = mpsc::unbounded_channel::<Event>();
    let mut task = accepted_task("task-1");
    Poller::new(0, 5).poll(&backend, &mut task, &tx).await?;

    assert_eq!(
        task.status,
        TaskStatus::Failed("NSFW content detected".to_string())
    );
    return Ok(());
}

#[tokio::test]
async fn it_fails_generically_when_the_service_gives_no_reason() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let backend = backend_for(&server)?;

    server
        .mock("GET", "/generation-status/task-1")
        .with_status(200)
        .with_body(failed_status(None))
        .create_async()
        .await;

    let (tx, _rx) = mpsc::unbounded_channel::<Event>();
    let mut task = accepted_task("task-1");
    Poller::new(0, 5).poll(&backend, &mut task, &tx).await?;

    match &task.status {
        TaskStatus::Failed(reason) => {
            insta::assert_snapshot!(reason, @"The service reported a failure without details.");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    return Ok(());
}

#[tokio::test]
async fn it_emits_progress_and_caps_the_display_value() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let backend = backend_for(&server)?;

    server
        .mock("GET", "/generation-status/task-1")
        .with_status(200)
        .with_body(processing_status(serde_json::json!(100)))
        .expect(3)
        .create_async()
        .await;

    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut task = accepted_task("task-1");
    Poller::new(0, 3).poll(&backend, &mut task, &tx).await?;

    assert_eq!(task.status, TaskStatus::TimedOut);

    // A reported 100% still renders as 99 until the task actually lands.
    let event = rx.recv().await.unwrap();
    match event {
        Event::TaskProgress(_, percent) => assert_eq!(percent, 99),
        other => panic!("expected TaskProgress, got {other:?}"),
    }
    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_times_out_after_the_attempt_ceiling() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let backend = backend_for(&server)?;

    let mock = server
        .mock("GET", "/generation-status/task-1")
        .with_status(200)
        .with_body(processing_status(serde_json::json!("45%")))
        .expect(120)
        .create_async()
        .await;

    let (tx, _rx) = mpsc::unbounded_channel::<Event>();
    let mut task = accepted_task("task-1");
    Poller::new(2000, 120).poll(&backend, &mut task, &tx).await?;

    assert_eq!(task.status, TaskStatus::TimedOut);
    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_consumes_attempts_on_transport_errors() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let backend = backend_for(&server)?;

    let mock = server
        .mock("GET", "/generation-status/task-1")
        .with_status(500)
        .expect(3)
        .create_async()
        .await;

    let (tx, _rx) = mpsc::unbounded_channel::<Event>();
    let mut task = accepted_task("task-1");
    Poller::new(0, 3).poll(&backend, &mut task, &tx).await?;

    assert_eq!(task.status, TaskStatus::TimedOut);
    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_refuses_a_task_the_service_never_accepted() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let backend = backend_for(&server)?;

    let (tx, _rx) = mpsc::unbounded_channel::<Event>();
    let mut task = GenerationTask::new();
    task.mark_submitted();

    let res = Poller::new(0, 5).poll(&backend, &mut task, &tx).await;

    assert!(res.is_err());
    insta::assert_snapshot!(res.unwrap_err().to_string(), @"cannot poll a task the service never accepted");
    return Ok(());
}
