use anyhow::Result;
use strum::IntoEnumIterator;
use test_utils::accepted_body;
use test_utils::processing_status;
use test_utils::profile_body;
use test_utils::sync_image_body;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::GeneratorService;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::StudioError;
use crate::domain::models::Tier;

fn configure(server: &mockito::Server) {
    for key in ConfigKey::iter() {
        Config::set(key, &Config::default(key));
    }

    Config::set(ConfigKey::ApiUrl, &server.url());
    Config::set(ConfigKey::AuthToken, "token");
    Config::set(ConfigKey::Translator, "noop");
    Config::set(ConfigKey::PromptOverride, "tall elf with silver hair");
}

fn start_service() -> (
    mpsc::UnboundedSender<Action>,
    mpsc::UnboundedReceiver<Event>,
    JoinHandle<Result<()>>,
) {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let service = tokio::spawn(async move {
        return GeneratorService::start(event_tx, &mut action_rx).await;
    });

    return (action_tx, event_rx, service);
}

async fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = vec![];
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    return events;
}

#[tokio::test]
async fn it_completes_a_synchronous_generation_and_auto_selects() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    configure(&server);

    server
        .mock("POST", "/auth/me")
        .with_status(200)
        .with_body(profile_body("u-1", "june", "free", 100))
        .create_async()
        .await;
    let generate = server
        .mock("POST", "/generate-image")
        .with_status(200)
        .with_body(sync_image_body("https://cdn.example.com/1.png", "1.png", 11.2))
        .expect(1)
        .create_async()
        .await;
    let persist = server
        .mock("POST", "/characters/set-main-photos")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let (tx, mut rx, service) = start_service();
    tx.send(Action::GeneratePortrait())?;
    drop(tx);
    service.await??;

    let events = drain(&mut rx).await;

    assert!(matches!(events[0], Event::WalletBalance(100)));
    assert!(matches!(events[1], Event::WalletBalance(90)));
    assert!(matches!(events[2], Event::TaskSubmitted(_)));

    match &events[3] {
        Event::TaskSucceeded(_, photo) => {
            assert_eq!(photo.url, "https://cdn.example.com/1.png");
            assert_eq!(photo.id, "1");
            assert_eq!(photo.generation_time_seconds, Some(11.2));
        }
        other => panic!("expected TaskSucceeded, got {other:?}"),
    }

    match &events[4] {
        Event::SelectionSaved(photos) => {
            assert_eq!(photos.len(), 1);
            assert!(photos[0].is_selected);
        }
        other => panic!("expected SelectionSaved, got {other:?}"),
    }

    generate.assert_async().await;
    persist.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_rejects_a_second_request_on_the_free_tier() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    configure(&server);
    Config::set(ConfigKey::PollInterval, "0");
    Config::set(ConfigKey::PollAttempts, "2");

    server
        .mock("POST", "/auth/me")
        .with_status(200)
        .with_body(profile_body("u-1", "june", "free", 100))
        .create_async()
        .await;
    server
        .mock("POST", "/generate-image")
        .with_status(202)
        .with_body(accepted_body("task-1"))
        .expect(1)
        .create_async()
        .await;
    let status = server
        .mock("GET", "/generation-status/task-1")
        .with_status(200)
        .with_body(processing_status(serde_json::json!(10)))
        .expect(2)
        .create_async()
        .await;

    let (tx, mut rx, service) = start_service();
    tx.send(Action::GeneratePortrait())?;
    tx.send(Action::GeneratePortrait())?;
    drop(tx);
    service.await??;

    let events = drain(&mut rx).await;

    // The second admission bounces before the first request even submits.
    match &events[2] {
        Event::TaskFailed(_, err) => {
            assert_eq!(
                err,
                &StudioError::QueueFull {
                    tier: Tier::Free,
                    limit: 1
                }
            );
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }

    let timed_out = events.iter().any(|e| {
        return matches!(e, Event::TaskFailed(_, StudioError::GenerationTimedOut));
    });
    assert!(timed_out);

    // Polling stopped at the attempt ceiling.
    status.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_rejects_generation_on_insufficient_balance() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    configure(&server);

    server
        .mock("POST", "/auth/me")
        .with_status(200)
        .with_body(profile_body("u-1", "june", "premium", 5))
        .create_async()
        .await;
    let generate = server
        .mock("POST", "/generate-image")
        .expect(0)
        .create_async()
        .await;

    let (tx, mut rx, service) = start_service();
    tx.send(Action::GeneratePortrait())?;
    drop(tx);
    service.await??;

    let events = drain(&mut rx).await;

    match &events[1] {
        Event::TaskFailed(_, err) => {
            assert_eq!(
                err,
                &StudioError::InsufficientBalance {
                    balance: 5,
                    cost: 10
                }
            );
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }

    generate.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_rejects_generation_without_a_prompt() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    configure(&server);
    Config::set(ConfigKey::PromptOverride, "");

    server
        .mock("POST", "/auth/me")
        .with_status(200)
        .with_body(profile_body("u-1", "june", "free", 100))
        .create_async()
        .await;
    let generate = server
        .mock("POST", "/generate-image")
        .expect(0)
        .create_async()
        .await;

    let (tx, mut rx, service) = start_service();
    tx.send(Action::GeneratePortrait())?;
    drop(tx);
    service.await??;

    let events = drain(&mut rx).await;
    assert!(matches!(
        events[1],
        Event::TaskFailed(_, StudioError::MissingPrompt)
    ));

    generate.assert_async().await;
    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_queues_and_drains_on_the_standard_tier() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    configure(&server);

    server
        .mock("POST", "/auth/me")
        .with_status(200)
        .with_body(profile_body("u-1", "june", "standard", 100))
        .create_async()
        .await;
    let generate = server
        .mock("POST", "/generate-image")
        .with_status(200)
        .with_body(sync_image_body("https://cdn.example.com/1.png", "1.png", 9.0))
        .expect(2)
        .create_async()
        .await;
    server
        .mock("POST", "/characters/set-main-photos")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let (tx, mut rx, service) = start_service();
    tx.send(Action::GeneratePortrait())?;
    tx.send(Action::GeneratePortrait())?;
    drop(tx);
    service.await??;

    let events = drain(&mut rx).await;

    let queued_idx = events
        .iter()
        .position(|e| return matches!(e, Event::TaskQueued(_, 1)))
        .unwrap();
    let submitted: Vec<usize> = events
        .iter()
        .enumerate()
        .filter_map(|(idx, e)| {
            if matches!(e, Event::TaskSubmitted(_)) {
                return Some(idx);
            }
            return None;
        })
        .collect();
    let first_success_idx = events
        .iter()
        .position(|e| return matches!(e, Event::TaskSucceeded(_, _)))
        .unwrap();

    // The second request queues before the first submits, and only
    // submits once the first has finished and the drain delay elapsed.
    assert_eq!(submitted.len(), 2);
    assert!(queued_idx < submitted[0]);
    assert!(submitted[1] > first_success_idx);

    generate.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_rolls_back_when_the_selection_write_fails() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    configure(&server);

    server
        .mock("POST", "/auth/me")
        .with_status(200)
        .with_body(profile_body("u-1", "june", "free", 100))
        .create_async()
        .await;
    server
        .mock("POST", "/generate-image")
        .with_status(200)
        .with_body(sync_image_body("https://cdn.example.com/1.png", "1.png", 9.0))
        .expect(1)
        .create_async()
        .await;
    let persist = server
        .mock("POST", "/characters/set-main-photos")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let (tx, mut rx, service) = start_service();
    tx.send(Action::GeneratePortrait())?;
    drop(tx);
    service.await??;

    let events = drain(&mut rx).await;

    let failed = events.iter().any(|e| {
        return matches!(e, Event::SelectionFailed(StudioError::Persistence(_)));
    });
    assert!(failed);

    persist.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_toggles_a_generated_photo_off_again() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    configure(&server);

    server
        .mock("POST", "/auth/me")
        .with_status(200)
        .with_body(profile_body("u-1", "june", "free", 100))
        .create_async()
        .await;
    server
        .mock("POST", "/generate-image")
        .with_status(200)
        .with_body(sync_image_body("https://cdn.example.com/1.png", "1.png", 9.0))
        .create_async()
        .await;
    let persist = server
        .mock("POST", "/characters/set-main-photos")
        .with_status(200)
        .expect(2)
        .create_async()
        .await;

    let (tx, mut rx, service) = start_service();
    tx.send(Action::GeneratePortrait())?;

    // Wait for the photo to land before toggling it back off.
    loop {
        match rx.recv().await {
            Some(Event::TaskSucceeded(_, photo)) => {
                tx.send(Action::TogglePhoto(photo.id))?;
                break;
            }
            Some(_) => {}
            None => panic!("service ended before the photo landed"),
        }
    }

    drop(tx);
    service.await??;

    let events = drain(&mut rx).await;

    let saved: Vec<&Event> = events
        .iter()
        .filter(|e| return matches!(e, Event::SelectionSaved(_)))
        .collect();
    match saved.last().unwrap() {
        Event::SelectionSaved(photos) => assert!(photos.is_empty()),
        _ => unreachable!(),
    }

    persist.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_toggles_an_unknown_photo_into_an_error() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    configure(&server);

    server
        .mock("POST", "/auth/me")
        .with_status(200)
        .with_body(profile_body("u-1", "june", "free", 100))
        .create_async()
        .await;

    let (tx, mut rx, service) = start_service();
    tx.send(Action::TogglePhoto("ghost".to_string()))?;
    drop(tx);
    service.await??;

    let events = drain(&mut rx).await;
    assert!(matches!(
        events[1],
        Event::SelectionFailed(StudioError::UnknownPhoto(_))
    ));

    return Ok(());
}
