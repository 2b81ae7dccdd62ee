use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use owo_colors::OwoColorize;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Event;

fn render(event: &Event) {
    match event {
        Event::WalletBalance(coins) => {
            println!("Wallet: {coins} coins.");
        }
        Event::TaskQueued(request_id, position) => {
            println!(
                "{}",
                format!("[{request_id}] Queued at position {position}.").yellow()
            );
        }
        Event::TaskSubmitted(request_id) => {
            println!("[{request_id}] Submitted.");
        }
        Event::TaskProgress(request_id, percent) => {
            println!("[{request_id}] {percent}%");
        }
        Event::TaskSucceeded(request_id, photo) => {
            println!(
                "{}",
                format!("[{request_id}] Portrait ready: {}", photo.url).green()
            );
        }
        Event::TaskFailed(request_id, err) => {
            println!("{}", format!("[{request_id}] {err}").red());
        }
        Event::SelectionSaved(photos) => {
            println!(
                "{}",
                format!("Main card now shows {} photo(s).", photos.len()).green()
            );
        }
        Event::SelectionFailed(err) => {
            println!("{}", err.to_string().red());
        }
    }
}

/// The terminal face of a generation run. Fires the requested number of
/// portrait actions, renders events as they land, and exits once every
/// request has reached a terminal state.
pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    mut rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let count = Config::get(ConfigKey::GenerateCount)
        .parse::<usize>()
        .unwrap_or(1);

    for _ in 0..count {
        tx.send(Action::GeneratePortrait())?;
    }

    let mut remaining = count;
    while remaining > 0 {
        match rx.recv().await {
            None => bail!("The generator stopped before all portraits finished."),
            Some(event) => {
                if matches!(event, Event::TaskSucceeded(_, _) | Event::TaskFailed(_, _)) {
                    remaining -= 1;
                }
                render(&event);
            }
        }
    }

    // Closing the action channel lets the generator wind down once its
    // in-flight selection writes land.
    drop(tx);

    loop {
        match tokio::time::timeout(Duration::from_millis(500), rx.recv()).await {
            Ok(Some(event)) => render(&event),
            Ok(None) => break,
            Err(_) => break,
        }
    }

    return Ok(());
}
