#[cfg(test)]
#[path = "generator_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::Admission;
use super::Drafts;
use super::Gallery;
use super::Poller;
use super::SelectionWrite;
use super::Throttle;
use super::WriteResolution;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::BackendName;
use crate::domain::models::Event;
use crate::domain::models::GenerationRequest;
use crate::domain::models::GenerationTask;
use crate::domain::models::Photo;
use crate::domain::models::PromptCell;
use crate::domain::models::StudioError;
use crate::domain::models::SubmitOutcome;
use crate::domain::models::TaskStatus;
use crate::domain::models::TranslatorName;
use crate::infrastructure::api::ApiClient;
use crate::infrastructure::api::CharacterClient;
use crate::infrastructure::backends::BackendManager;
use crate::infrastructure::translators::TranslatorManager;

fn build_request(character: &str, prompt: &str) -> Result<GenerationRequest> {
    return Ok(GenerationRequest {
        character: character.to_string(),
        prompt: prompt.to_string(),
        negative_prompt: Config::get(ConfigKey::NegativePrompt),
        width: Config::get(ConfigKey::Width).parse::<u32>()?,
        height: Config::get(ConfigKey::Height).parse::<u32>()?,
        steps: Config::get(ConfigKey::Steps).parse::<u32>()?,
        cfg_scale: Config::get(ConfigKey::CfgScale).parse::<f64>()?,
        model: Config::get(ConfigKey::Model),
        user_id: Config::get(ConfigKey::UserID),
        skip_chat_history: true,
    });
}

/// Runs the prompt through the configured translator. Translation is best
/// effort: any failure falls back to the untranslated prompt so a dead
/// translation service never blocks generation.
async fn translate(text: &str) -> String {
    let name = TranslatorName::parse(Config::get(ConfigKey::Translator))
        .unwrap_or(TranslatorName::Noop);

    let translator = match TranslatorManager::get(name) {
        Ok(translator) => translator,
        Err(_) => return text.to_string(),
    };

    match translator.translate_to_english(text).await {
        Ok(translated) => return translated,
        Err(err) => {
            tracing::warn!(err = ?err, "translation failed, submitting the prompt untranslated");
            return text.to_string();
        }
    }
}

/// Carries one request from the throttle's active slot to a terminal
/// status. `delay_ms` is the drain delay for requests leaving the queue;
/// the prompt resolves after it, at actual submission time, so edits made
/// while the task waited its turn are not lost to a stale capture.
async fn run_generation(
    mut task: GenerationTask,
    prompt: PromptCell,
    character: String,
    delay_ms: u64,
    tx: mpsc::UnboundedSender<Event>,
) -> (GenerationTask, Option<StudioError>) {
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    let resolved = match prompt.resolve() {
        Ok(resolved) => resolved,
        Err(err) => {
            task.fail(&err.to_string());
            return (task, Some(err));
        }
    };

    let prompt_text = translate(&resolved).await;

    task.mark_submitted();
    tx.send(Event::TaskSubmitted(task.request_id.to_string())).ok();

    let request = match build_request(&character, &prompt_text) {
        Ok(request) => request,
        Err(err) => {
            let err = StudioError::from_boundary(err);
            task.fail(&err.to_string());
            return (task, Some(err));
        }
    };

    let backend = match BackendManager::get(BackendName::Platform) {
        Ok(backend) => backend,
        Err(err) => {
            let err = StudioError::from_boundary(err);
            task.fail(&err.to_string());
            return (task, Some(err));
        }
    };

    match backend.submit(request).await {
        Err(err) => {
            let err = StudioError::from_boundary(err);
            task.fail(&err.to_string());
            return (task, Some(err));
        }
        Ok(SubmitOutcome::Completed(result)) => match result.url() {
            Some(url) => {
                task.succeed(Photo::new(
                    &url,
                    result.filename.as_deref(),
                    result.generation_time,
                ));
                return (task, None);
            }
            None => {
                let err =
                    StudioError::GenerationFailed("The service returned no image.".to_string());
                task.fail(&err.to_string());
                return (task, Some(err));
            }
        },
        Ok(SubmitOutcome::Accepted(server_task_id)) => {
            task.attach_server_task(&server_task_id);
        }
    }

    if let Err(err) = Poller::default().poll(&backend, &mut task, &tx).await {
        let err = StudioError::from_boundary(err);
        task.fail(&err.to_string());
        return (task, Some(err));
    }

    let outcome = match &task.status {
        TaskStatus::Succeeded(_) => None,
        TaskStatus::TimedOut => Some(StudioError::GenerationTimedOut),
        TaskStatus::Failed(reason) => Some(StudioError::GenerationFailed(reason.to_string())),
        _ => Some(StudioError::GenerationFailed(
            "The portrait service failed without details.".to_string(),
        )),
    };

    return (task, outcome);
}

fn spawn_selection_write(
    writes: &mut JoinSet<(u64, Option<String>)>,
    character: String,
    write: SelectionWrite,
) {
    writes.spawn(async move {
        let res = CharacterClient::default()
            .set_main_photos(&character, &write.photos)
            .await;

        match res {
            Ok(()) => return (write.seq, None),
            Err(err) => return (write.seq, Some(err.to_string())),
        }
    });
}

/// The background half of a generation session. Owns every piece of
/// mutable session state: the throttle, the gallery, the wallet balance
/// and the prompt cell. The console talks to it over the action channel
/// and renders the events it emits.
pub struct GeneratorService {}

impl GeneratorService {
    pub async fn start(
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let profile = ApiClient::default().me().await?;
        Config::set(ConfigKey::UserID, &profile.id);

        if let Err(err) = BackendManager::get(BackendName::Platform)?.health_check().await {
            tracing::warn!(err = ?err, "the portrait service failed its health check");
        }

        let cost = Config::get(ConfigKey::GenerationCost)
            .parse::<i64>()
            .unwrap_or(10);
        let queue_delay = Config::get(ConfigKey::QueueDelay)
            .parse::<u64>()
            .unwrap_or(500);

        let form = Drafts::default().load_or_default().await?;
        let character = form.name.to_string();
        let prompt = PromptCell::from_form(&form);
        let override_prompt = Config::get(ConfigKey::PromptOverride);
        if !override_prompt.is_empty() {
            prompt.override_prompt(&override_prompt);
        }

        let mut coins = profile.coins;
        let mut throttle = Throttle::new(profile.tier);
        let mut gallery = Gallery::new();

        tracing::debug!(
            tier = %profile.tier,
            coins = coins,
            character = character,
            "generator ready"
        );
        tx.send(Event::WalletBalance(coins))?;

        let mut workers: JoinSet<(GenerationTask, Option<StudioError>)> = JoinSet::new();
        let mut writes: JoinSet<(u64, Option<String>)> = JoinSet::new();
        let mut open = true;

        loop {
            if !open && workers.is_empty() && writes.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                action = rx.recv(), if open => match action {
                    None => {
                        open = false;
                    }
                    Some(Action::GeneratePortrait()) => {
                        let task = GenerationTask::new();
                        let request_id = task.request_id.to_string();

                        if let Err(err) = prompt.resolve() {
                            tx.send(Event::TaskFailed(request_id, err))?;
                        } else if coins < cost {
                            tx.send(Event::TaskFailed(
                                request_id,
                                StudioError::InsufficientBalance { balance: coins, cost },
                            ))?;
                        } else {
                            match throttle.admit(task) {
                                Err(err) => {
                                    tx.send(Event::TaskFailed(request_id, err))?;
                                }
                                Ok(Admission::Started(task)) => {
                                    coins -= cost;
                                    tx.send(Event::WalletBalance(coins))?;
                                    workers.spawn(run_generation(
                                        task,
                                        prompt.clone(),
                                        character.to_string(),
                                        0,
                                        tx.clone(),
                                    ));
                                }
                                Ok(Admission::Queued(position)) => {
                                    coins -= cost;
                                    tx.send(Event::WalletBalance(coins))?;
                                    tx.send(Event::TaskQueued(request_id, position))?;
                                }
                            }
                        }
                    }
                    Some(Action::TogglePhoto(photo_id)) => match gallery.toggle(&photo_id) {
                        Err(err) => {
                            tx.send(Event::SelectionFailed(err))?;
                        }
                        Ok(write) => {
                            spawn_selection_write(&mut writes, character.to_string(), write);
                        }
                    },
                },

                Some(joined) = workers.join_next(), if !workers.is_empty() => {
                    let (task, error) = joined?;

                    match &task.status {
                        TaskStatus::Succeeded(photo) => {
                            gallery.merge(photo.clone());
                            if let Some(write) = gallery.auto_select_first(&photo.id) {
                                spawn_selection_write(&mut writes, character.to_string(), write);
                            }
                            tx.send(Event::TaskSucceeded(
                                task.request_id.to_string(),
                                photo.clone(),
                            ))?;
                        }
                        _ => {
                            let err = error.unwrap_or_else(|| {
                                return StudioError::GenerationFailed(
                                    "The portrait service failed without details.".to_string(),
                                );
                            });
                            tx.send(Event::TaskFailed(task.request_id.to_string(), err))?;
                        }
                    }

                    if let Some(next) = throttle.complete() {
                        workers.spawn(run_generation(
                            next,
                            prompt.clone(),
                            character.to_string(),
                            queue_delay,
                            tx.clone(),
                        ));
                    }
                }

                Some(joined) = writes.join_next(), if !writes.is_empty() => {
                    let (seq, error) = joined?;

                    match gallery.resolve(seq, error.is_none()) {
                        WriteResolution::Applied => {
                            tx.send(Event::SelectionSaved(gallery.selected()))?;
                        }
                        WriteResolution::RolledBack => {
                            let message = error
                                .unwrap_or_else(|| return "unknown error".to_string());
                            tx.send(Event::SelectionFailed(StudioError::Persistence(message)))?;
                        }
                        WriteResolution::Discarded => {}
                    }
                }
            }
        }

        return Ok(());
    }
}
