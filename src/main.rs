use r_chatplay::audio::{AudioSpec, PlaybackEvent, SymphoniaEngineFactory, TokioClock};
use r_chatplay::chat::{format_clock_time, Author, HostHandle, PlayerHost};
use r_chatplay::config::Settings;
use r_chatplay::init_app_dirs;
use r_chatplay::ui::{Cli, ProgressRenderer};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const LOG_TARGET: &str = "r_chatplay::main";

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    let registry = tracing_subscriber::registry().with(filter);
    if settings.log_json {
        registry.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::new();
    let args = &cli.args;

    init_app_dirs()?;

    let config_path = match &args.config {
        Some(path) => PathBuf::from(path),
        None => Settings::default_path(),
    };
    let mut settings = Settings::load(&config_path)?;

    // Command line and environment take precedence over the file.
    if let Some(tick_ms) = args.tick_ms {
        settings.tick_interval_ms = tick_ms;
    }
    if args.json_logs {
        settings.log_json = true;
    }
    settings.validate()?;

    init_tracing(&settings);
    info!(target: LOG_TARGET, config = %config_path.display(), "Starting chatplay.");

    let engines = Arc::new(SymphoniaEngineFactory::new(settings.time_update_interval()));
    let (mut host, command_tx) = PlayerHost::new(&settings, Arc::new(TokioClock::new()), engines);
    let mut updates = host.subscribe_updates();
    let host_task = tokio::spawn(async move { host.run().await });
    let handle = HostHandle::new(command_tx);

    let now = format_clock_time(SystemTime::now());
    cli.display_text(Author::User, &now, "Can you send me a voice note?");
    handle.post_text(Author::User, "Can you send me a voice note?").await;
    cli.display_text(Author::Assistant, &now, "Sure, here it is.");
    handle.post_text(Author::Assistant, "Sure, here it is.").await;

    let Some(voice_id) = handle
        .post_audio(Author::Assistant, AudioSpec::from_message("mock", Some(args.mock_duration)))
        .await
    else {
        return Err("host stopped before the voice message was posted".into());
    };
    let media_id = match &args.media {
        Some(locator) => handle.post_audio(Author::User, AudioSpec::Locator(locator.clone())).await,
        None => None,
    };

    let mut renderer = ProgressRenderer::new();
    handle.toggle_play(voice_id).await;

    let mut seek_pending = args.seek;
    let mut finished = Vec::new();
    if !handle.view(voice_id).await.is_some_and(|view| view.is_playing) {
        warn!(target: LOG_TARGET, "Voice message did not start, duration {} is unusable.", args.mock_duration);
        finished.push(voice_id);
    }
    let expected = 1 + usize::from(media_id.is_some());
    let deadline = tokio::time::sleep(Duration::from_secs_f64(args.mock_duration.max(0.0) + 600.0));
    tokio::pin!(deadline);

    while finished.len() < expected {
        tokio::select! {
            update = updates.recv() => {
                let update = match update {
                    Ok(update) => update,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(target: LOG_TARGET, "Renderer lagged behind by {} update(s).", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                renderer.render(&update);
                match &update.event {
                    PlaybackEvent::PlayingChanged { is_playing: true } if update.message_id == voice_id => {
                        if let Some(fraction) = seek_pending.take() {
                            handle.seek_fraction(voice_id, fraction).await;
                        }
                    }
                    PlaybackEvent::DurationResolved { .. } if Some(update.message_id) == media_id => {
                        // A file can only start once it has been probed.
                        handle.toggle_play(update.message_id).await;
                    }
                    PlaybackEvent::Ended | PlaybackEvent::Failed { .. } => {
                        if !finished.contains(&update.message_id) {
                            finished.push(update.message_id);
                        }
                    }
                    _ => {}
                }
            }
            _ = &mut deadline => {
                warn!(target: LOG_TARGET, "Giving up waiting for playback to finish.");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                info!(target: LOG_TARGET, "Interrupted.");
                break;
            }
        }
    }

    renderer.finish();
    handle.shutdown().await;
    if let Err(e) = host_task.await {
        cli.display_error(&e);
    }
    info!(target: LOG_TARGET, "Chatplay finished.");
    Ok(())
}
