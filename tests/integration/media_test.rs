//! Integration tests for real media playback
//!
//! These decode small WAV files written to a temporary directory, so they
//! run in real time.

use crate::test_utils::{spawn_host, wait_for, write_silent_wav};
use r_chatplay::audio::{AudioSpec, PlaybackEvent, SymphoniaEngineFactory};
use r_chatplay::chat::Author;
use r_chatplay::config::Settings;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

const WAIT: Duration = Duration::from_secs(10);

#[cfg(test)]
mod media_integration_tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            time_update_interval_ms: 100,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_wav_plays_to_end() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("voice.wav");
        write_silent_wav(&path, 0.6, 8000)?;

        let engines = Arc::new(SymphoniaEngineFactory::new(settings().time_update_interval()));
        let (handle, mut updates, task) = spawn_host(&settings(), engines);
        let id = handle
            .post_audio(Author::User, AudioSpec::Locator(path.display().to_string()))
            .await
            .unwrap();

        let resolved = tokio::time::timeout(
            WAIT,
            wait_for(&mut updates, id, |e| matches!(e, PlaybackEvent::DurationResolved { .. })),
        )
        .await?;
        match resolved.event {
            PlaybackEvent::DurationResolved { total_seconds } => assert!((total_seconds - 0.6).abs() < 0.01),
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(resolved.view.elapsed_label, "00:01");

        handle.toggle_play(id).await;
        let started = tokio::time::timeout(
            WAIT,
            wait_for(&mut updates, id, |e| *e == PlaybackEvent::PlayingChanged { is_playing: true }),
        )
        .await?;
        assert!(started.view.is_playing);

        let ended = tokio::time::timeout(WAIT, wait_for(&mut updates, id, |e| *e == PlaybackEvent::Ended)).await?;
        assert!(!ended.view.is_playing);
        assert_eq!(ended.view.progress_percent, Some(0.0));
        assert_eq!(ended.view.elapsed_label, "00:01");

        handle.shutdown().await;
        task.await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_file_url_and_seek() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("long.wav");
        write_silent_wav(&path, 4.0, 8000)?;
        let locator = url::Url::from_file_path(&path)
            .map_err(|_| "path is not absolute")?
            .to_string();

        let engines = Arc::new(SymphoniaEngineFactory::new(settings().time_update_interval()));
        let (handle, mut updates, task) = spawn_host(&settings(), engines);
        let id = handle.post_audio(Author::User, AudioSpec::Locator(locator)).await.unwrap();
        tokio::time::timeout(
            WAIT,
            wait_for(&mut updates, id, |e| matches!(e, PlaybackEvent::DurationResolved { .. })),
        )
        .await?;

        handle.seek_fraction(id, 0.5).await;
        let progress = tokio::time::timeout(
            WAIT,
            wait_for(&mut updates, id, |e| matches!(e, PlaybackEvent::Progress { .. })),
        )
        .await?;
        match progress.event {
            PlaybackEvent::Progress { current_seconds } => assert!((current_seconds - 2.0).abs() < 0.01),
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(progress.view.elapsed_label, "00:02");

        handle.shutdown().await;
        task.await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_seek_to_end_reports_full_progress() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("short.wav");
        write_silent_wav(&path, 2.0, 8000)?;

        let engines = Arc::new(SymphoniaEngineFactory::new(settings().time_update_interval()));
        let (handle, mut updates, task) = spawn_host(&settings(), engines);
        let id = handle
            .post_audio(Author::User, AudioSpec::Locator(path.display().to_string()))
            .await
            .unwrap();
        tokio::time::timeout(
            WAIT,
            wait_for(&mut updates, id, |e| matches!(e, PlaybackEvent::DurationResolved { .. })),
        )
        .await?;

        handle.seek_fraction(id, 1.0).await;
        let progress = tokio::time::timeout(
            WAIT,
            wait_for(&mut updates, id, |e| matches!(e, PlaybackEvent::Progress { .. })),
        )
        .await?;
        match progress.event {
            PlaybackEvent::Progress { current_seconds } => assert!((current_seconds - 2.0).abs() < 0.01),
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(progress.view.progress_percent, Some(100.0));
        assert_eq!(progress.view.elapsed_label, "00:02");

        handle.shutdown().await;
        task.await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_reports_error() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("absent.wav");

        let (handle, mut updates, task) = spawn_host(&settings(), Arc::new(SymphoniaEngineFactory::default()));
        let id = handle
            .post_audio(Author::User, AudioSpec::Locator(path.display().to_string()))
            .await
            .unwrap();

        let failed = tokio::time::timeout(
            WAIT,
            wait_for(&mut updates, id, |e| matches!(e, PlaybackEvent::Failed { .. })),
        )
        .await?;
        assert!(failed.view.error.unwrap().starts_with("I/O error"));

        handle.shutdown().await;
        task.await?;
        Ok(())
    }
}
