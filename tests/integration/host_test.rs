//! Integration tests for the chat host
//!
//! These drive a host through its public handle the way a chat view would.

use crate::test_utils::{spawn_host, wait_for};
use r_chatplay::audio::{AudioSpec, PlaybackEvent, SymphoniaEngineFactory};
use r_chatplay::chat::Author;
use r_chatplay::config::Settings;
use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
mod host_integration_tests {
    use super::*;

    /// A simulated voice note plays, can be paused and resumed, and ends
    /// with the position rewound and the full length on the label.
    #[tokio::test(start_paused = true)]
    async fn test_conversation_with_mock_audio() {
        let (handle, mut updates, task) = spawn_host(&Settings::default(), Arc::new(SymphoniaEngineFactory::default()));

        let greeting = handle.post_text(Author::User, "hi").await.unwrap();
        let voice = handle
            .post_audio(Author::Assistant, AudioSpec::from_message("mock", Some(3.0)))
            .await
            .unwrap();
        assert_eq!(voice, greeting + 1);

        handle.toggle_play(voice).await;
        wait_for(&mut updates, voice, |e| matches!(e, PlaybackEvent::Progress { current_seconds } if *current_seconds >= 1.0)).await;

        handle.toggle_play(voice).await;
        let paused = wait_for(&mut updates, voice, |e| *e == PlaybackEvent::PlayingChanged { is_playing: false }).await;
        let paused_percent = paused.view.progress_percent.unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        let still = handle.view(voice).await.unwrap();
        assert!(!still.is_playing);
        assert_eq!(still.progress_percent, Some(paused_percent));

        handle.toggle_play(voice).await;
        let ended = wait_for(&mut updates, voice, |e| *e == PlaybackEvent::Ended).await;
        assert_eq!(ended.view.elapsed_label, "00:03");
        assert_eq!(ended.view.progress_percent, Some(0.0));
        assert_eq!(ended.view.button_icon(), "play_circle_filled");

        handle.shutdown().await;
        let host = task.await.unwrap();
        assert_eq!(host.message_count(), 2);
    }

    /// Removing a playing message stops its ticks.
    #[tokio::test(start_paused = true)]
    async fn test_remove_playing_message() {
        let (handle, mut updates, task) = spawn_host(&Settings::default(), Arc::new(SymphoniaEngineFactory::default()));
        let voice = handle
            .post_audio(Author::User, AudioSpec::from_message("mock", Some(30.0)))
            .await
            .unwrap();
        handle.toggle_play(voice).await;
        wait_for(&mut updates, voice, |e| matches!(e, PlaybackEvent::Progress { .. })).await;

        handle.remove(voice).await;
        assert_eq!(handle.view(voice).await, None);
        while updates.try_recv().is_ok() {}

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(updates.try_recv().is_err());

        handle.shutdown().await;
        task.await.unwrap();
    }

    /// Network locators are not supported; the player reports an error state.
    #[tokio::test]
    async fn test_network_locator_fails() {
        let (handle, mut updates, task) = spawn_host(&Settings::default(), Arc::new(SymphoniaEngineFactory::default()));
        let voice = handle
            .post_audio(Author::User, AudioSpec::Locator("https://example.com/voice.ogg".to_string()))
            .await
            .unwrap();

        let failed = tokio::time::timeout(
            Duration::from_secs(10),
            wait_for(&mut updates, voice, |e| matches!(e, PlaybackEvent::Failed { .. })),
        )
        .await
        .expect("no failure reported");
        let error = failed.view.error.unwrap();
        assert!(error.contains("Unsupported locator"));

        handle.toggle_play(voice).await;
        let view = handle.view(voice).await.unwrap();
        assert!(!view.is_playing);
        assert!(view.error.is_some());

        handle.shutdown().await;
        task.await.unwrap();
    }
}
