use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;

use crate::notification::store::StoreEvent;

pub const DEFAULT_SOUND_SRC: &str = "/notification-sound.mp3";
pub const DEFAULT_SOUND_VOLUME: f32 = 0.5;

#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error("No client is listening for the alert")]
    NoListener,

    #[error("Alert sound is disabled")]
    Disabled,
}

/// Instruction for a client to play the alert sound.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Chime {
    pub src: String,
    pub volume: f32,
}

/// Audible alert fired after a notification is added. Best effort only.
#[async_trait]
pub trait AlertSound: Send + Sync {
    async fn play(&self) -> Result<(), SoundError>;
}

/// Asks connected clients to play the chime.
pub struct BroadcastChime {
    events: broadcast::Sender<StoreEvent>,
    chime: Chime,
}

impl BroadcastChime {
    pub fn new(events: broadcast::Sender<StoreEvent>, src: impl Into<String>) -> Self {
        Self {
            events,
            chime: Chime {
                src: src.into(),
                volume: DEFAULT_SOUND_VOLUME,
            },
        }
    }
}

#[async_trait]
impl AlertSound for BroadcastChime {
    async fn play(&self) -> Result<(), SoundError> {
        self.events
            .send(StoreEvent::Chime(self.chime.clone()))
            .map(|_| ())
            .map_err(|_| SoundError::NoListener)
    }
}

pub struct Silent;

#[async_trait]
impl AlertSound for Silent {
    async fn play(&self) -> Result<(), SoundError> {
        Err(SoundError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_chime_reaches_subscriber() {
        let (tx, mut rx) = broadcast::channel(8);
        let sound = BroadcastChime::new(tx, DEFAULT_SOUND_SRC);

        sound.play().await.unwrap();
        match rx.recv().await.unwrap() {
            StoreEvent::Chime(chime) => {
                assert_eq!(chime.src, "/notification-sound.mp3");
                assert_eq!(chime.volume, 0.5);
            }
            other => panic!("Expected chime, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_broadcast_chime_without_listener_fails() {
        let (tx, rx) = broadcast::channel(8);
        drop(rx);
        let sound = BroadcastChime::new(tx, DEFAULT_SOUND_SRC);

        assert!(matches!(sound.play().await, Err(SoundError::NoListener)));
    }

    #[tokio::test]
    async fn test_silent_never_plays() {
        assert!(matches!(Silent.play().await, Err(SoundError::Disabled)));
    }
}
