use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use super::traits::{ItemStatus, MediaPlayer, PlayerEvent};
use crate::utils::errors::{PlayerError, PlayerResult};

/// Deterministic in-process player backend.
///
/// Stands in for a platform media pipeline in the demo binary and in tests:
/// readiness, ticks, and buffer reports are driven explicitly through
/// [`SimPlayer::resolve`], [`SimPlayer::advance`], and [`SimPlayer::emit`]
/// instead of by a decoder clock.
pub struct SimPlayer {
    source: String,
    state: Mutex<SimState>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<PlayerEvent>>>,
    seek_epoch: AtomicU64,
    seek_settle: Duration,
}

struct SimState {
    playing: bool,
    rate: f64,
    position: Duration,
    duration: Duration,
    resolved: bool,
}

impl SimPlayer {
    pub fn new(source: impl Into<String>, duration: Duration) -> Self {
        Self {
            source: source.into(),
            state: Mutex::new(SimState {
                playing: false,
                rate: 1.0,
                position: Duration::ZERO,
                duration,
                resolved: false,
            }),
            subscribers: Mutex::new(Vec::new()),
            seek_epoch: AtomicU64::new(0),
            seek_settle: Duration::from_millis(50),
        }
    }

    /// How long a seek takes to land in the simulated pipeline.
    pub fn with_seek_settle(mut self, delay: Duration) -> Self {
        self.seek_settle = delay;
        self
    }

    /// Resolve the pending item the way a real pipeline would: sources with
    /// a scheme load, anything else fails.
    pub fn resolve(&self) {
        if self.source.contains("://") {
            self.resolve_ready();
        } else {
            let error = PlayerError::InvalidMediaSource(self.source.clone());
            self.resolve_failed(&error.to_string());
        }
    }

    pub fn resolve_ready(&self) {
        self.state.lock().unwrap().resolved = true;
        self.emit(PlayerEvent::Status(ItemStatus::ReadyToPlay));
    }

    pub fn resolve_failed(&self, message: &str) {
        debug!(source = %self.source, %message, "simulated load failure");
        self.emit(PlayerEvent::Status(ItemStatus::Failed(message.to_string())));
    }

    /// Broadcast an event to every live subscriber.
    pub fn emit(&self, event: PlayerEvent) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
    }

    /// Move the media clock forward while playing, emitting a position tick.
    /// Call once per observer interval. Reaching the end stops playback and
    /// emits a single end-of-media notification.
    pub fn advance(&self, elapsed: Duration) {
        let mut events = Vec::new();
        {
            let mut state = self.state.lock().unwrap();
            if !state.playing || !state.resolved {
                return;
            }
            let next = state.position + elapsed.mul_f64(state.rate);
            if next >= state.duration {
                state.position = state.duration;
                state.playing = false;
                events.push(PlayerEvent::Tick {
                    position: state.position,
                });
                events.push(PlayerEvent::PlayedToEnd);
            } else {
                state.position = next;
                events.push(PlayerEvent::Tick {
                    position: state.position,
                });
            }
        }
        for event in events {
            self.emit(event);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    pub fn rate(&self) -> f64 {
        self.state.lock().unwrap().rate
    }
}

#[async_trait]
impl MediaPlayer for SimPlayer {
    async fn play(&self) -> PlayerResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.resolved {
            return Err(PlayerError::Playback("media item not resolved".into()));
        }
        state.playing = true;
        Ok(())
    }

    async fn pause(&self) -> PlayerResult<()> {
        self.state.lock().unwrap().playing = false;
        Ok(())
    }

    async fn seek(&self, position: Duration) -> PlayerResult<bool> {
        let epoch = self.seek_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.seek_settle).await;
        if self.seek_epoch.load(Ordering::SeqCst) != epoch {
            // A newer seek took over while this one was settling.
            return Ok(false);
        }
        let mut state = self.state.lock().unwrap();
        state.position = position.min(state.duration);
        Ok(true)
    }

    async fn position(&self) -> Option<Duration> {
        Some(self.state.lock().unwrap().position)
    }

    async fn duration(&self) -> Option<Duration> {
        let state = self.state.lock().unwrap();
        state.resolved.then_some(state.duration)
    }

    async fn set_rate(&self, rate: f64) -> PlayerResult<()> {
        self.state.lock().unwrap().rate = rate;
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<PlayerEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(sender);
        receiver
    }
}
