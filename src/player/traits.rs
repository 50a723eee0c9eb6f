use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::utils::errors::PlayerResult;

/// Readiness of the media item inside the external player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    Unknown,
    ReadyToPlay,
    Failed(String),
}

/// A contiguous stretch of buffered media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Duration,
    pub duration: Duration,
}

impl TimeRange {
    pub fn new(start: Duration, duration: Duration) -> Self {
        Self { start, duration }
    }

    pub fn end(&self) -> Duration {
        self.start + self.duration
    }
}

/// Asynchronous notifications from the external player.
///
/// Backends may deliver these from any thread; the controller drains them on
/// its own task, so handlers never race command processing.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// Periodic position report, nominally once per second.
    Tick { position: Duration },
    /// The media item resolved its readiness.
    Status(ItemStatus),
    /// Updated set of buffered ranges, earliest first.
    BufferedRanges(Vec<TimeRange>),
    /// The playback buffer drained and rendering is about to stall.
    BufferEmpty,
    /// The player expects to keep up without stalling.
    LikelyToKeepUp,
    /// Playback reached the end of the media.
    PlayedToEnd,
}

/// Transport-level interface of the external media player.
///
/// The controller is the only component issuing these commands; everything
/// else observes state through [`super::types::ViewState`].
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    async fn play(&self) -> PlayerResult<()>;
    async fn pause(&self) -> PlayerResult<()>;
    /// Seek to `position`. Resolves `true` once the pipeline lands on the
    /// target, `false` when a newer seek superseded this one.
    async fn seek(&self, position: Duration) -> PlayerResult<bool>;
    async fn position(&self) -> Option<Duration>;
    /// `None` until the media item has resolved.
    async fn duration(&self) -> Option<Duration>;
    async fn set_rate(&self, rate: f64) -> PlayerResult<()>;
    /// Register for player events. Dropping the receiver releases the
    /// registration.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<PlayerEvent>;
}
