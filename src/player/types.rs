use std::sync::Arc;
use std::time::Duration;

use super::property::Property;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Paused,
    Playing,
}

/// Load lifecycle of the media item. `Ready` and `Failed` are terminal;
/// playing a new source means constructing a new controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// Mutable playback bookkeeping, exclusively owned by the controller task.
/// Other components read it via [`crate::player::PlayerHandle::session`]
/// snapshots or the published [`ViewState`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    /// Zero until the external player resolves the media item.
    pub duration: Duration,
    pub position: Duration,
    /// Contiguous seconds buffered from the first reported range.
    pub buffered: Duration,
    pub rate: f64,
    pub repeat_enabled: bool,
    /// Set while a seek is in flight; tick updates are dropped so the
    /// optimistic position is not overwritten by stale reports.
    pub is_seeking: bool,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self {
            duration: Duration::ZERO,
            position: Duration::ZERO,
            buffered: Duration::ZERO,
            rate: 1.0,
            repeat_enabled: false,
            is_seeking: false,
        }
    }
}

/// Observable surface read by the UI layer.
pub struct ViewState {
    pub playback_state: Property<PlaybackState>,
    pub load_state: Property<LoadState>,
    /// Playback progress fraction in `0.0..=1.0`.
    pub progress: Property<f64>,
    /// Buffer-fill fraction in `0.0..=1.0`.
    pub buffered: Property<f64>,
    /// `"MM:SS / MM:SS"` label text, hours prepended past one hour.
    pub time_text: Property<String>,
    pub show_controls: Property<bool>,
    /// Transient loading-spinner flag; independent of `load_state` once
    /// the item is ready.
    pub is_buffering: Property<bool>,
}

impl ViewState {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            playback_state: Property::new(PlaybackState::Paused, "playback_state"),
            load_state: Property::new(LoadState::Loading, "load_state"),
            progress: Property::new(0.0, "progress"),
            buffered: Property::new(0.0, "buffered"),
            time_text: Property::new("00:00 / 00:00".to_string(), "time_text"),
            show_controls: Property::new(true, "show_controls"),
            is_buffering: Property::new(true, "is_buffering"),
        })
    }
}
