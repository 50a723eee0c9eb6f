use tracing::debug;

use super::traits::ItemStatus;
use super::types::{LoadState, PlaybackState};
use crate::utils::errors::PlayerError;

/// Load lifecycle tracker: `Loading -> Ready | Failed`, plus the transient
/// stall-spinner flag fed by the player's buffer signals.
pub struct LoadStateMonitor {
    state: LoadState,
    spinner: bool,
}

impl LoadStateMonitor {
    pub fn new() -> Self {
        Self {
            state: LoadState::Loading,
            spinner: true,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    pub fn spinner_visible(&self) -> bool {
        self.spinner
    }

    /// Apply a status change from the external player.
    ///
    /// Returns the new state on a transition. `Ready` and `Failed` are
    /// terminal, so anything arriving after the first transition is dropped.
    /// An `Unknown` status is treated as a failure.
    pub fn on_status(&mut self, status: ItemStatus) -> Option<LoadState> {
        if self.state != LoadState::Loading {
            debug!(?status, "status change after load settled, ignoring");
            return None;
        }
        let next = match status {
            ItemStatus::ReadyToPlay => LoadState::Ready,
            ItemStatus::Failed(message) => LoadState::Failed(message),
            ItemStatus::Unknown => LoadState::Failed(PlayerError::StatusUnknown.to_string()),
        };
        self.spinner = false;
        self.state = next.clone();
        Some(next)
    }

    pub fn on_buffer_empty(&mut self) {
        self.spinner = true;
    }

    /// The keep-up signal only clears the spinner during active playback;
    /// while paused the player is not expected to keep up with anything.
    pub fn on_likely_to_keep_up(&mut self, playback: PlaybackState) {
        if playback == PlaybackState::Playing {
            self.spinner = false;
        }
    }
}

impl Default for LoadStateMonitor {
    fn default() -> Self {
        Self::new()
    }
}
