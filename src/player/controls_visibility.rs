use std::time::Duration;
use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::task::JoinHandle;
use tracing::trace;

use super::controller::PlayerCommand;
use super::types::PlaybackState;

/// Auto-hide policy for the control overlay.
///
/// At most one hide timer is outstanding per instance: scheduling a new one
/// always cancels the previous. The timer task holds a weak sender, so a
/// timer that outlives the controller fires into nothing.
pub struct ControlsVisibility {
    visible: bool,
    hide_delay: Duration,
    hide_timer: Option<JoinHandle<()>>,
    sender: WeakUnboundedSender<PlayerCommand>,
}

impl ControlsVisibility {
    pub fn new(hide_delay: Duration, sender: WeakUnboundedSender<PlayerCommand>) -> Self {
        Self {
            visible: true,
            hide_delay,
            hide_timer: None,
            sender,
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// A tap on the player surface toggles the overlay. Revealing it during
    /// playback arms the hide timer; hiding it drops any pending timer.
    pub fn on_tap(&mut self, playing: bool) {
        self.visible = !self.visible;
        if self.visible {
            if playing {
                self.schedule_hide();
            }
        } else {
            self.cancel_hide();
        }
    }

    pub fn on_play_state_changed(&mut self, state: PlaybackState) {
        match state {
            PlaybackState::Playing => self.schedule_hide(),
            PlaybackState::Paused => {
                // Controls stay up while paused.
                self.cancel_hide();
                self.visible = true;
            }
        }
    }

    /// Reveal the overlay without arming the timer (media just became ready,
    /// playback has not started).
    pub fn force_visible(&mut self) {
        self.visible = true;
    }

    /// The hide timer fired and was routed back through the controller.
    pub fn on_hide_fired(&mut self) {
        trace!("hiding controls after inactivity");
        self.visible = false;
        self.hide_timer = None;
    }

    fn schedule_hide(&mut self) {
        self.cancel_hide();
        let delay = self.hide_delay;
        let sender = self.sender.clone();
        self.hide_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(sender) = sender.upgrade() {
                let _ = sender.send(PlayerCommand::HideControls);
            }
        }));
    }

    fn cancel_hide(&mut self) {
        if let Some(timer) = self.hide_timer.take() {
            timer.abort();
        }
    }
}

impl Drop for ControlsVisibility {
    fn drop(&mut self) {
        self.cancel_hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    const HIDE_DELAY: Duration = Duration::from_millis(2500);

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn tap_while_playing_schedules_a_single_hide() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut controls = ControlsVisibility::new(HIDE_DELAY, sender.downgrade());
        controls.on_hide_fired();

        controls.on_tap(true);
        assert!(controls.visible());
        assert!(controls.hide_timer.is_some());

        // Let the spawned timer task register its sleep before advancing the
        // paused clock, otherwise its deadline is set past the advance.
        settle().await;
        tokio::time::advance(HIDE_DELAY + Duration::from_millis(10)).await;
        settle().await;

        assert!(matches!(
            receiver.try_recv(),
            Ok(PlayerCommand::HideControls)
        ));
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn second_tap_cancels_the_pending_hide() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut controls = ControlsVisibility::new(HIDE_DELAY, sender.downgrade());
        controls.on_hide_fired();

        controls.on_tap(true);
        controls.on_tap(true);
        assert!(!controls.visible());
        assert!(controls.hide_timer.is_none());

        tokio::time::advance(HIDE_DELAY * 2).await;
        settle().await;
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_keeps_at_most_one_timer() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut controls = ControlsVisibility::new(HIDE_DELAY, sender.downgrade());

        controls.on_play_state_changed(PlaybackState::Playing);
        tokio::time::advance(Duration::from_millis(1000)).await;
        controls.on_play_state_changed(PlaybackState::Playing);

        // Let the rescheduled timer register its sleep before advancing the
        // paused clock, otherwise its deadline is set past the advance.
        settle().await;
        // The first timer would have fired by now if it were still armed.
        tokio::time::advance(Duration::from_millis(2000)).await;
        settle().await;
        assert!(receiver.try_recv().is_err());

        tokio::time::advance(Duration::from_millis(600)).await;
        settle().await;
        assert!(matches!(
            receiver.try_recv(),
            Ok(PlayerCommand::HideControls)
        ));
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn pausing_cancels_the_timer_and_reveals_controls() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut controls = ControlsVisibility::new(HIDE_DELAY, sender.downgrade());
        controls.on_hide_fired();

        controls.on_play_state_changed(PlaybackState::Playing);
        controls.on_play_state_changed(PlaybackState::Paused);
        assert!(controls.visible());
        assert!(controls.hide_timer.is_none());

        tokio::time::advance(HIDE_DELAY * 2).await;
        settle().await;
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_outliving_the_channel_is_a_no_op() {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut controls = ControlsVisibility::new(HIDE_DELAY, sender.downgrade());

        controls.on_play_state_changed(PlaybackState::Playing);
        drop(receiver);
        drop(sender);

        tokio::time::advance(HIDE_DELAY * 2).await;
        settle().await;
        // Nothing to assert beyond not panicking: the weak sender fails to
        // upgrade and the timer task exits quietly.
    }
}
