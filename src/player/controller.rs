use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::controls_visibility::ControlsVisibility;
use super::load_state::LoadStateMonitor;
use super::progress::ProgressSync;
use super::traits::{MediaPlayer, PlayerEvent};
use super::types::{LoadState, PlaybackSession, PlaybackState, ViewState};
use crate::config::PlaybackConfig;
use crate::utils::errors::{PlayerError, PlayerResult};

/// Commands processed by the player controller.
///
/// `HideControls`, `ApplyRate`, and `SeekCompleted` are fed back by the
/// controller's own timer and seek tasks rather than sent by callers.
#[derive(Debug)]
pub enum PlayerCommand {
    TogglePlay,
    Play,
    Pause,
    /// Seek to an absolute position.
    Seek { position: Duration },
    /// Seek to a fraction of the known duration (slider tap).
    SeekToFraction { fraction: f64 },
    /// Seek relative to the player's live position.
    Skip { delta_seconds: f64 },
    SkipForward,
    SkipBackward,
    SetRepeat { enabled: bool },
    SetSpeed { rate: f64 },
    /// A tap on the player surface toggled the control overlay.
    TapOverlay,
    /// Snapshot of the playback session.
    GetSession {
        respond_to: oneshot::Sender<PlaybackSession>,
    },
    /// The auto-hide timer fired.
    HideControls,
    /// Deferred application of the stored playback rate.
    ApplyRate,
    /// An asynchronous seek finished in the external player.
    SeekCompleted { generation: u64, done: bool },
}

/// Owns the external player and every piece of mutable playback state.
///
/// All mutation happens inside [`PlayerController::run`]; commands and
/// player events are marshalled onto that task through channels, so no
/// locking is needed anywhere in the control path.
pub struct PlayerController {
    player: Arc<dyn MediaPlayer>,
    receiver: mpsc::UnboundedReceiver<PlayerCommand>,
    self_sender: mpsc::UnboundedSender<PlayerCommand>,
    events: Option<mpsc::UnboundedReceiver<PlayerEvent>>,
    config: PlaybackConfig,
    session: PlaybackSession,
    playback_state: PlaybackState,
    load: LoadStateMonitor,
    controls: ControlsVisibility,
    progress: ProgressSync,
    seek_generation: u64,
    view: Arc<ViewState>,
    shutdown: CancellationToken,
}

impl PlayerController {
    /// Create a controller for `player` and the handle used to drive it.
    /// The caller spawns [`PlayerController::run`] on its runtime.
    pub fn new(
        player: Arc<dyn MediaPlayer>,
        config: PlaybackConfig,
    ) -> (PlayerHandle, PlayerController) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let view = ViewState::new();

        // Subscribing here rather than in run() means no event emitted
        // between construction and the first poll can be lost.
        let events = player.subscribe();

        let controller = PlayerController {
            controls: ControlsVisibility::new(config.hide_controls_delay(), sender.downgrade()),
            progress: ProgressSync::new(view.clone()),
            player,
            receiver,
            self_sender: sender.clone(),
            events: Some(events),
            config,
            session: PlaybackSession::default(),
            playback_state: PlaybackState::Paused,
            load: LoadStateMonitor::new(),
            seek_generation: 0,
            view: view.clone(),
            shutdown: shutdown.clone(),
        };
        let handle = PlayerHandle {
            sender,
            view,
            shutdown,
        };

        (handle, controller)
    }

    /// Drive the controller until shutdown.
    ///
    /// Exiting drops the event subscription and the pending hide timer, and
    /// the weak senders held by in-flight timer and seek tasks stop
    /// resolving, so no callback can reach freed state.
    pub async fn run(mut self) {
        debug!("player controller loop started");

        let Some(mut events) = self.events.take() else {
            return;
        };
        let shutdown = self.shutdown.clone();
        let mut events_open = true;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                command = self.receiver.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                event = events.recv(), if events_open => match event {
                    Some(event) => self.handle_event(event).await,
                    None => {
                        debug!("player event stream closed");
                        events_open = false;
                    }
                },
            }
        }

        debug!("player controller loop terminated");
    }

    async fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::TogglePlay => match self.playback_state {
                PlaybackState::Playing => self.pause().await,
                PlaybackState::Paused => self.play().await,
            },
            PlayerCommand::Play => self.play().await,
            PlayerCommand::Pause => self.pause().await,
            PlayerCommand::Seek { position } => self.seek(position).await,
            PlayerCommand::SeekToFraction { fraction } => {
                if !fraction.is_finite() {
                    return;
                }
                if self.load.is_ready() && !self.session.duration.is_zero() {
                    let target = self.session.duration.mul_f64(fraction.clamp(0.0, 1.0));
                    self.seek(target).await;
                }
            }
            PlayerCommand::Skip { delta_seconds } => self.skip(delta_seconds).await,
            PlayerCommand::SkipForward => self.skip(self.config.skip_interval_secs).await,
            PlayerCommand::SkipBackward => self.skip(-self.config.skip_interval_secs).await,
            PlayerCommand::SetRepeat { enabled } => {
                self.session.repeat_enabled = enabled;
            }
            PlayerCommand::SetSpeed { rate } => self.set_speed(rate).await,
            PlayerCommand::TapOverlay => {
                self.controls
                    .on_tap(self.playback_state == PlaybackState::Playing);
                self.publish_controls();
            }
            PlayerCommand::GetSession { respond_to } => {
                let _ = respond_to.send(self.session.clone());
            }
            PlayerCommand::HideControls => {
                self.controls.on_hide_fired();
                self.publish_controls();
            }
            PlayerCommand::ApplyRate => {
                // Deferred so it does not race the backend's own play-state
                // settling; dropped if playback stopped in the meantime.
                if self.playback_state == PlaybackState::Playing {
                    if let Err(err) = self.player.set_rate(self.session.rate).await {
                        warn!(error = %err, "deferred rate apply failed");
                    }
                }
            }
            PlayerCommand::SeekCompleted { generation, done } => {
                if generation == self.seek_generation && done {
                    self.session.is_seeking = false;
                } else {
                    trace!(
                        generation,
                        latest = self.seek_generation,
                        done,
                        "stale seek completion ignored"
                    );
                }
            }
        }
    }

    async fn handle_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Tick { position } => self.on_tick(position).await,
            PlayerEvent::Status(status) => self.on_status(status).await,
            PlayerEvent::BufferedRanges(ranges) => {
                self.progress.on_buffered_ranges(&mut self.session, &ranges);
            }
            PlayerEvent::BufferEmpty => {
                self.load.on_buffer_empty();
                self.view.is_buffering.set(self.load.spinner_visible());
            }
            PlayerEvent::LikelyToKeepUp => {
                self.load.on_likely_to_keep_up(self.playback_state);
                self.view.is_buffering.set(self.load.spinner_visible());
            }
            PlayerEvent::PlayedToEnd => self.on_played_to_end().await,
        }
    }

    async fn play(&mut self) {
        if !self.load.is_ready() {
            debug!("ignoring play before media is ready");
            return;
        }
        if self.playback_state == PlaybackState::Playing {
            return;
        }
        if let Err(err) = self.player.play().await {
            warn!(error = %err, "play command failed");
            return;
        }
        self.playback_state = PlaybackState::Playing;
        self.schedule_rate_apply();
        self.controls.on_play_state_changed(PlaybackState::Playing);
        self.publish_playback();
        self.publish_controls();
    }

    async fn pause(&mut self) {
        if !self.load.is_ready() {
            debug!("ignoring pause before media is ready");
            return;
        }
        if let Err(err) = self.player.pause().await {
            warn!(error = %err, "pause command failed");
            return;
        }
        self.playback_state = PlaybackState::Paused;
        self.controls.on_play_state_changed(PlaybackState::Paused);
        self.publish_playback();
        self.publish_controls();
    }

    /// Clamp, update the display optimistically, and hand the seek to the
    /// external player. Only the completion matching the newest generation
    /// may clear `is_seeking`; completions of superseded seeks are stale.
    async fn seek(&mut self, target: Duration) {
        if !self.load.is_ready() || self.session.duration.is_zero() {
            debug!("ignoring seek before duration is known");
            return;
        }
        let clamped = target.min(self.session.duration);

        self.seek_generation += 1;
        let generation = self.seek_generation;
        self.session.is_seeking = true;
        self.session.position = clamped;
        self.progress.publish_position(&self.session);
        trace!(generation, position_secs = clamped.as_secs_f64(), "seeking");

        let player = Arc::clone(&self.player);
        let sender = self.self_sender.downgrade();
        tokio::spawn(async move {
            let done = match player.seek(clamped).await {
                Ok(done) => done,
                Err(err) => {
                    warn!(error = %err, "seek command failed");
                    false
                }
            };
            if let Some(sender) = sender.upgrade() {
                let _ = sender.send(PlayerCommand::SeekCompleted { generation, done });
            }
        });
    }

    async fn skip(&mut self, delta_seconds: f64) {
        if !self.load.is_ready() || !delta_seconds.is_finite() {
            return;
        }
        let current = match self.player.position().await {
            Some(position) => position,
            None => self.session.position,
        };
        let target = (current.as_secs_f64() + delta_seconds).max(0.0);
        self.seek(Duration::from_secs_f64(target)).await;
    }

    async fn set_speed(&mut self, rate: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            warn!(rate, "ignoring non-positive playback rate");
            return;
        }
        self.session.rate = rate;
        if self.load.is_ready() && self.playback_state == PlaybackState::Playing {
            if let Err(err) = self.player.set_rate(rate).await {
                warn!(error = %err, "rate change failed");
            }
        }
    }

    async fn on_tick(&mut self, position: Duration) {
        // The duration can resolve later than the ready status on some
        // backends; pick it up lazily.
        if !self.session.is_seeking && self.session.duration.is_zero() {
            if let Some(duration) = self.player.duration().await {
                self.session.duration = duration;
            }
        }
        self.progress.on_tick(&mut self.session, position);
    }

    async fn on_status(&mut self, status: super::traits::ItemStatus) {
        let Some(transition) = self.load.on_status(status) else {
            return;
        };
        match &transition {
            LoadState::Ready => {
                if let Some(duration) = self.player.duration().await {
                    self.session.duration = duration;
                }
                info!(
                    duration_secs = self.session.duration.as_secs_f64(),
                    "media ready"
                );
                self.controls.force_visible();
                self.progress.publish_position(&self.session);
                self.publish_controls();
            }
            LoadState::Failed(message) => {
                info!(%message, "media failed to load");
            }
            LoadState::Loading => return,
        }
        self.view.load_state.set(transition);
        self.view.is_buffering.set(self.load.spinner_visible());
    }

    async fn on_played_to_end(&mut self) {
        if self.session.repeat_enabled {
            info!("reached end of media, repeating");
            self.seek(Duration::ZERO).await;
            if let Err(err) = self.player.play().await {
                warn!(error = %err, "restart after end failed");
            }
            self.playback_state = PlaybackState::Playing;
            self.publish_playback();
        } else {
            info!("reached end of media, pausing");
            if let Err(err) = self.player.pause().await {
                warn!(error = %err, "pause at end failed");
            }
            self.playback_state = PlaybackState::Paused;
            self.controls.on_play_state_changed(PlaybackState::Paused);
            self.publish_playback();
            self.publish_controls();
        }
    }

    fn schedule_rate_apply(&self) {
        let delay = self.config.rate_apply_delay();
        let sender = self.self_sender.downgrade();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(sender) = sender.upgrade() {
                let _ = sender.send(PlayerCommand::ApplyRate);
            }
        });
    }

    fn publish_playback(&self) {
        self.view.playback_state.set(self.playback_state);
    }

    fn publish_controls(&self) {
        self.view.show_controls.set(self.controls.visible());
    }
}

/// Cloneable handle for driving the controller and observing its state.
#[derive(Clone)]
pub struct PlayerHandle {
    sender: mpsc::UnboundedSender<PlayerCommand>,
    view: Arc<ViewState>,
    shutdown: CancellationToken,
}

impl PlayerHandle {
    fn send(&self, command: PlayerCommand) -> PlayerResult<()> {
        self.sender
            .send(command)
            .map_err(|_| PlayerError::Disconnected)
    }

    pub fn play(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::Play)
    }

    pub fn pause(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::Pause)
    }

    /// Primary-button entry point: dispatches to play or pause based on the
    /// current state.
    pub fn toggle_play(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::TogglePlay)
    }

    pub fn seek(&self, position: Duration) -> PlayerResult<()> {
        self.send(PlayerCommand::Seek { position })
    }

    pub fn seek_to_fraction(&self, fraction: f64) -> PlayerResult<()> {
        self.send(PlayerCommand::SeekToFraction { fraction })
    }

    pub fn skip(&self, delta_seconds: f64) -> PlayerResult<()> {
        self.send(PlayerCommand::Skip { delta_seconds })
    }

    pub fn skip_forward(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::SkipForward)
    }

    pub fn skip_backward(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::SkipBackward)
    }

    pub fn set_repeat(&self, enabled: bool) -> PlayerResult<()> {
        self.send(PlayerCommand::SetRepeat { enabled })
    }

    pub fn set_speed(&self, rate: f64) -> PlayerResult<()> {
        self.send(PlayerCommand::SetSpeed { rate })
    }

    pub fn tap_overlay(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::TapOverlay)
    }

    /// Snapshot of the controller's playback session.
    pub async fn session(&self) -> PlayerResult<PlaybackSession> {
        let (respond_to, response) = oneshot::channel();
        self.send(PlayerCommand::GetSession { respond_to })?;
        response.await.map_err(|_| PlayerError::Disconnected)
    }

    /// Observable state for UI bindings.
    pub fn view_state(&self) -> Arc<ViewState> {
        self.view.clone()
    }

    /// Stop the controller loop, releasing the event subscription and any
    /// pending timers.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("connected", &!self.sender.is_closed())
            .finish()
    }
}
