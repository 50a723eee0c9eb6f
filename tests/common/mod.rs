use std::sync::Arc;
use std::time::Duration;

use playhead::config::PlaybackConfig;
use playhead::player::{PlayerController, PlayerHandle, SimPlayer};

/// Let the controller task and any timer/seek tasks drain their queues.
/// Paused-clock tests stay deterministic because yielding never advances
/// the mock clock.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// Spawn a controller over a resolved `SimPlayer` with instant seeks.
pub async fn ready_player(duration_secs: u64) -> (Arc<SimPlayer>, PlayerHandle) {
    ready_player_with_seek_settle(duration_secs, Duration::ZERO).await
}

/// Same, with a configurable seek settle delay for in-flight-seek tests.
pub async fn ready_player_with_seek_settle(
    duration_secs: u64,
    seek_settle: Duration,
) -> (Arc<SimPlayer>, PlayerHandle) {
    let player = Arc::new(
        SimPlayer::new(
            "https://example.com/sample.mp4",
            Duration::from_secs(duration_secs),
        )
        .with_seek_settle(seek_settle),
    );
    let (handle, controller) = PlayerController::new(player.clone(), PlaybackConfig::default());
    tokio::spawn(controller.run());
    player.resolve_ready();
    settle().await;
    (player, handle)
}

/// Spawn a controller over an unresolved `SimPlayer`.
pub async fn loading_player(duration_secs: u64) -> (Arc<SimPlayer>, PlayerHandle) {
    let player = Arc::new(SimPlayer::new(
        "https://example.com/sample.mp4",
        Duration::from_secs(duration_secs),
    ));
    let (handle, controller) = PlayerController::new(player.clone(), PlaybackConfig::default());
    tokio::spawn(controller.run());
    settle().await;
    (player, handle)
}
