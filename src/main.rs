use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

use playhead::config::Config;
use playhead::player::{LoadState, PlayerController, SimPlayer};

/// Demo session against the simulated backend: resolve, play at 1.5x, skip
/// back, run to the end, then tear down. A second session shows the failure
/// path for a malformed source.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playhead=debug".into()),
        )
        .init();

    let config = Config::load()?;

    info!("starting demo playback session");
    run_session(
        "https://videos.pexels.com/video-files/5207408/5207408-hd_1920_1080_25fps.mp4",
        &config,
    )
    .await?;

    info!("starting demo session with a malformed source");
    run_session("this is a wrong url", &config).await?;

    Ok(())
}

async fn run_session(source: &str, config: &Config) -> Result<()> {
    let player = Arc::new(SimPlayer::new(source, Duration::from_secs(12)));
    let (handle, controller) = PlayerController::new(player.clone(), config.playback.clone());
    let controller_task = tokio::spawn(controller.run());

    let view = handle.view_state();
    let mut load_changes = view.load_state.subscribe();
    let mut time_changes = view.time_text.subscribe();
    let watcher = tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(state) = load_changes.wait_for_change() => info!(?state, "load state"),
                Some(text) = time_changes.wait_for_change() => info!(%text, "progress"),
                else => break,
            }
        }
    });

    player.resolve();
    sleep(Duration::from_millis(20)).await;

    if handle.view_state().load_state.get() != LoadState::Ready {
        info!("media failed to load, tearing the session down");
        handle.shutdown();
        let _ = controller_task.await;
        watcher.abort();
        return Ok(());
    }

    handle.play()?;
    handle.set_speed(1.5)?;
    for _ in 0..4 {
        player.advance(Duration::from_secs(1));
        sleep(Duration::from_millis(10)).await;
    }

    handle.skip_backward()?;
    sleep(Duration::from_millis(80)).await;

    while player.is_playing() {
        player.advance(Duration::from_secs(1));
        sleep(Duration::from_millis(10)).await;
    }
    sleep(Duration::from_millis(20)).await;

    info!(
        playback = ?handle.view_state().playback_state.get(),
        "session finished"
    );
    handle.shutdown();
    let _ = controller_task.await;
    watcher.abort();
    Ok(())
}
