pub mod controller;
pub mod controls_visibility;
pub mod load_state;
pub mod progress;
pub mod property;
pub mod sim;
pub mod traits;
pub mod types;

pub use controller::{PlayerCommand, PlayerController, PlayerHandle};
pub use property::{Property, PropertySubscriber};
pub use sim::SimPlayer;
pub use traits::{ItemStatus, MediaPlayer, PlayerEvent, TimeRange};
pub use types::{LoadState, PlaybackSession, PlaybackState, ViewState};

use std::time::Duration;

/// Render a position or duration as `MM:SS`, with unpadded hours prepended
/// past one hour.
pub fn format_time(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Label for a playback-rate preset: whole rates lose the fraction.
pub fn speed_label(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{:.0}x", rate)
    } else {
        format!("{}x", rate)
    }
}
