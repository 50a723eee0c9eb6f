use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

use super::format_time;
use super::traits::TimeRange;
use super::types::{PlaybackSession, ViewState};

/// Reconciles periodic player reports with the session and publishes the
/// derived progress, buffer-fill, and time-label values.
pub struct ProgressSync {
    view: Arc<ViewState>,
}

impl ProgressSync {
    pub fn new(view: Arc<ViewState>) -> Self {
        Self { view }
    }

    /// Apply a periodic position report.
    ///
    /// Dropped entirely while a seek is in flight: the optimistic position
    /// set by the seek must not be overwritten by a stale report.
    pub fn on_tick(&self, session: &mut PlaybackSession, position: Duration) {
        if session.is_seeking {
            trace!("position tick ignored while a seek is in flight");
            return;
        }
        session.position = if session.duration.is_zero() {
            position
        } else {
            position.min(session.duration)
        };
        self.publish_position(session);
    }

    /// Apply a buffered-ranges report.
    pub fn on_buffered_ranges(&self, session: &mut PlaybackSession, ranges: &[TimeRange]) {
        session.buffered = buffered_total(ranges);
        self.view
            .buffered
            .set(fraction_of(session.buffered, session.duration));
    }

    pub fn publish_position(&self, session: &PlaybackSession) {
        self.view
            .progress
            .set(fraction_of(session.position, session.duration));
        self.view.time_text.set(format!(
            "{} / {}",
            format_time(session.position),
            format_time(session.duration)
        ));
    }
}

/// Seconds buffered from the start of playback.
///
/// Only the first reported range counts; later disjoint ranges are ignored,
/// so sources buffered with gaps under-report.
pub fn buffered_total(ranges: &[TimeRange]) -> Duration {
    ranges.first().map(TimeRange::end).unwrap_or(Duration::ZERO)
}

/// `value / duration` clamped to `0.0..=1.0`; zero while the duration is
/// still unknown.
pub fn fraction_of(value: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }
    (value.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}
