use thiserror::Error;

pub type PlayerResult<T> = Result<T, PlayerError>;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("invalid media source: {0}")]
    InvalidMediaSource(String),

    #[error("player status unknown")]
    StatusUnknown,

    #[error("playback command failed: {0}")]
    Playback(String),

    #[error("player controller disconnected")]
    Disconnected,
}
