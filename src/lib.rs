// Playback control core: reconciles user transport commands, asynchronous
// player callbacks, and overlay visibility for a video player screen.
// The rendering pipeline and screen layout live with the embedding app;
// this crate owns only the state machines between them.

pub mod config;
pub mod player;
pub mod utils;
