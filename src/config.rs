use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackConfig {
    /// Seconds the control overlay stays up after the last interaction.
    #[serde(default = "default_hide_controls_delay")]
    pub hide_controls_delay_secs: f64,

    /// Delay before the stored rate is applied after a play command.
    #[serde(default = "default_rate_apply_delay")]
    pub rate_apply_delay_ms: u64,

    /// Jump distance of the forward/backward buttons.
    #[serde(default = "default_skip_interval")]
    pub skip_interval_secs: f64,

    /// Rates offered by the speed selector.
    #[serde(default = "default_speed_presets")]
    pub speed_presets: Vec<f64>,
}

fn default_hide_controls_delay() -> f64 {
    2.5
}

fn default_rate_apply_delay() -> u64 {
    100
}

fn default_skip_interval() -> f64 {
    10.0
}

fn default_speed_presets() -> Vec<f64> {
    vec![0.5, 1.0, 1.5, 2.0]
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            hide_controls_delay_secs: default_hide_controls_delay(),
            rate_apply_delay_ms: default_rate_apply_delay(),
            skip_interval_secs: default_skip_interval(),
            speed_presets: default_speed_presets(),
        }
    }
}

impl PlaybackConfig {
    pub fn hide_controls_delay(&self) -> Duration {
        Duration::from_secs_f64(self.hide_controls_delay_secs.max(0.0))
    }

    pub fn rate_apply_delay(&self) -> Duration {
        Duration::from_millis(self.rate_apply_delay_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            debug!("Loading config from {:?}", config_path);
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
            info!("Config loaded successfully");
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", config_path);
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("playhead").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_fills_in_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.playback.hide_controls_delay_secs, 2.5);
        assert_eq!(config.playback.rate_apply_delay_ms, 100);
        assert_eq!(config.playback.skip_interval_secs, 10.0);
        assert_eq!(config.playback.speed_presets, vec![0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn delay_accessors_convert_units() {
        let playback = PlaybackConfig::default();
        assert_eq!(playback.hide_controls_delay(), Duration::from_millis(2500));
        assert_eq!(playback.rate_apply_delay(), Duration::from_millis(100));
    }

    #[test]
    fn negative_hide_delay_clamps_to_zero() {
        let playback = PlaybackConfig {
            hide_controls_delay_secs: -1.0,
            ..Default::default()
        };
        assert_eq!(playback.hide_controls_delay(), Duration::ZERO);
    }

    #[test]
    fn round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.playback.hide_controls_delay_secs = 2.0;
        config.playback.speed_presets = vec![1.0, 2.0];

        fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();
        let reread: Config = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reread, config);
    }
}
