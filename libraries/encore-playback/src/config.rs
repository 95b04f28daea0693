//! Player configuration

use crate::device::SessionOptions;
use crate::error::{PlaybackError, Result};
use crate::navigation::ShufflePolicy;
use encore_core::RepeatMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "encore-player.toml";

/// Environment prefix for overrides (`ENCORE_PLAYER_RESTART_THRESHOLD_MS=5000`)
pub const ENV_PREFIX: &str = "ENCORE_PLAYER";

/// Configuration for the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Past this position `previous` restarts the current track (default: 3000)
    pub restart_threshold_ms: u64,

    /// Initial shuffle flag (default: false)
    pub shuffle: bool,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,

    /// How shuffle picks the next entry (default: Uniform)
    pub shuffle_policy: ShufflePolicy,

    /// Buffered events per subscriber before lagging ones drop (default: 64)
    pub event_capacity: usize,

    /// Audio session options applied before the first load
    pub session: SessionOptions,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            restart_threshold_ms: 3000,
            shuffle: false,
            repeat: RepeatMode::Off,
            shuffle_policy: ShufflePolicy::Uniform,
            event_capacity: 64,
            session: SessionOptions::default(),
        }
    }
}

impl PlayerConfig {
    /// Load configuration from `encore-player.toml` (if present) and environment
    pub fn load() -> Result<Self> {
        Self::load_from(PathBuf::from(CONFIG_FILE))
    }

    /// Load configuration from a specific file (if present) and environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        let path = path.as_ref();
        if path.exists() {
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(PlaybackError::Config(
                "event_capacity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.restart_threshold_ms, 3000);
        assert!(!config.shuffle);
        assert_eq!(config.repeat, RepeatMode::Off);
        assert_eq!(config.shuffle_policy, ShufflePolicy::Uniform);
        assert!(config.session.play_in_silent_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_partial_file_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "restart_threshold_ms = 5000\nrepeat = \"all\"\nshuffle_policy = \"avoid_current\"\n\n[session]\nstay_active_in_background = false"
        )
        .unwrap();

        let config = PlayerConfig::load_from(file.path()).unwrap();

        assert_eq!(config.restart_threshold_ms, 5000);
        assert_eq!(config.repeat, RepeatMode::All);
        assert_eq!(config.shuffle_policy, ShufflePolicy::AvoidCurrent);
        assert!(!config.session.stay_active_in_background);
        assert!(config.session.play_in_silent_mode);
        assert_eq!(config.event_capacity, 64);
    }

    #[test]
    fn legacy_none_repeat_reads_as_off() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "shuffle = true\nrepeat = \"none\"").unwrap();

        let config = PlayerConfig::load_from(file.path()).unwrap();

        assert!(config.shuffle);
        assert_eq!(config.repeat, RepeatMode::Off);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PlayerConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, PlayerConfig::default());
    }

    #[test]
    fn zero_event_capacity_is_rejected() {
        let config = PlayerConfig {
            event_capacity: 0,
            ..PlayerConfig::default()
        };
        assert!(matches!(config.validate(), Err(PlaybackError::Config(_))));
    }
}
