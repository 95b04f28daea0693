//! Error types for playback management

use crate::device::DeviceError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Output device could not load the audio source
    #[error("Failed to load {uri}: {source}")]
    DeviceLoad {
        /// Locator that failed to load
        uri: String,
        #[source]
        source: DeviceError,
    },

    /// Output device reported a failure during playback
    #[error("Device runtime error: {0}")]
    DeviceRuntime(String),

    /// A transport command (play/pause/seek/stop/release) failed on the device
    #[error("Device {command} failed: {source}")]
    DeviceCommand {
        /// Command that failed
        command: &'static str,
        #[source]
        source: DeviceError,
    },

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for PlaybackError {
    fn from(err: config::ConfigError) -> Self {
        PlaybackError::Config(err.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
