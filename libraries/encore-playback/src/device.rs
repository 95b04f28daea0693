//! Platform-agnostic audio output device trait
//!
//! Abstracts the platform player (native media session on mobile, a decoder
//! plus output stream on desktop) behind handle-based async commands.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque handle to an audio resource loaded on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle(u64);

impl DeviceHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Device errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// Source could not be reached (network, missing file)
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Source was reached but cannot be decoded
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Handle was already released or never existed
    #[error("Unknown handle {0}")]
    UnknownHandle(DeviceHandle),

    /// Any other platform failure
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Audio session behaviour requested before the first load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Keep the microphone route available while playing
    pub allow_recording: bool,

    /// Play even when the hardware silent switch is on
    pub play_in_silent_mode: bool,

    /// Keep playing when the app is backgrounded
    pub stay_active_in_background: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            allow_recording: false,
            play_in_silent_mode: true,
            stay_active_in_background: true,
        }
    }
}

/// Status update pushed by the device for a loaded handle
///
/// Devices send these through the channel handed to
/// [`PlayerEngine::spawn_status_listener`](crate::PlayerEngine::spawn_status_listener).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStatus {
    /// Handle this update belongs to
    pub handle: DeviceHandle,

    /// Current position in milliseconds
    pub position_millis: u64,

    /// Authoritative duration in milliseconds (0 while unknown)
    pub duration_millis: u64,

    /// Whether the device is currently rendering audio
    pub is_playing: bool,

    /// Set once when the handle reaches end of track
    pub finished: bool,

    /// Out-of-band failure (decode error, lost route)
    pub error: Option<String>,
}

impl DeviceStatus {
    /// Progress update with no end-of-track or error flag
    pub fn progress(
        handle: DeviceHandle,
        position_millis: u64,
        duration_millis: u64,
        is_playing: bool,
    ) -> Self {
        Self {
            handle,
            position_millis,
            duration_millis,
            is_playing,
            finished: false,
            error: None,
        }
    }

    /// End-of-track update
    pub fn finished(handle: DeviceHandle, duration_millis: u64) -> Self {
        Self {
            handle,
            position_millis: duration_millis,
            duration_millis,
            is_playing: false,
            finished: true,
            error: None,
        }
    }

    /// Runtime failure update
    pub fn failed(handle: DeviceHandle, message: impl Into<String>) -> Self {
        Self {
            handle,
            position_millis: 0,
            duration_millis: 0,
            is_playing: false,
            finished: false,
            error: Some(message.into()),
        }
    }
}

/// Platform audio output
///
/// Implementors own the actual decoder and output route. The engine is the
/// only caller and never issues commands for a handle after releasing it.
#[async_trait]
pub trait AudioDevice: Send + Sync {
    /// Apply audio session options (route, background behaviour)
    async fn configure_session(&self, options: &SessionOptions) -> Result<(), DeviceError>;

    /// Load a source and optionally start playing it immediately
    async fn load(&self, uri: &str, autoplay: bool) -> Result<DeviceHandle, DeviceError>;

    /// Start or resume playback
    async fn play(&self, handle: DeviceHandle) -> Result<(), DeviceError>;

    /// Pause playback, keeping the position
    async fn pause(&self, handle: DeviceHandle) -> Result<(), DeviceError>;

    /// Move the playhead; the device clamps out-of-range positions
    async fn seek(&self, handle: DeviceHandle, position_millis: u64) -> Result<(), DeviceError>;

    /// Stop playback and rewind
    async fn stop(&self, handle: DeviceHandle) -> Result<(), DeviceError>;

    /// Free the resource behind the handle
    async fn release(&self, handle: DeviceHandle) -> Result<(), DeviceError>;
}
