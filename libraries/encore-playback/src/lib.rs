//! Encore - Playback Engine
//!
//! Platform-agnostic playback management for the Encore clients.
//!
//! This crate provides:
//! - A single play queue with next/previous navigation
//! - Shuffle (uniform, optionally avoiding the current track)
//! - Repeat modes (Off, All, One)
//! - Play/pause/seek transport over an async output device
//! - Auto-advance on end of track
//! - Observable state (watch channel) and discrete events (broadcast)
//!
//! # Architecture
//!
//! `encore-playback` never touches audio itself. The platform player is
//! provided through the [`AudioDevice`] trait, and device notifications
//! arrive as [`DeviceStatus`] messages on a channel.
//!
//! The engine is an explicit object, created once per session and passed to
//! whatever needs it. Overlapping commands are safe: every device load is
//! tagged with a generation and results for superseded requests are dropped.
//!
//! # Example: Platform Integration
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use encore_core::Track;
//! use encore_playback::{
//!     AudioDevice, DeviceError, DeviceHandle, PlayerConfig, PlayerEngine, SessionOptions,
//! };
//! use std::sync::Arc;
//!
//! struct NativePlayer;
//!
//! #[async_trait]
//! impl AudioDevice for NativePlayer {
//!     async fn configure_session(&self, _: &SessionOptions) -> Result<(), DeviceError> { Ok(()) }
//!     async fn load(&self, _uri: &str, _autoplay: bool) -> Result<DeviceHandle, DeviceError> {
//!         Ok(DeviceHandle::new(1))
//!     }
//!     async fn play(&self, _: DeviceHandle) -> Result<(), DeviceError> { Ok(()) }
//!     async fn pause(&self, _: DeviceHandle) -> Result<(), DeviceError> { Ok(()) }
//!     async fn seek(&self, _: DeviceHandle, _: u64) -> Result<(), DeviceError> { Ok(()) }
//!     async fn stop(&self, _: DeviceHandle) -> Result<(), DeviceError> { Ok(()) }
//!     async fn release(&self, _: DeviceHandle) -> Result<(), DeviceError> { Ok(()) }
//! }
//!
//! # async fn run() -> encore_playback::Result<()> {
//! let (status_tx, status_rx) = tokio::sync::mpsc::channel(32);
//! # drop(status_tx);
//! let engine = PlayerEngine::new(Arc::new(NativePlayer), PlayerConfig::load()?);
//! engine.spawn_status_listener(status_rx);
//!
//! let album = vec![
//!     Track::new("s1", "Opening", "https://media.example.com/s1.mp3"),
//!     Track::new("s2", "Second", "https://media.example.com/s2.mp3"),
//! ];
//! engine.play_track(album[0].clone(), album.clone()).await?;
//! engine.next().await?;
//! assert_eq!(engine.snapshot().current_track.unwrap().title, "Second");
//! # Ok(())
//! # }
//! ```

mod config;
mod device;
mod engine;
mod error;
mod events;
pub mod navigation;
mod types;

// Public exports
pub use config::{PlayerConfig, CONFIG_FILE, ENV_PREFIX};
pub use device::{AudioDevice, DeviceError, DeviceHandle, DeviceStatus, SessionOptions};
pub use engine::PlayerEngine;
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use navigation::{ShufflePolicy, Step};
pub use types::{PlaybackSnapshot, PlaybackStatus};
