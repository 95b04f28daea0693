//! Encore Core
//!
//! Platform-agnostic domain types shared by the Encore clients.
//!
//! The core crate defines:
//! - **Catalog Types**: `Track`, `TrackId`, `ArtistRef`
//! - **Playback Modes**: `RepeatMode`
//! - **Display Helpers**: `format_millis`
//!
//! # Example
//!
//! ```rust
//! use encore_core::{format_millis, ArtistRef, Track};
//!
//! let track = Track::new("t1", "Intro", "https://cdn.example.com/t1.mp3")
//!     .with_artist(ArtistRef::named("a1", "The Band"))
//!     .with_duration_secs(201.0);
//!
//! assert_eq!(track.artist_name(), "The Band");
//! assert_eq!(track.nominal_duration_millis(), 201_000);
//! assert_eq!(format_millis(track.nominal_duration_millis()), "3:21");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod format;
pub mod types;

pub use format::format_millis;
pub use types::{ArtistRef, RepeatMode, Track, TrackId};
