//! Playback Events
//!
//! Event-based communication for UI synchronization. Events are emitted at
//! key points:
//! - State changes (loading/playing/paused/idle)
//! - Track changes (as soon as a new track is requested)
//! - Queue and mode changes
//! - Position updates from the device
//! - Device failures

use crate::types::PlaybackStatus;
use encore_core::{RepeatMode, TrackId};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Transport state changed
    StateChanged {
        /// The new state
        status: PlaybackStatus,
    },

    /// Current track changed
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Queue replaced
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Shuffle or repeat toggled
    ModesChanged {
        /// Shuffle flag after the change
        shuffle_enabled: bool,
        /// Repeat mode after the change
        repeat_mode: RepeatMode,
    },

    /// Position update reported by the device
    PositionChanged {
        /// Current playback position
        position_millis: u64,
        /// Total track duration
        duration_millis: u64,
    },

    /// Track played through to the end
    TrackFinished {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// Device failure (load or runtime)
    Error {
        /// Error message
        message: String,
    },
}
