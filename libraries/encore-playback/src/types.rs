//! Core types for playback management

use encore_core::{RepeatMode, Track};
use serde::{Deserialize, Serialize};

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// No live handle
    #[default]
    Idle,

    /// Handle requested, device has not confirmed playback yet
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track (or stopped at the end of the queue)
    Paused,
}

/// Observable player state
///
/// Everything a UI surface needs to render the player. Published through a
/// watch channel on every change.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    pub current_track: Option<Track>,
    pub queue: Vec<Track>,

    /// Position of the current track in `queue`; tells repeated entries apart
    pub queue_index: Option<usize>,

    pub is_playing: bool,
    pub position_millis: u64,
    pub duration_millis: u64,
    pub shuffle_enabled: bool,
    pub repeat_mode: RepeatMode,

    /// Last load or runtime failure, cleared by the next successful load
    pub last_error: Option<String>,
}

impl PlaybackSnapshot {
    /// Index of the current track within the queue
    pub fn current_index(&self) -> Option<usize> {
        self.queue_index.filter(|index| *index < self.queue.len())
    }

    /// Queue entries other than the current one, in queue order
    pub fn upcoming(&self) -> Vec<&Track> {
        let current = self.current_index();
        self.queue
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != current)
            .map(|(_, track)| track)
            .collect()
    }

    /// Playback progress in `[0.0, 1.0]`, 0 while the duration is unknown
    pub fn progress(&self) -> f64 {
        if self.duration_millis == 0 {
            return 0.0;
        }
        (self.position_millis as f64 / self.duration_millis as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track::new(id, format!("Track {}", id), format!("https://cdn/{}.mp3", id))
    }

    #[test]
    fn current_index_follows_stored_position() {
        let snapshot = PlaybackSnapshot {
            current_track: Some(track("a")),
            queue: vec![track("a"), track("b"), track("a")],
            queue_index: Some(2),
            ..PlaybackSnapshot::default()
        };
        assert_eq!(snapshot.current_index(), Some(2));
    }

    #[test]
    fn current_index_ignores_stale_position() {
        let snapshot = PlaybackSnapshot {
            queue: vec![track("a")],
            queue_index: Some(3),
            ..PlaybackSnapshot::default()
        };
        assert_eq!(snapshot.current_index(), None);
    }

    #[test]
    fn upcoming_skips_only_the_current_entry() {
        let snapshot = PlaybackSnapshot {
            current_track: Some(track("a")),
            queue: vec![track("a"), track("b"), track("a")],
            queue_index: Some(0),
            ..PlaybackSnapshot::default()
        };
        let ids: Vec<&str> = snapshot.upcoming().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn progress_is_zero_without_duration() {
        let snapshot = PlaybackSnapshot {
            position_millis: 1200,
            ..PlaybackSnapshot::default()
        };
        assert_eq!(snapshot.progress(), 0.0);
    }
}
