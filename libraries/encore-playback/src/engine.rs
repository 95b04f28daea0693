//! Playback engine - core orchestration
//!
//! Owns the current track, the play queue and the single live device handle,
//! and turns transport commands and device notifications into state changes.

use crate::{
    config::PlayerConfig,
    device::{AudioDevice, DeviceHandle, DeviceStatus},
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    navigation::{self, Step},
    types::{PlaybackSnapshot, PlaybackStatus},
};
use encore_core::{RepeatMode, Track};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Mutable engine state, guarded by a mutex that is never held across `.await`
struct EngineState {
    snapshot: PlaybackSnapshot,

    /// The one live device handle
    handle: Option<DeviceHandle>,

    /// Bumped by every command that supersedes in-flight device work
    generation: u64,
}

impl EngineState {
    fn set_status(&mut self, status: PlaybackStatus, events: &mut Vec<PlaybackEvent>) {
        if self.snapshot.status != status {
            self.snapshot.status = status;
            events.push(PlaybackEvent::StateChanged { status });
        }
    }

    fn live_handle(&self) -> Option<(DeviceHandle, u64)> {
        self.handle.map(|handle| (handle, self.generation))
    }
}

struct Inner {
    device: Arc<dyn AudioDevice>,
    config: PlayerConfig,
    state: Mutex<EngineState>,
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
    events_tx: broadcast::Sender<PlaybackEvent>,
    session_configured: AtomicBool,
}

/// Central playback authority
///
/// Cheap to clone; every clone drives the same player. Create one per
/// session and hand it to the UI layers that need it.
///
/// Commands take `&self` and may overlap. Visible state follows the most
/// recent command: a load that resolves after being superseded is released
/// and never touches state.
#[derive(Clone)]
pub struct PlayerEngine {
    inner: Arc<Inner>,
}

impl PlayerEngine {
    /// Create an idle engine driving `device`
    pub fn new(device: Arc<dyn AudioDevice>, config: PlayerConfig) -> Self {
        let snapshot = PlaybackSnapshot {
            shuffle_enabled: config.shuffle,
            repeat_mode: config.repeat,
            ..PlaybackSnapshot::default()
        };
        let (snapshot_tx, _) = watch::channel(snapshot.clone());
        let (events_tx, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            inner: Arc::new(Inner {
                device,
                config,
                state: Mutex::new(EngineState {
                    snapshot,
                    handle: None,
                    generation: 0,
                }),
                snapshot_tx,
                events_tx,
                session_configured: AtomicBool::new(false),
            }),
        }
    }

    // ===== Observation =====

    /// Current player state
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.lock().snapshot.clone()
    }

    /// Watch the player state; the receiver always holds the latest snapshot
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Stream of discrete playback events
    pub fn events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.inner.events_tx.subscribe()
    }

    /// Queue entries other than the current track
    pub fn upcoming(&self) -> Vec<Track> {
        self.snapshot().upcoming().into_iter().cloned().collect()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.inner.config
    }

    // ===== Playback Control =====

    /// Play `track`, making `queue` the play queue
    ///
    /// An empty `queue` queues the track on its own. State switches to the
    /// new track before the device is touched; the previous handle is
    /// released first. Returns the load failure to the caller, but the
    /// failed track stays current so surfaces can show what failed.
    ///
    /// When `track` appears more than once in `queue`, playback continues
    /// from its first occurrence; use [`play_index`](Self::play_index) to
    /// pick a specific entry.
    pub async fn play_track(&self, track: Track, queue: Vec<Track>) -> Result<()> {
        self.play_entry(track, queue, None).await
    }

    /// Play the queue entry at `index`
    pub async fn play_index(&self, index: usize) -> Result<()> {
        let queue = self.snapshot().queue;
        let track = queue.get(index).cloned().ok_or_else(|| {
            PlaybackError::InvalidOperation(format!(
                "queue index {} out of range (len {})",
                index,
                queue.len()
            ))
        })?;
        self.play_entry(track, queue, Some(index)).await
    }

    /// Load `track` as the entry at `index` of `queue`
    async fn play_entry(
        &self,
        track: Track,
        queue: Vec<Track>,
        index: Option<usize>,
    ) -> Result<()> {
        let (generation, old_handle) = self.update(|state, events| {
            state.generation += 1;
            let old_handle = state.handle.take();
            let previous_track_id = state
                .snapshot
                .current_track
                .as_ref()
                .map(|current| current.id.clone());

            let snapshot = &mut state.snapshot;
            snapshot.queue = if queue.is_empty() {
                vec![track.clone()]
            } else {
                queue
            };
            snapshot.queue_index = resolve_index(&snapshot.queue, &track, index);
            snapshot.current_track = Some(track.clone());
            snapshot.is_playing = false;
            snapshot.position_millis = 0;
            snapshot.duration_millis = track.nominal_duration_millis();

            events.push(PlaybackEvent::TrackChanged {
                track_id: track.id.clone(),
                previous_track_id,
            });
            events.push(PlaybackEvent::QueueChanged {
                length: state.snapshot.queue.len(),
            });
            state.set_status(PlaybackStatus::Loading, events);

            (state.generation, old_handle)
        });

        info!(track_id = %track.id, ?index, generation, "Loading track");

        if let Some(handle) = old_handle {
            self.release_handle(handle).await;
        }
        self.ensure_session().await;

        match self.inner.device.load(&track.audio_url, true).await {
            Ok(handle) => {
                let stale = self.update(|state, events| {
                    if state.generation != generation {
                        return true;
                    }
                    state.handle = Some(handle);
                    state.snapshot.is_playing = true;
                    state.snapshot.last_error = None;
                    state.set_status(PlaybackStatus::Playing, events);
                    false
                });

                if stale {
                    debug!(track_id = %track.id, %handle, generation, "Discarding superseded load");
                    self.release_handle(handle).await;
                } else {
                    debug!(track_id = %track.id, %handle, "Track playing");
                }
                Ok(())
            }
            Err(source) => {
                let err = PlaybackError::DeviceLoad {
                    uri: track.audio_url.clone(),
                    source,
                };
                let current = self.update(|state, events| {
                    if state.generation != generation {
                        return false;
                    }
                    state.snapshot.is_playing = false;
                    state.snapshot.last_error = Some(err.to_string());
                    events.push(PlaybackEvent::Error {
                        message: err.to_string(),
                    });
                    state.set_status(PlaybackStatus::Idle, events);
                    true
                });

                if current {
                    error!(track_id = %track.id, "Error playing track: {}", err);
                } else {
                    debug!(track_id = %track.id, generation, "Superseded load failed: {}", err);
                }
                Err(err)
            }
        }
    }

    /// Pause playback; no-op without a loaded track
    pub async fn pause(&self) -> Result<()> {
        let Some((handle, generation)) = self.lock().live_handle() else {
            return Ok(());
        };

        self.inner
            .device
            .pause(handle)
            .await
            .map_err(|source| PlaybackError::DeviceCommand {
                command: "pause",
                source,
            })?;

        self.update(|state, events| {
            if state.generation == generation {
                state.snapshot.is_playing = false;
                state.set_status(PlaybackStatus::Paused, events);
            }
        });
        Ok(())
    }

    /// Resume playback; no-op without a loaded track
    pub async fn resume(&self) -> Result<()> {
        let Some((handle, generation)) = self.lock().live_handle() else {
            return Ok(());
        };

        self.inner
            .device
            .play(handle)
            .await
            .map_err(|source| PlaybackError::DeviceCommand {
                command: "play",
                source,
            })?;

        self.update(|state, events| {
            if state.generation == generation {
                state.snapshot.is_playing = true;
                state.set_status(PlaybackStatus::Playing, events);
            }
        });
        Ok(())
    }

    /// Pause when playing, resume otherwise
    pub async fn toggle_play_pause(&self) -> Result<()> {
        let is_playing = self.lock().snapshot.is_playing;
        if is_playing {
            self.pause().await
        } else {
            self.resume().await
        }
    }

    /// Seek within the current track; no-op without a loaded track
    ///
    /// The position is published before the device confirms it.
    pub async fn seek(&self, position_millis: u64) -> Result<()> {
        let handle = self.update(|state, events| {
            let handle = state.handle?;
            let snapshot = &mut state.snapshot;
            snapshot.position_millis = clamp_position(position_millis, snapshot.duration_millis);
            events.push(PlaybackEvent::PositionChanged {
                position_millis: snapshot.position_millis,
                duration_millis: snapshot.duration_millis,
            });
            Some(handle)
        });
        let Some(handle) = handle else {
            return Ok(());
        };

        self.inner
            .device
            .seek(handle, position_millis)
            .await
            .map_err(|source| PlaybackError::DeviceCommand {
                command: "seek",
                source,
            })
    }

    /// Skip to the next track
    ///
    /// Load failures are logged and leave playback stopped on the failing
    /// track rather than being returned.
    pub async fn next(&self) -> Result<()> {
        self.advance().await
    }

    /// Go to the previous track, or restart the current one
    ///
    /// Past the restart threshold (3 s by default) the current track
    /// restarts; at the head of the queue it restarts as well.
    pub async fn previous(&self) -> Result<()> {
        let threshold = self.inner.config.restart_threshold_ms;
        let policy = self.inner.config.shuffle_policy;

        let plan = {
            let state = self.lock();
            let snapshot = &state.snapshot;
            if snapshot.position_millis > threshold {
                None
            } else {
                let current = snapshot.current_index();
                let step = navigation::previous_step(
                    snapshot.queue.len(),
                    current,
                    snapshot.shuffle_enabled,
                    |len| navigation::pick_shuffled(len, current, policy, &mut rand::thread_rng()),
                );
                Some((step, snapshot.current_track.clone(), current, snapshot.queue.clone()))
            }
        };

        match plan {
            None => self.seek(0).await,
            Some((step, track, index, queue)) => self.apply_step(step, track, index, queue).await,
        }
    }

    /// Release the device handle and return to an empty idle player
    ///
    /// Shuffle and repeat settings survive.
    pub async fn cleanup(&self) {
        let handle = self.update(|state, events| {
            state.generation += 1;
            let handle = state.handle.take();
            let snapshot = &mut state.snapshot;
            snapshot.current_track = None;
            snapshot.queue.clear();
            snapshot.queue_index = None;
            snapshot.is_playing = false;
            snapshot.position_millis = 0;
            snapshot.duration_millis = 0;
            snapshot.last_error = None;
            events.push(PlaybackEvent::QueueChanged { length: 0 });
            state.set_status(PlaybackStatus::Idle, events);
            handle
        });

        if let Some(handle) = handle {
            self.release_handle(handle).await;
        }
        info!("Player cleaned up");
    }

    // ===== Queue & Modes =====

    /// Replace the queue without touching transport
    ///
    /// The current track keeps its position when the new queue holds it at
    /// the same index, otherwise it moves to its first occurrence.
    pub fn set_queue(&self, tracks: Vec<Track>) {
        self.update(|state, events| {
            let snapshot = &mut state.snapshot;
            let hint = snapshot.queue_index;
            snapshot.queue_index = snapshot
                .current_track
                .as_ref()
                .and_then(|track| resolve_index(&tracks, track, hint));
            snapshot.queue = tracks;
            events.push(PlaybackEvent::QueueChanged {
                length: state.snapshot.queue.len(),
            });
        });
    }

    /// Flip shuffle, returning the new value
    pub fn toggle_shuffle(&self) -> bool {
        self.update(|state, events| {
            state.snapshot.shuffle_enabled = !state.snapshot.shuffle_enabled;
            events.push(modes_changed(&state.snapshot));
            state.snapshot.shuffle_enabled
        })
    }

    /// Advance repeat `off -> all -> one -> off`, returning the new mode
    pub fn cycle_repeat_mode(&self) -> RepeatMode {
        let mode = self.update(|state, events| {
            state.snapshot.repeat_mode = state.snapshot.repeat_mode.cycle();
            events.push(modes_changed(&state.snapshot));
            state.snapshot.repeat_mode
        });
        debug!(repeat = %mode, "Repeat mode changed");
        mode
    }

    // ===== Device Notifications =====

    /// Apply a status update from the device
    ///
    /// Updates for handles other than the live one are dropped. Runtime
    /// errors are logged and recorded without skipping; end of track
    /// advances exactly like [`next`](Self::next).
    pub async fn handle_status(&self, status: DeviceStatus) {
        let finished = self.update(|state, events| {
            if state.handle != Some(status.handle) {
                debug!(handle = %status.handle, "Ignoring status for inactive handle");
                return false;
            }

            if let Some(message) = &status.error {
                warn!(handle = %status.handle, "Device runtime error: {}", message);
                let err = PlaybackError::DeviceRuntime(message.clone());
                state.snapshot.last_error = Some(err.to_string());
                events.push(PlaybackEvent::Error {
                    message: err.to_string(),
                });
                return false;
            }

            let snapshot = &mut state.snapshot;
            if status.duration_millis > 0 {
                snapshot.duration_millis = status.duration_millis;
            }
            snapshot.position_millis =
                clamp_position(status.position_millis, snapshot.duration_millis);
            snapshot.is_playing = status.is_playing;
            events.push(PlaybackEvent::PositionChanged {
                position_millis: snapshot.position_millis,
                duration_millis: snapshot.duration_millis,
            });
            let next_status = if status.is_playing {
                PlaybackStatus::Playing
            } else {
                PlaybackStatus::Paused
            };
            state.set_status(next_status, events);

            if status.finished {
                if let Some(track) = &state.snapshot.current_track {
                    events.push(PlaybackEvent::TrackFinished {
                        track_id: track.id.clone(),
                    });
                }
            }
            status.finished
        });

        if finished {
            if let Err(err) = self.advance().await {
                warn!("Auto-advance failed: {}", err);
            }
        }
    }

    /// Drain device status updates until the sender side closes
    pub fn spawn_status_listener(&self, mut rx: mpsc::Receiver<DeviceStatus>) -> JoinHandle<()> {
        let engine = self.clone();
        tokio::spawn(async move {
            while let Some(status) = rx.recv().await {
                engine.handle_status(status).await;
            }
            debug!("Device status channel closed");
        })
    }

    // ===== Internals =====

    async fn advance(&self) -> Result<()> {
        let policy = self.inner.config.shuffle_policy;

        let (step, track, index, queue) = {
            let state = self.lock();
            let snapshot = &state.snapshot;
            let current = snapshot.current_index();
            let step = navigation::next_step(
                snapshot.queue.len(),
                current,
                snapshot.shuffle_enabled,
                snapshot.repeat_mode,
                |len| navigation::pick_shuffled(len, current, policy, &mut rand::thread_rng()),
            );
            (step, snapshot.current_track.clone(), current, snapshot.queue.clone())
        };

        self.apply_step(step, track, index, queue).await
    }

    /// `track` and `index` describe the current entry the step was resolved from
    async fn apply_step(
        &self,
        step: Step,
        track: Option<Track>,
        index: Option<usize>,
        queue: Vec<Track>,
    ) -> Result<()> {
        debug!(?step, "Navigating");
        match step {
            Step::Replay => {
                if let Some(track) = track {
                    self.play_quietly(track, queue, index).await;
                }
                Ok(())
            }
            Step::Play(next) => {
                if let Some(track) = queue.get(next).cloned() {
                    self.play_quietly(track, queue, Some(next)).await;
                }
                Ok(())
            }
            Step::Restart => self.seek(0).await,
            Step::Exhausted => {
                self.stop_at_end().await;
                Ok(())
            }
        }
    }

    /// Load errors are already logged and recorded by `play_entry`
    async fn play_quietly(&self, track: Track, queue: Vec<Track>, index: Option<usize>) {
        if let Err(err) = self.play_entry(track, queue, index).await {
            debug!("Playback stopped on failing track: {}", err);
        }
    }

    /// End of queue: keep track and queue for display, rewind and stop
    async fn stop_at_end(&self) {
        let handle = self.update(|state, events| {
            state.generation += 1;
            state.snapshot.is_playing = false;
            state.snapshot.position_millis = 0;
            let status = if state.handle.is_some() {
                PlaybackStatus::Paused
            } else {
                PlaybackStatus::Idle
            };
            state.set_status(status, events);
            state.handle
        });

        info!("Reached end of queue");

        if let Some(handle) = handle {
            if let Err(err) = self.inner.device.stop(handle).await {
                warn!(%handle, "Failed to stop device: {}", err);
            }
        }
    }

    async fn release_handle(&self, handle: DeviceHandle) {
        if let Err(err) = self.inner.device.release(handle).await {
            warn!(%handle, "Failed to release device handle: {}", err);
        }
    }

    async fn ensure_session(&self) {
        if self.inner.session_configured.load(Ordering::Acquire) {
            return;
        }
        match self
            .inner
            .device
            .configure_session(&self.inner.config.session)
            .await
        {
            Ok(()) => self.inner.session_configured.store(true, Ordering::Release),
            Err(err) => warn!("Failed to configure audio session: {}", err),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate state, then publish the snapshot and any queued events
    fn update<R>(&self, f: impl FnOnce(&mut EngineState, &mut Vec<PlaybackEvent>) -> R) -> R {
        let mut events = Vec::new();
        let mut state = self.lock();
        let result = f(&mut state, &mut events);

        self.inner.snapshot_tx.send_replace(state.snapshot.clone());
        for event in events {
            // No subscribers is fine
            let _ = self.inner.events_tx.send(event);
        }
        result
    }
}

/// Queue position for `track`: `hint` when that entry is `track`, else its first occurrence
fn resolve_index(queue: &[Track], track: &Track, hint: Option<usize>) -> Option<usize> {
    hint.filter(|index| queue.get(*index).is_some_and(|entry| entry.id == track.id))
        .or_else(|| queue.iter().position(|entry| entry.id == track.id))
}

fn clamp_position(position_millis: u64, duration_millis: u64) -> u64 {
    if duration_millis > 0 {
        position_millis.min(duration_millis)
    } else {
        position_millis
    }
}

fn modes_changed(snapshot: &PlaybackSnapshot) -> PlaybackEvent {
    PlaybackEvent::ModesChanged {
        shuffle_enabled: snapshot.shuffle_enabled,
        repeat_mode: snapshot.repeat_mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_position_respects_known_duration() {
        assert_eq!(clamp_position(5_000, 3_000), 3_000);
        assert_eq!(clamp_position(2_000, 3_000), 2_000);
    }

    #[test]
    fn resolve_index_prefers_matching_hint() {
        let a = Track::new("a", "A", "https://cdn/a.mp3");
        let b = Track::new("b", "B", "https://cdn/b.mp3");
        let queue = vec![a.clone(), b.clone(), a.clone()];

        assert_eq!(resolve_index(&queue, &a, Some(2)), Some(2));
        assert_eq!(resolve_index(&queue, &a, Some(1)), Some(0));
        assert_eq!(resolve_index(&queue, &a, None), Some(0));
        assert_eq!(resolve_index(&queue[1..2], &a, Some(0)), None);
    }

    #[test]
    fn clamp_position_passes_through_unknown_duration() {
        assert_eq!(clamp_position(5_000, 0), 5_000);
    }

    #[test]
    fn modes_event_mirrors_snapshot() {
        let snapshot = PlaybackSnapshot {
            shuffle_enabled: true,
            repeat_mode: RepeatMode::One,
            ..PlaybackSnapshot::default()
        };
        assert_eq!(
            modes_changed(&snapshot),
            PlaybackEvent::ModesChanged {
                shuffle_enabled: true,
                repeat_mode: RepeatMode::One,
            }
        );
    }
}
