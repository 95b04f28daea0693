//! Shared test fixtures: a scripted in-memory audio device

#![allow(dead_code)]

use async_trait::async_trait;
use encore_core::{ArtistRef, Track};
use encore_playback::{
    AudioDevice, DeviceError, DeviceHandle, PlayerConfig, PlayerEngine, SessionOptions,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Device command as observed by the scripted device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ConfigureSession,
    Load(String),
    Play(DeviceHandle),
    Pause(DeviceHandle),
    Seek(DeviceHandle, u64),
    Stop(DeviceHandle),
    Release(DeviceHandle),
}

#[derive(Default)]
struct Script {
    calls: Vec<Call>,
    live: HashSet<DeviceHandle>,
    loaded: HashMap<DeviceHandle, String>,
    failing_uris: HashSet<String>,
    held_uris: HashMap<String, Arc<Notify>>,
    failing_commands: HashSet<&'static str>,
}

/// In-memory device that records every call
///
/// Loads succeed immediately unless the uri is marked failing or held.
#[derive(Default)]
pub struct ScriptedDevice {
    script: Mutex<Script>,
    next_handle: AtomicU64,
}

/// Pending load that completes once released
pub struct LoadGate {
    notify: Arc<Notify>,
}

impl LoadGate {
    pub fn release(&self) {
        self.notify.notify_one();
    }
}

impl ScriptedDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_uri(&self, uri: &str) {
        self.script.lock().unwrap().failing_uris.insert(uri.to_string());
    }

    pub fn fail_command(&self, command: &'static str) {
        self.script.lock().unwrap().failing_commands.insert(command);
    }

    /// Make the next load of `uri` wait until the gate is released
    pub fn hold(&self, uri: &str) -> LoadGate {
        let notify = Arc::new(Notify::new());
        self.script
            .lock()
            .unwrap()
            .held_uris
            .insert(uri.to_string(), notify.clone());
        LoadGate { notify }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn loads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Load(uri) => Some(uri),
                _ => None,
            })
            .collect()
    }

    pub fn live_handles(&self) -> Vec<DeviceHandle> {
        self.script.lock().unwrap().live.iter().copied().collect()
    }

    /// Handle currently holding `uri`, if loaded and not released
    pub fn handle_for(&self, uri: &str) -> Option<DeviceHandle> {
        let script = self.script.lock().unwrap();
        script
            .loaded
            .iter()
            .find(|(handle, loaded)| loaded.as_str() == uri && script.live.contains(*handle))
            .map(|(handle, _)| *handle)
    }

    fn record(&self, call: Call) {
        self.script.lock().unwrap().calls.push(call);
    }

    fn command(&self, name: &'static str, call: Call) -> Result<(), DeviceError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(call);
        if script.failing_commands.contains(name) {
            return Err(DeviceError::Backend(format!("{} rejected", name)));
        }
        Ok(())
    }
}

#[async_trait]
impl AudioDevice for ScriptedDevice {
    async fn configure_session(&self, _options: &SessionOptions) -> Result<(), DeviceError> {
        self.record(Call::ConfigureSession);
        Ok(())
    }

    async fn load(&self, uri: &str, _autoplay: bool) -> Result<DeviceHandle, DeviceError> {
        let held = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(Call::Load(uri.to_string()));
            script.held_uris.remove(uri)
        };
        if let Some(notify) = held {
            notify.notified().await;
        }

        let mut script = self.script.lock().unwrap();
        if script.failing_uris.contains(uri) {
            return Err(DeviceError::SourceUnavailable(uri.to_string()));
        }
        let handle = DeviceHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1);
        script.live.insert(handle);
        script.loaded.insert(handle, uri.to_string());
        Ok(handle)
    }

    async fn play(&self, handle: DeviceHandle) -> Result<(), DeviceError> {
        self.command("play", Call::Play(handle))
    }

    async fn pause(&self, handle: DeviceHandle) -> Result<(), DeviceError> {
        self.command("pause", Call::Pause(handle))
    }

    async fn seek(&self, handle: DeviceHandle, position_millis: u64) -> Result<(), DeviceError> {
        self.command("seek", Call::Seek(handle, position_millis))
    }

    async fn stop(&self, handle: DeviceHandle) -> Result<(), DeviceError> {
        self.command("stop", Call::Stop(handle))
    }

    async fn release(&self, handle: DeviceHandle) -> Result<(), DeviceError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Release(handle));
        if script.live.remove(&handle) {
            Ok(())
        } else {
            Err(DeviceError::UnknownHandle(handle))
        }
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn create_test_track(id: &str) -> Track {
    Track::new(id, format!("Track {}", id), uri(id))
        .with_artist(ArtistRef::named("artist1", "Test Artist"))
        .with_duration_secs(180.0)
}

pub fn create_test_queue(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| create_test_track(id)).collect()
}

pub fn uri(id: &str) -> String {
    format!("https://media.example.com/audio/{}.mp3", id)
}

pub fn engine_with(device: &Arc<ScriptedDevice>, config: PlayerConfig) -> PlayerEngine {
    init_tracing();
    PlayerEngine::new(device.clone(), config)
}

pub fn engine(device: &Arc<ScriptedDevice>) -> PlayerEngine {
    engine_with(device, PlayerConfig::default())
}

pub fn current_id(engine: &PlayerEngine) -> Option<String> {
    engine
        .snapshot()
        .current_track
        .map(|track| track.id.as_str().to_string())
}

/// Yield until `condition` holds (spawned tasks get to run in between)
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
