//! In-memory player for deterministic playback control in tests

use super::{PlayerEvents, PlayerFactory, PlayerState, VideoPlayer};
use crate::config::PlayerConfig;
use crate::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A player whose position is set by hand.
///
/// `play`/`pause` update the state and, when `emits_on_command` is set,
/// deliver the matching state-change notification synchronously. No internal
/// lock is held while a notification runs.
pub struct MemoryPlayer {
    video_id: String,
    container_id: String,
    config: PlayerConfig,
    events: PlayerEvents,
    emits_on_command: bool,
    state: Mutex<PlayerState>,
    position: Mutex<Option<f64>>,
    plays: AtomicUsize,
    pauses: AtomicUsize,
}

impl MemoryPlayer {
    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Move the playhead; `None` means the position is not available yet.
    pub fn set_position(&self, seconds: Option<f64>) {
        *self.position.lock().unwrap() = seconds;
    }

    /// Deliver the ready notification.
    pub fn emit_ready(&self) {
        self.events.ready();
    }

    /// Change state as if the viewer used the player's own controls.
    pub fn emit_state(&self, state: PlayerState) {
        *self.state.lock().unwrap() = state;
        self.events.state_change(state);
    }

    pub fn play_count(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn pause_count(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }
}

impl VideoPlayer for MemoryPlayer {
    fn play(&self) {
        self.plays.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().unwrap() = PlayerState::Playing;
        if self.emits_on_command {
            self.events.state_change(PlayerState::Playing);
        }
    }

    fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().unwrap() = PlayerState::Paused;
        if self.emits_on_command {
            self.events.state_change(PlayerState::Paused);
        }
    }

    fn current_time(&self) -> Option<f64> {
        *self.position.lock().unwrap()
    }

    fn state(&self) -> PlayerState {
        *self.state.lock().unwrap()
    }
}

/// Factory that keeps every player it creates, standing in for the external library.
pub struct MemoryPlayerFactory {
    emits_on_command: bool,
    players: Mutex<Vec<Arc<MemoryPlayer>>>,
}

impl MemoryPlayerFactory {
    /// Players that notify on programmatic `play`/`pause`.
    pub fn new() -> Self {
        Self {
            emits_on_command: true,
            players: Mutex::new(Vec::new()),
        }
    }

    /// Players that stay silent on programmatic `play`/`pause`, like library
    /// versions that only notify for viewer-initiated changes.
    pub fn silent() -> Self {
        Self {
            emits_on_command: false,
            players: Mutex::new(Vec::new()),
        }
    }

    /// Most recently created player for `video_id`.
    pub fn player(&self, video_id: &str) -> Option<Arc<MemoryPlayer>> {
        self.players
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|p| p.video_id == video_id)
            .cloned()
    }

    /// Number of players created for `video_id`.
    pub fn created_for(&self, video_id: &str) -> usize {
        self.players
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.video_id == video_id)
            .count()
    }

    pub fn created(&self) -> usize {
        self.players.lock().unwrap().len()
    }

    /// Drop every player, as when the host page tears the library down.
    pub fn destroy_all(&self) {
        self.players.lock().unwrap().clear();
    }
}

impl Default for MemoryPlayerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerFactory for MemoryPlayerFactory {
    fn create(
        &self,
        container_id: &str,
        video_id: &str,
        config: &PlayerConfig,
        events: PlayerEvents,
    ) -> Result<Arc<dyn VideoPlayer>> {
        let player = Arc::new(MemoryPlayer {
            video_id: video_id.to_string(),
            container_id: container_id.to_string(),
            config: config.clone(),
            events,
            emits_on_command: self.emits_on_command,
            state: Mutex::new(PlayerState::Other(-1)),
            position: Mutex::new(None),
            plays: AtomicUsize::new(0),
            pauses: AtomicUsize::new(0),
        });
        self.players.lock().unwrap().push(player.clone());
        Ok(player)
    }
}
