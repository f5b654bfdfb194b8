//! Video player capability: the surface a quiz needs from an external player.
//!
//! The player itself (and the library that creates it) lives outside this
//! crate. Backends implement [`PlayerFactory`] and [`VideoPlayer`]; the
//! [`memory`] backend is a deterministic in-process player for tests and
//! headless previews.

pub mod memory;

pub use memory::{MemoryPlayer, MemoryPlayerFactory};

use crate::config::PlayerConfig;
use crate::Result;
use std::sync::Arc;

/// Playback state reported through state-change notifications.
///
/// Codes follow the IFrame player convention: `0` ended, `1` playing,
/// `2` paused; anything else (unstarted, buffering, cued) is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Playing,
    Paused,
    Ended,
    Other(i32),
}

impl PlayerState {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => PlayerState::Ended,
            1 => PlayerState::Playing,
            2 => PlayerState::Paused,
            other => PlayerState::Other(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            PlayerState::Ended => 0,
            PlayerState::Playing => 1,
            PlayerState::Paused => 2,
            PlayerState::Other(code) => code,
        }
    }
}

pub type ReadyHandler = Arc<dyn Fn() + Send + Sync>;
pub type StateChangeHandler = Arc<dyn Fn(PlayerState) + Send + Sync>;

/// Notifications a player delivers back to its owner
#[derive(Clone, Default)]
pub struct PlayerEvents {
    pub on_ready: Option<ReadyHandler>,
    pub on_state_change: Option<StateChangeHandler>,
}

impl PlayerEvents {
    pub fn ready(&self) {
        if let Some(cb) = &self.on_ready {
            cb();
        }
    }

    pub fn state_change(&self, state: PlayerState) {
        if let Some(cb) = &self.on_state_change {
            cb(state);
        }
    }
}

/// A live player handle
pub trait VideoPlayer: Send + Sync {
    fn play(&self);
    fn pause(&self);
    /// Current playback position in seconds, `None` until the player can report one
    fn current_time(&self) -> Option<f64>;
    fn state(&self) -> PlayerState;
}

/// Creates players bound to a container element.
///
/// The factory (the external library) owns the players it creates; callers
/// should keep only a `Weak` reference. Implementations that cannot create a
/// player return [`Error::PlayerError`](crate::Error::PlayerError).
pub trait PlayerFactory: Send + Sync {
    fn create(
        &self,
        container_id: &str,
        video_id: &str,
        config: &PlayerConfig,
        events: PlayerEvents,
    ) -> Result<Arc<dyn VideoPlayer>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn state_codes() {
        assert_eq!(PlayerState::from_code(1), PlayerState::Playing);
        assert_eq!(PlayerState::from_code(2), PlayerState::Paused);
        assert_eq!(PlayerState::from_code(0), PlayerState::Ended);
        assert_eq!(PlayerState::from_code(3), PlayerState::Other(3));
        assert_eq!(PlayerState::from_code(-1).code(), -1);
    }

    #[test]
    fn events_dispatch_to_handlers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let events = PlayerEvents {
            on_ready: None,
            on_state_change: Some(Arc::new(move |st: PlayerState| s.lock().unwrap().push(st))),
        };
        events.ready();
        events.state_change(PlayerState::Paused);
        assert_eq!(*seen.lock().unwrap(), vec![PlayerState::Paused]);
    }
}
