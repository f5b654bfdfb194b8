//! Shared loading of the external player library.
//!
//! One `PlayerLoaderService` exists per page (owned by the host and handed to
//! every controller). It injects the library script once and, when the
//! library reports readiness, tells each waiting controller to create its
//! player.

use crate::render::RenderTarget;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Mutex, Weak};

/// Loading progress; only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    NotLoaded,
    Loading,
    Loaded,
}

/// Something waiting for the library before it can create its player.
pub trait DeferredPlayer: Send + Sync {
    fn create_player(&self);
}

struct LoaderInner {
    state: LoaderState,
    // Only populated between construction and readiness; drained on ready.
    registry: HashMap<String, Weak<dyn DeferredPlayer>>,
}

pub struct PlayerLoaderService {
    library_url: String,
    inner: Mutex<LoaderInner>,
}

impl PlayerLoaderService {
    pub fn new(library_url: impl Into<String>) -> Self {
        Self {
            library_url: library_url.into(),
            inner: Mutex::new(LoaderInner {
                state: LoaderState::NotLoaded,
                registry: HashMap::new(),
            }),
        }
    }

    pub fn library_url(&self) -> &str {
        &self.library_url
    }

    pub fn state(&self) -> LoaderState {
        self.inner.lock().unwrap().state
    }

    /// Start loading the library unless that already happened.
    ///
    /// Returns `true` only for the call that injected the script.
    pub fn ensure_loading(&self, target: &dyn RenderTarget) -> bool {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.state != LoaderState::NotLoaded {
                return false;
            }
            inner.state = LoaderState::Loading;
        }
        info!("Loading player library from {}", self.library_url);
        target.inject_script(&self.library_url);
        true
    }

    /// Either report that the library is ready (`true`: create the player now)
    /// or park `waiter` under `video_id` until [`on_library_ready`](Self::on_library_ready).
    pub fn register_or_ready(&self, video_id: &str, waiter: Weak<dyn DeferredPlayer>) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.state == LoaderState::Loaded {
            return true;
        }
        if inner.registry.insert(video_id.to_string(), waiter).is_some() {
            warn!("Video {} registered twice; the earlier widget will never get a player", video_id);
        }
        debug!("Video {} waiting for player library", video_id);
        false
    }

    /// Ids currently waiting for the library.
    pub fn pending(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.lock().unwrap().registry.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Library ready callback. Marks the loader `Loaded` and dispatches
    /// `create_player` once to every waiting widget, in no particular order.
    /// Later calls are ignored.
    pub fn on_library_ready(&self) {
        let waiting = {
            let mut inner = self.inner.lock().unwrap();
            if inner.state == LoaderState::Loaded {
                warn!("Player library reported ready more than once; ignoring");
                return;
            }
            inner.state = LoaderState::Loaded;
            std::mem::take(&mut inner.registry)
        };

        info!("Player library ready; creating {} pending player(s)", waiting.len());
        for (video_id, waiter) in waiting {
            match waiter.upgrade() {
                Some(w) => w.create_player(),
                None => debug!("Widget for {} dropped before library was ready", video_id),
            }
        }
    }
}
