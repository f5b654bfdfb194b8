//! Single-shot, cancellable poll timer on the ambient tokio runtime.

use crate::{Error, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Default)]
struct Slot {
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

/// At most one pending callback at a time.
///
/// A callback that was cancelled or replaced never runs, even if its sleep
/// already finished; the generation check covers the window between wake-up
/// and abort.
pub struct PollTimer {
    runtime: Handle,
    slot: Arc<Mutex<Slot>>,
}

impl PollTimer {
    /// Bind to the current tokio runtime.
    pub fn new() -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            Error::InitializationError(format!("poll timer needs a tokio runtime: {}", e))
        })?;
        Ok(Self {
            runtime,
            slot: Arc::new(Mutex::new(Slot::default())),
        })
    }

    /// Schedule `f` after `delay`, replacing any pending callback.
    pub fn arm<F>(&self, delay: Duration, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = self.slot.lock().unwrap();
        self.schedule(&mut slot, delay, f);
    }

    /// Schedule `f` unless a callback is already pending. Returns whether it was scheduled.
    pub fn arm_if_idle<F>(&self, delay: Duration, f: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = self.slot.lock().unwrap();
        if slot.pending.is_some() {
            return false;
        }
        self.schedule(&mut slot, delay, f);
        true
    }

    /// Drop the pending callback, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let mut slot = self.slot.lock().unwrap();
        slot.generation = slot.generation.wrapping_add(1);
        match slot.pending.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.slot.lock().unwrap().pending.is_some()
    }

    fn schedule<F>(&self, slot: &mut Slot, delay: Duration, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(previous) = slot.pending.take() {
            previous.abort();
        }
        slot.generation = slot.generation.wrapping_add(1);
        let generation = slot.generation;
        let shared = self.slot.clone();

        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut slot = shared.lock().unwrap();
                if slot.generation != generation {
                    return;
                }
                slot.pending = None;
            }
            f();
        });
        slot.pending = Some(task);
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
