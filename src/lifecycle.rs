//! Lifecycle tracking
//!
//! Visibility, focus and liveness signals from the event path are folded
//! into a single [`Stage`]; a [`LifecycleEvent`] is queued whenever the stage
//! observed by `send_event` differs from the last one emitted.

use std::sync::{Mutex, PoisonError};
use tracing::debug;

use crate::event::{Event, EventQueue, LifecycleEvent};

/// Coarse window lifecycle stage, ordered from least to most alive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Dead,
    Alive,
    Visible,
    Focused,
}

/// Lifecycle state machine fed by the window's event path
pub trait Lifecycle: Send + Sync {
    fn set_visible(&self, visible: bool);
    fn set_focused(&self, focused: bool);
    fn set_dead(&self, dead: bool);
    /// Queue a transition event onto `queue` if the stage changed
    fn send_event(&self, queue: &EventQueue);
}

#[derive(Debug, Clone, Copy)]
struct Flags {
    dead: bool,
    visible: bool,
    focused: bool,
    /// Stage reported by the previous `send_event`
    sent: Stage,
}

impl Flags {
    fn stage(&self) -> Stage {
        if self.dead {
            Stage::Dead
        } else if !self.visible {
            Stage::Alive
        } else if !self.focused {
            Stage::Visible
        } else {
            Stage::Focused
        }
    }
}

/// Default [`Lifecycle`] implementation
#[derive(Debug)]
pub struct Lifecycler {
    flags: Mutex<Flags>,
}

impl Lifecycler {
    pub fn new() -> Self {
        Self {
            flags: Mutex::new(Flags {
                dead: false,
                visible: false,
                focused: false,
                sent: Stage::Dead,
            }),
        }
    }

    pub fn stage(&self) -> Stage {
        self.flags.lock().unwrap_or_else(PoisonError::into_inner).stage()
    }

    fn update(&self, f: impl FnOnce(&mut Flags)) {
        f(&mut self.flags.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

impl Default for Lifecycler {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle for Lifecycler {
    fn set_visible(&self, visible: bool) {
        self.update(|f| f.visible = visible);
    }

    fn set_focused(&self, focused: bool) {
        self.update(|f| f.focused = focused);
    }

    fn set_dead(&self, dead: bool) {
        self.update(|f| f.dead = dead);
    }

    fn send_event(&self, queue: &EventQueue) {
        let mut flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);
        let to = flags.stage();
        let from = flags.sent;
        if from == to {
            return;
        }
        flags.sent = to;
        drop(flags);

        debug!("Lifecycle transition {:?} -> {:?}", from, to);
        queue.send(Event::Lifecycle(LifecycleEvent { from, to }));
    }
}
