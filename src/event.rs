//! Normalized window events and the per-window event queue
//!
//! The connection read path translates raw X11 notifications into these
//! records and pushes them onto the window's [`EventQueue`]. Application code
//! drains the queue in FIFO order.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

use crate::keys::{KeyCode, Modifiers};
use crate::lifecycle::Stage;

/// Window size change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeEvent {
    pub width_px: i32,
    pub height_px: i32,
    pub width_pt: f32,
    pub height_pt: f32,
    pub pixels_per_pt: f32,
}

/// Key press state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Press,
    Release,
    /// Auto-repeat of a held key
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Character produced by the key, if any
    pub rune: Option<char>,
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub direction: KeyDirection,
}

/// Semantic mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Motion with no button change
    None,
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    WheelLeft,
    WheelRight,
    /// Any other X11 button number
    Other(u8),
}

impl MouseButton {
    /// Map an X11 button number to its semantic button
    pub fn from_x11(button: u8) -> Self {
        match button {
            0 => MouseButton::None,
            1 => MouseButton::Left,
            2 => MouseButton::Middle,
            3 => MouseButton::Right,
            4 => MouseButton::WheelUp,
            5 => MouseButton::WheelDown,
            6 => MouseButton::WheelLeft,
            7 => MouseButton::WheelRight,
            n => MouseButton::Other(n),
        }
    }

    pub fn is_wheel(&self) -> bool {
        matches!(
            self,
            MouseButton::WheelUp
                | MouseButton::WheelDown
                | MouseButton::WheelLeft
                | MouseButton::WheelRight
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseDirection {
    /// Pointer motion
    None,
    Press,
    Release,
    /// A single wheel notch
    Step,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub x: f32,
    pub y: f32,
    pub button: MouseButton,
    pub modifiers: Modifiers,
    pub direction: MouseDirection,
}

/// Lifecycle stage transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub from: Stage,
    pub to: Stage,
}

/// A display-server-agnostic window event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Size(SizeEvent),
    /// The window contents need to be repainted
    Paint,
    Key(KeyEvent),
    Mouse(MouseEvent),
    Lifecycle(LifecycleEvent),
}

/// Unbounded FIFO of window events.
///
/// Any number of producers may `send`; consumers either poll with
/// [`try_next_event`](Self::try_next_event) or wait with
/// [`next_event`](Self::next_event). Once closed, waiting consumers drain the
/// remaining events and then receive `None`.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Mutex<VecDeque<Event>>,
    notify: Notify,
    closed: AtomicBool,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Event>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an event. Events sent after `close` are dropped.
    pub fn send(&self, event: Event) {
        if self.is_closed() {
            return;
        }
        self.lock().push_back(event);
        self.notify.notify_one();
    }

    /// Pop the oldest event without waiting
    pub fn try_next_event(&self) -> Option<Event> {
        self.lock().pop_front()
    }

    /// Wait for the next event; `None` once the queue is closed and empty
    pub async fn next_event(&self) -> Option<Event> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(event) = self.try_next_event() {
                return Some(event);
            }
            if self.is_closed() {
                return None;
            }
            notified.await;
        }
    }

    /// Stop accepting events and wake every waiting consumer
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drain everything currently queued
    pub fn drain(&self) -> Vec<Event> {
        self.lock().drain(..).collect()
    }
}
