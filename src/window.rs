//! Per-window state and event translation
//!
//! The display's read path feeds raw notifications into the `handle_*`
//! methods; they update the lifecycle and push normalized events onto the
//! window's queue. Drawing lives in `surface`, auxiliary window requests in
//! `ops`.

use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, trace};

use crate::conn::XConnection;
use crate::error::{Result, WindowError};
use crate::event::{
    Event, EventQueue, KeyDirection, KeyEvent, MouseButton, MouseDirection, MouseEvent, SizeEvent,
};
use crate::keys::Modifiers;
use crate::lifecycle::{Lifecycle, Lifecycler};
use crate::resource::{NativeHandles, ResourceHandle};
use crate::session::Session;

/// One on-screen window
pub struct Window<C: XConnection> {
    pub(crate) session: Arc<Session<C>>,
    resources: ResourceHandle,
    events: EventQueue,
    lifecycle: Box<dyn Lifecycle>,
    /// Last observed (width, height); only touched by the event path
    size: Mutex<(i32, i32)>,
}

impl<C: XConnection> Window<C> {
    pub fn new(session: Arc<Session<C>>, handles: NativeHandles) -> Self {
        Self::with_lifecycle(session, handles, Box::new(Lifecycler::new()))
    }

    pub fn with_lifecycle(
        session: Arc<Session<C>>,
        handles: NativeHandles,
        lifecycle: Box<dyn Lifecycle>,
    ) -> Self {
        Self {
            session,
            resources: ResourceHandle::new(handles),
            events: EventQueue::new(),
            lifecycle,
            size: Mutex::new((0, 0)),
        }
    }

    /// X11 window id
    pub fn id(&self) -> u32 {
        self.resources.handles().window
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Wait for the next event; `None` once the window is released and the
    /// queue drained
    pub async fn next_event(&self) -> Option<Event> {
        self.events.next_event().await
    }

    pub fn is_released(&self) -> bool {
        self.resources.is_released()
    }

    /// Handles of a live window, or `Closed` after release
    pub(crate) fn live_handles(&self) -> Result<NativeHandles> {
        if self.resources.is_released() {
            return Err(WindowError::Closed(self.id()));
        }
        Ok(self.resources.handles())
    }

    pub(crate) fn conn(&self) -> &C {
        self.session.conn.as_ref()
    }

    /// Free the window's native resources. Safe to call any number of times
    /// from any thread; only the first call has an effect.
    ///
    /// The first call also marks the window dead, queues the resulting
    /// lifecycle event and closes the queue.
    pub fn release(&self) {
        if !self.resources.release(self.conn()) {
            return;
        }
        info!("Released window {:#x}", self.id());
        self.lifecycle.set_dead(true);
        self.lifecycle.send_event(&self.events);
        self.events.close();
    }

    /// DestroyNotify for this window: the server ids are already gone, so
    /// nothing is freed. Otherwise behaves like the first `release`.
    pub fn handle_destroyed(&self) {
        if !self.resources.forget() {
            return;
        }
        info!("Window {:#x} destroyed by the server", self.id());
        self.lifecycle.set_dead(true);
        self.lifecycle.send_event(&self.events);
        self.events.close();
    }

    /// ConfigureNotify: update visibility, then emit a size event if the
    /// dimensions changed
    pub fn handle_configure(&self, x: i16, y: i16, width: u16, height: u16) {
        let (x, y, width, height) = (x as i32, y as i32, width as i32, height as i32);
        self.lifecycle.set_visible(x + width > 0 && y + height > 0);
        self.lifecycle.send_event(&self.events);

        {
            let mut size = self.size.lock().unwrap_or_else(PoisonError::into_inner);
            if *size == (width, height) {
                trace!("Window {:#x}: configure without size change", self.id());
                return;
            }
            *size = (width, height);
        }

        let ppp = self.session.screen.pixels_per_pt;
        debug!("Window {:#x}: resized to {}x{}", self.id(), width, height);
        self.events.send(Event::Size(SizeEvent {
            width_px: width,
            height_px: height,
            width_pt: width as f32 / ppp,
            height_pt: height as f32 / ppp,
            pixels_per_pt: ppp,
        }));
    }

    /// Expose: request a repaint
    pub fn handle_expose(&self) {
        self.events.send(Event::Paint);
    }

    pub fn handle_key(&self, keycode: u8, state: u16, direction: KeyDirection) {
        let (rune, code) = self.session.keysyms.lookup(keycode, state);
        self.events.send(Event::Key(KeyEvent {
            rune,
            code,
            modifiers: Modifiers::from_x11_state(state),
            direction,
        }));
    }

    /// Button or motion notification. Buttons 4-7 are wheel notches: they
    /// produce a single `Step` on press and nothing on release.
    pub fn handle_mouse(&self, x: i16, y: i16, button: u8, state: u16, direction: MouseDirection) {
        let button = MouseButton::from_x11(button);
        let direction = if button.is_wheel() {
            if direction != MouseDirection::Press {
                return;
            }
            MouseDirection::Step
        } else {
            direction
        };
        self.events.send(Event::Mouse(MouseEvent {
            x: x as f32,
            y: y as f32,
            button,
            modifiers: Modifiers::from_x11_state(state),
            direction,
        }));
    }

    /// FocusIn / FocusOut
    pub fn handle_focus(&self, focused: bool) {
        self.lifecycle.set_focused(focused);
        self.lifecycle.send_event(&self.events);
    }

    /// WM_DELETE_WINDOW from the window manager: the window is dead to the
    /// application, which decides when to release it
    pub fn handle_delete_request(&self) {
        self.lifecycle.set_dead(true);
        self.lifecycle.send_event(&self.events);
    }
}

impl<C: XConnection> std::fmt::Debug for Window<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("handles", &self.resources.handles())
            .field("released", &self.resources.is_released())
            .finish()
    }
}
