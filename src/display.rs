//! Display Module
//!
//! Window factory and event dispatcher. The display owns the session and a
//! registry of live windows; the connection's read path hands every X11
//! event to [`Display::handle_event`], which routes it to the owning window.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, trace, warn};
use x11rb::protocol::Event;
use x11rb::protocol::render::CreatePictureAux;
use x11rb::protocol::xproto::{
    AtomEnum, CreateGCAux, CreateWindowAux, EventMask, KeyReleaseEvent, Window as XWindow,
};

use crate::conn::{WindowParams, XConnection};
use crate::error::Result;
use crate::event::{KeyDirection, MouseDirection};
use crate::resource::NativeHandles;
use crate::session::Session;
use crate::window::Window;

/// Parameters for [`Display::new_window`]
#[derive(Debug, Clone)]
pub struct WindowOptions {
    pub title: String,
    pub width: u16,
    pub height: u16,
    /// Background pixel value (`0xRRGGBB` on TrueColor visuals)
    pub background: u32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: 1024,
            height: 768,
            background: 0xffffff,
        }
    }
}

fn window_events() -> EventMask {
    EventMask::EXPOSURE
        | EventMask::STRUCTURE_NOTIFY
        | EventMask::KEY_PRESS
        | EventMask::KEY_RELEASE
        | EventMask::BUTTON_PRESS
        | EventMask::BUTTON_RELEASE
        | EventMask::POINTER_MOTION
        | EventMask::FOCUS_CHANGE
}

pub struct Display<C: XConnection> {
    session: Arc<Session<C>>,
    windows: Mutex<HashMap<XWindow, Arc<Window<C>>>>,
    /// KeyRelease held back until the next event, to recognise autorepeat.
    /// The read loop keeps it across batches for a short grace period.
    pending_release: Mutex<Option<KeyReleaseEvent>>,
}

impl<C: XConnection> Display<C> {
    pub fn new(session: Arc<Session<C>>) -> Self {
        Self {
            session,
            windows: Mutex::new(HashMap::new()),
            pending_release: Mutex::new(None),
        }
    }

    pub fn session(&self) -> &Arc<Session<C>> {
        &self.session
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<XWindow, Arc<Window<C>>>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn window(&self, id: XWindow) -> Option<Arc<Window<C>>> {
        self.registry().get(&id).cloned()
    }

    pub fn window_count(&self) -> usize {
        self.registry().len()
    }

    /// Create, register and map a new top-level window
    pub fn new_window(&self, opts: &WindowOptions) -> Result<Arc<Window<C>>> {
        let conn = self.session.conn.as_ref();
        let screen = self.session.screen;

        let handles = NativeHandles {
            window: conn.generate_id()?,
            gc: conn.generate_id()?,
            picture: conn.generate_id()?,
        };

        let params = WindowParams {
            parent: screen.root,
            x: 0,
            y: 0,
            width: opts.width.max(1),
            height: opts.height.max(1),
            depth: screen.root_depth,
            visual: screen.root_visual,
        };
        conn.create_window(
            handles.window,
            &params,
            &CreateWindowAux::new()
                .background_pixel(opts.background)
                .event_mask(window_events()),
        )?;
        conn.create_gc(handles.gc, handles.window, &CreateGCAux::new())?;
        conn.create_picture(handles.picture, handles.window, screen.pictformat, &CreatePictureAux::new())?;

        let window = Arc::new(Window::new(self.session.clone(), handles));
        self.registry().insert(handles.window, window.clone());

        if let Err(e) = self.finish_window(&window, opts) {
            self.release_window(handles.window);
            return Err(e);
        }

        info!(
            "Created window {:#x} ({}x{}) \"{}\"",
            handles.window, params.width, params.height, opts.title
        );
        Ok(window)
    }

    fn finish_window(&self, window: &Window<C>, opts: &WindowOptions) -> Result<()> {
        let conn = self.session.conn.as_ref();
        let atoms = &self.session.atoms;
        conn.change_property32(
            window.id(),
            atoms.wm_protocols,
            AtomEnum::ATOM.into(),
            &[atoms.wm_delete_window],
        )?;
        window.set_title(&opts.title)?;
        conn.map_window(window.id())?;
        Ok(())
    }

    /// Release a window and drop it from the registry
    pub fn release_window(&self, id: XWindow) {
        let window = self.registry().remove(&id);
        if let Some(window) = window {
            window.release();
        }
    }

    /// Release every registered window
    pub fn release_all(&self) {
        let windows: Vec<_> = self.registry().drain().map(|(_, w)| w).collect();
        for window in windows {
            window.release();
        }
    }

    /// Whether a key release is being held back
    pub fn has_pending_key(&self) -> bool {
        self.pending_release
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Emit a held-back key release. The read loop calls this once no
    /// matching press arrived within the grace period.
    pub fn flush_pending_key(&self) {
        let pending = self
            .pending_release
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(e) = pending {
            if let Some(window) = self.window(e.event) {
                window.handle_key(e.detail, u16::from(e.state), KeyDirection::Release);
            }
        }
    }

    /// Route one X11 event to its window
    pub fn handle_event(&self, event: &Event) {
        if let Event::KeyPress(e) = event {
            let mut pending = self.pending_release.lock().unwrap_or_else(PoisonError::into_inner);
            let repeat = matches!(
                pending.as_ref(),
                Some(r) if r.event == e.event && r.detail == e.detail && r.time == e.time
            );
            if repeat {
                pending.take();
                drop(pending);
                if let Some(window) = self.window(e.event) {
                    window.handle_key(e.detail, u16::from(e.state), KeyDirection::Repeat);
                }
                return;
            }
        }
        self.flush_pending_key();

        match event {
            Event::ConfigureNotify(e) => {
                if let Some(w) = self.window(e.window) {
                    w.handle_configure(e.x, e.y, e.width, e.height);
                }
            }
            Event::Expose(e) => {
                // Only the last of a run of exposures
                if e.count == 0 {
                    if let Some(w) = self.window(e.window) {
                        w.handle_expose();
                    }
                }
            }
            Event::KeyPress(e) => {
                if let Some(w) = self.window(e.event) {
                    w.handle_key(e.detail, u16::from(e.state), KeyDirection::Press);
                }
            }
            Event::KeyRelease(e) => {
                *self.pending_release.lock().unwrap_or_else(PoisonError::into_inner) = Some(*e);
            }
            Event::ButtonPress(e) => {
                if let Some(w) = self.window(e.event) {
                    w.handle_mouse(e.event_x, e.event_y, e.detail, u16::from(e.state), MouseDirection::Press);
                }
            }
            Event::ButtonRelease(e) => {
                if let Some(w) = self.window(e.event) {
                    w.handle_mouse(e.event_x, e.event_y, e.detail, u16::from(e.state), MouseDirection::Release);
                }
            }
            Event::MotionNotify(e) => {
                if let Some(w) = self.window(e.event) {
                    w.handle_mouse(e.event_x, e.event_y, 0, u16::from(e.state), MouseDirection::None);
                }
            }
            Event::FocusIn(e) => {
                if let Some(w) = self.window(e.event) {
                    w.handle_focus(true);
                }
            }
            Event::FocusOut(e) => {
                if let Some(w) = self.window(e.event) {
                    w.handle_focus(false);
                }
            }
            Event::ClientMessage(e) => {
                let atoms = &self.session.atoms;
                if e.format == 32
                    && e.type_ == atoms.wm_protocols
                    && e.data.as_data32()[0] == atoms.wm_delete_window
                {
                    debug!("WM_DELETE_WINDOW for window {:#x}", e.window);
                    if let Some(w) = self.window(e.window) {
                        w.handle_delete_request();
                    }
                }
            }
            Event::DestroyNotify(e) => {
                let window = self.registry().remove(&e.window);
                if let Some(w) = window {
                    debug!("Window {:#x} destroyed, unregistered", e.window);
                    w.handle_destroyed();
                }
            }
            Event::Error(e) => {
                warn!(
                    "X11 error: {:?} (sequence {}, major {}, minor {})",
                    e.error_kind, e.sequence, e.major_opcode, e.minor_opcode
                );
            }
            other => trace!("Ignoring event {:?}", other),
        }
    }
}
