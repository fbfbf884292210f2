//! Window Operations
//!
//! Title, cursor, pointer warp, raise and position queries. Each of these is
//! a checked request or a request/reply round trip.

use tracing::{debug, warn};
use x11rb::protocol::xproto::{Atom, ClientMessageEvent, EventMask, Window as XWindow};

use crate::conn::XConnection;
use crate::cursor::CursorKind;
use crate::error::Result;
use crate::geom::{clamp_i16, Point};
use crate::session::ScreenInfo;
use crate::window::Window;

/// `_NET_ACTIVE_WINDOW` client message payload (EWMH).
///
/// Sent to the root window to ask the window manager to raise and focus
/// a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindowRequest {
    pub window: XWindow,
    pub message_type: Atom,
    /// Source indication; 0 is what legacy clients send
    pub source: u32,
    pub timestamp: u32,
    /// Requestor's currently active window, 0 if none
    pub current_active: u32,
}

impl ActiveWindowRequest {
    pub const FORMAT: u8 = 32;
    pub const SOURCE: usize = 0;
    pub const TIMESTAMP: usize = 1;
    pub const CURRENT_ACTIVE: usize = 2;

    pub fn new(window: XWindow, message_type: Atom) -> Self {
        Self {
            window,
            message_type,
            source: 0,
            timestamp: x11rb::CURRENT_TIME,
            current_active: 0,
        }
    }

    /// Five 32-bit data words; words 3 and 4 are unused and zero
    pub fn data(&self) -> [u32; 5] {
        let mut data = [0u32; 5];
        data[Self::SOURCE] = self.source;
        data[Self::TIMESTAMP] = self.timestamp;
        data[Self::CURRENT_ACTIVE] = self.current_active;
        data
    }

    pub fn to_event(&self) -> ClientMessageEvent {
        ClientMessageEvent::new(Self::FORMAT, self.window, self.message_type, self.data())
    }
}

impl<C: XConnection> Window<C> {
    /// Set `_NET_WM_NAME` to `title` (UTF-8)
    pub fn set_title(&self, title: &str) -> Result<()> {
        let h = self.live_handles()?;
        let atoms = &self.session.atoms;
        self.conn()
            .change_property8(h.window, atoms.net_wm_name, atoms.utf8_string, title.as_bytes())?;
        Ok(())
    }

    /// Install a cursor from the session cache. Kinds missing from the cache
    /// are ignored.
    pub fn set_cursor(&self, kind: CursorKind) -> Result<()> {
        let h = self.live_handles()?;
        let Some(cursor) = self.session.cursors.get(kind) else {
            debug!("No cached cursor for {:?}, leaving cursor unchanged", kind);
            return Ok(());
        };
        self.conn().change_cursor(h.window, cursor)?;
        Ok(())
    }

    /// Move the pointer to `p` in window coordinates, but only while this
    /// window has input focus
    pub fn warp_mouse(&self, p: Point) -> Result<()> {
        let h = self.live_handles()?;
        let focus = self.conn().get_input_focus()?;
        if focus != h.window {
            debug!("Window {:#x} not focused (focus {:#x}), skipping warp", h.window, focus);
            return Ok(());
        }

        let screen = self.session.screen;
        let root_point = self.translate_to_screen(&screen, p)?;
        self.conn()
            .warp_pointer(screen.root, clamp_i16(root_point.x), clamp_i16(root_point.y))?;
        Ok(())
    }

    /// Convert window coordinates to coordinates relative to `screen`'s root
    pub fn translate_to_screen(&self, screen: &ScreenInfo, p: Point) -> Result<Point> {
        let h = self.live_handles()?;
        let (x, y) = self
            .conn()
            .translate_coordinates(h.window, screen.root, clamp_i16(p.x), clamp_i16(p.y))?;
        Ok(Point::new(x as i32, y as i32))
    }

    /// Ask the window manager to raise and focus the window, then map it
    pub fn raise(&self) -> Result<()> {
        let h = self.live_handles()?;
        let screen = self.session.screen;
        let request = ActiveWindowRequest::new(h.window, self.session.atoms.net_active_window);

        self.conn().send_event(
            screen.root,
            EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
            request.to_event(),
        )?;

        // The window manager may already have mapped it
        if let Err(e) = self.conn().map_window(h.window) {
            debug!("Map after raise failed for window {:#x}: {}", h.window, e);
        }
        Ok(())
    }

    /// Window origin in root coordinates; (0, 0) if the query fails
    pub fn absolute_position(&self) -> Point {
        let screen = self.session.screen;
        match self.translate_to_screen(&screen, Point::default()) {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to query absolute position of window {:#x}: {}", self.id(), e);
                Point::default()
            }
        }
    }
}
