//! Session Module
//!
//! Connection-wide state shared by every window: the connection itself,
//! root screen geometry, interned atoms, the keysym table and the cursor
//! cache.

use std::sync::Arc;
use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::render::{ConnectionExt as _, Pictformat};
use x11rb::protocol::xproto::{Atom, ConnectionExt as _, Visualid, Window};
use x11rb::rust_connection::RustConnection;

use crate::conn::XConnection;
use crate::cursor::CursorCache;
use crate::error::{Result, WindowError};
use crate::keys::KeysymTable;

/// Atoms windows need for their auxiliary operations
#[derive(Debug, Clone, Copy)]
pub struct Atoms {
    pub net_wm_name: Atom,
    pub utf8_string: Atom,
    pub net_active_window: Atom,
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
}

impl Atoms {
    /// Intern all required atoms
    pub fn new<C: Connection>(conn: &C) -> Result<Self> {
        let intern = |name: &str| -> Result<Atom> {
            Ok(conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
        };

        Ok(Self {
            net_wm_name: intern("_NET_WM_NAME")?,
            utf8_string: intern("UTF8_STRING")?,
            net_active_window: intern("_NET_ACTIVE_WINDOW")?,
            wm_protocols: intern("WM_PROTOCOLS")?,
            wm_delete_window: intern("WM_DELETE_WINDOW")?,
        })
    }
}

/// Root screen properties
#[derive(Debug, Clone, Copy)]
pub struct ScreenInfo {
    pub root: Window,
    pub root_depth: u8,
    pub root_visual: Visualid,
    /// RENDER picture format matching `root_visual`
    pub pictformat: Pictformat,
    pub width_px: u16,
    pub height_px: u16,
    pub pixels_per_pt: f32,
}

/// Pixels per typographic point (1/72 inch) for a screen of the given
/// physical width. Falls back to 1.0 when the server reports no size.
pub fn pixels_per_pt(width_px: u16, width_mm: u16) -> f32 {
    if width_px == 0 || width_mm == 0 {
        return 1.0;
    }
    width_px as f32 / width_mm as f32 * 25.4 / 72.0
}

/// Shared per-connection state handed to every window
pub struct Session<C: XConnection> {
    pub conn: Arc<C>,
    pub screen: ScreenInfo,
    pub atoms: Atoms,
    pub keysyms: KeysymTable,
    pub cursors: CursorCache,
}

impl<C: XConnection> Session<C> {
    pub fn new(
        conn: Arc<C>,
        screen: ScreenInfo,
        atoms: Atoms,
        keysyms: KeysymTable,
        cursors: CursorCache,
    ) -> Self {
        Self {
            conn,
            screen,
            atoms,
            keysyms,
            cursors,
        }
    }
}

impl Session<RustConnection> {
    /// Gather session state from a live connection.
    ///
    /// `pixels_per_pt` overrides the value derived from the screen's
    /// physical size.
    pub fn connect(
        conn: Arc<RustConnection>,
        screen_num: usize,
        pixels_per_pt_override: Option<f32>,
    ) -> Result<Self> {
        let setup = conn.setup();
        let xscreen = setup
            .roots
            .get(screen_num)
            .ok_or(WindowError::NoScreen(screen_num))?;
        let root_visual = xscreen.root_visual;

        let formats = conn.render_query_pict_formats()?.reply()?;
        let pictformat = formats
            .screens
            .iter()
            .flat_map(|s| s.depths.iter())
            .flat_map(|d| d.visuals.iter())
            .find(|v| v.visual == root_visual)
            .map(|v| v.format)
            .ok_or(WindowError::NoPictFormat(root_visual))?;

        let ppp = pixels_per_pt_override.unwrap_or_else(|| {
            pixels_per_pt(xscreen.width_in_pixels, xscreen.width_in_millimeters)
        });

        let screen = ScreenInfo {
            root: xscreen.root,
            root_depth: xscreen.root_depth,
            root_visual,
            pictformat,
            width_px: xscreen.width_in_pixels,
            height_px: xscreen.height_in_pixels,
            pixels_per_pt: ppp,
        };
        info!(
            "Screen {}: root {:#x}, {}x{}, depth {}, {:.3} px/pt",
            screen_num, screen.root, screen.width_px, screen.height_px, screen.root_depth, ppp
        );

        let atoms = Atoms::new(conn.as_ref())?;
        debug!("Interned atoms: {:?}", atoms);

        let min_keycode = setup.min_keycode;
        let count = setup.max_keycode - min_keycode + 1;
        let mapping = conn.get_keyboard_mapping(min_keycode, count)?.reply()?;
        let keysyms = KeysymTable::from_reply(min_keycode, &mapping);

        let cursors = CursorCache::load(conn.as_ref())?;

        Ok(Self::new(conn, screen, atoms, keysyms, cursors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixels_per_pt_from_dpi() {
        // 96 DPI: 1920 px across 508 mm
        let ppp = pixels_per_pt(1920, 508);
        assert!((ppp - 96.0 / 72.0).abs() < 1e-4);
    }

    #[test]
    fn test_pixels_per_pt_unknown_size() {
        assert_eq!(pixels_per_pt(1920, 0), 1.0);
    }
}
