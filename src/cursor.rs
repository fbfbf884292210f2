//! Cursor cache
//!
//! Font cursors are created once per session and looked up by [`CursorKind`].

use std::collections::HashMap;
use tracing::{debug, warn};
use x11rb::connection::Connection;
use x11rb::errors::ReplyOrIdError;
use x11rb::protocol::xproto::{ConnectionExt as _, Cursor};
use x11rb::rust_connection::RustConnection;

/// Cursor shape requested by application code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorKind {
    Arrow,
    Text,
    Pointer,
    Crosshair,
    Wait,
    Move,
    ResizeHorizontal,
    ResizeVertical,
    NotAllowed,
}

impl CursorKind {
    /// Glyph index in the X cursor font
    fn glyph(self) -> Option<u16> {
        match self {
            CursorKind::Arrow => Some(68),            // left_ptr
            CursorKind::Text => Some(152),            // xterm
            CursorKind::Pointer => Some(60),          // hand2
            CursorKind::Crosshair => Some(34),        // crosshair
            CursorKind::Wait => Some(150),            // watch
            CursorKind::Move => Some(52),             // fleur
            CursorKind::ResizeHorizontal => Some(108), // sb_h_double_arrow
            CursorKind::ResizeVertical => Some(116),  // sb_v_double_arrow
            // No glyph in the core cursor font
            CursorKind::NotAllowed => None,
        }
    }

    const ALL: [CursorKind; 9] = [
        CursorKind::Arrow,
        CursorKind::Text,
        CursorKind::Pointer,
        CursorKind::Crosshair,
        CursorKind::Wait,
        CursorKind::Move,
        CursorKind::ResizeHorizontal,
        CursorKind::ResizeVertical,
        CursorKind::NotAllowed,
    ];
}

/// Session-wide map from cursor kind to native cursor id
#[derive(Debug, Clone, Default)]
pub struct CursorCache {
    cursors: HashMap<CursorKind, Cursor>,
}

impl CursorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: CursorKind, cursor: Cursor) {
        self.cursors.insert(kind, cursor);
    }

    pub fn get(&self, kind: CursorKind) -> Option<Cursor> {
        self.cursors.get(&kind).copied()
    }

    /// Create every cursor the core cursor font provides
    pub fn load(conn: &RustConnection) -> Result<Self, ReplyOrIdError> {
        let font = conn.generate_id()?;
        conn.open_font(font, b"cursor")?;

        let mut cache = Self::new();
        for kind in CursorKind::ALL {
            let Some(glyph) = kind.glyph() else {
                debug!("No font glyph for cursor {:?}", kind);
                continue;
            };
            let cursor = conn.generate_id()?;
            let created = conn.create_glyph_cursor(
                cursor,
                font,
                font,
                glyph,
                glyph + 1,
                0, 0, 0,
                0xffff, 0xffff, 0xffff,
            );
            match created {
                Ok(_) => cache.insert(kind, cursor),
                Err(e) => warn!("Failed to create cursor {:?}: {}", kind, e),
            }
        }

        conn.close_font(font)?;
        Ok(cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_lookup() {
        let mut cache = CursorCache::new();
        cache.insert(CursorKind::Text, 0x40_0001);
        assert_eq!(cache.get(CursorKind::Text), Some(0x40_0001));
        assert_eq!(cache.get(CursorKind::Wait), None);
    }

    #[test]
    fn test_glyph_mask_pairs_are_even() {
        for kind in CursorKind::ALL {
            if let Some(glyph) = kind.glyph() {
                assert_eq!(glyph % 2, 0, "{:?}", kind);
            }
        }
    }
}
