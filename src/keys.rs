//! Keyboard Module
//!
//! Keysym table lookups and modifier decoding for key and button events.

use bitflags::bitflags;
use x11rb::protocol::xproto::{GetKeyboardMappingReply, KeyButMask, Keysym};

bitflags! {
    /// Modifier keys held during an input event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
    }
}

impl Modifiers {
    /// Decode the X11 event `state` field
    pub fn from_x11_state(state: u16) -> Self {
        let mut m = Modifiers::empty();
        if state & u16::from(KeyButMask::SHIFT) != 0 {
            m |= Modifiers::SHIFT;
        }
        if state & u16::from(KeyButMask::CONTROL) != 0 {
            m |= Modifiers::CONTROL;
        }
        if state & u16::from(KeyButMask::MOD1) != 0 {
            m |= Modifiers::ALT;
        }
        if state & u16::from(KeyButMask::MOD4) != 0 {
            m |= Modifiers::META;
        }
        m
    }
}

/// Physical key identity, independent of shift state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Unknown,
    /// Letter key, `'A'..='Z'`
    Letter(char),
    /// Digit key on the main block, `'0'..='9'`
    Digit(char),
    Return,
    Escape,
    Backspace,
    Tab,
    Space,
    Minus,
    Equal,
    LeftBracket,
    RightBracket,
    Backslash,
    Semicolon,
    Apostrophe,
    GraveAccent,
    Comma,
    Period,
    Slash,
    CapsLock,
    /// Function key `F1..=F24`
    F(u8),
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Left,
    Right,
    Up,
    Down,
    KeypadEnter,
    LeftShift,
    RightShift,
    LeftControl,
    RightControl,
    LeftAlt,
    RightAlt,
    LeftMeta,
    RightMeta,
}

// Keysym values, from X11/keysymdef.h
const XK_BACKSPACE: Keysym = 0xff08;
const XK_TAB: Keysym = 0xff09;
const XK_RETURN: Keysym = 0xff0d;
const XK_ESCAPE: Keysym = 0xff1b;
const XK_HOME: Keysym = 0xff50;
const XK_LEFT: Keysym = 0xff51;
const XK_UP: Keysym = 0xff52;
const XK_RIGHT: Keysym = 0xff53;
const XK_DOWN: Keysym = 0xff54;
const XK_PAGE_UP: Keysym = 0xff55;
const XK_PAGE_DOWN: Keysym = 0xff56;
const XK_END: Keysym = 0xff57;
const XK_INSERT: Keysym = 0xff63;
const XK_KP_ENTER: Keysym = 0xff8d;
const XK_F1: Keysym = 0xffbe;
const XK_F24: Keysym = 0xffd5;
const XK_SHIFT_L: Keysym = 0xffe1;
const XK_SHIFT_R: Keysym = 0xffe2;
const XK_CONTROL_L: Keysym = 0xffe3;
const XK_CONTROL_R: Keysym = 0xffe4;
const XK_CAPS_LOCK: Keysym = 0xffe5;
const XK_ALT_L: Keysym = 0xffe9;
const XK_ALT_R: Keysym = 0xffea;
const XK_SUPER_L: Keysym = 0xffeb;
const XK_SUPER_R: Keysym = 0xffec;
const XK_DELETE: Keysym = 0xffff;

/// Keysyms with the top byte set to this carry a Unicode code point
const UNICODE_KEYSYM: Keysym = 0x0100_0000;

/// Keycode → keysym table read from the server at session start
#[derive(Debug, Clone, Default)]
pub struct KeysymTable {
    min_keycode: u8,
    per_keycode: usize,
    keysyms: Vec<Keysym>,
}

impl KeysymTable {
    /// Build from a `GetKeyboardMapping` reply that started at `min_keycode`
    pub fn from_reply(min_keycode: u8, reply: &GetKeyboardMappingReply) -> Self {
        Self::new(
            min_keycode,
            reply.keysyms_per_keycode as usize,
            reply.keysyms.clone(),
        )
    }

    pub fn new(min_keycode: u8, per_keycode: usize, keysyms: Vec<Keysym>) -> Self {
        Self {
            min_keycode,
            per_keycode,
            keysyms,
        }
    }

    fn column(&self, keycode: u8, col: usize) -> Keysym {
        if col >= self.per_keycode || keycode < self.min_keycode {
            return 0;
        }
        let idx = (keycode - self.min_keycode) as usize * self.per_keycode + col;
        self.keysyms.get(idx).copied().unwrap_or(0)
    }

    /// Resolve a keycode and modifier state to a rune and key code.
    ///
    /// The code is taken from the unshifted keysym so it does not depend on
    /// shift. The rune follows shift (column 1, falling back to column 0
    /// when empty) and caps lock upper-cases letters.
    pub fn lookup(&self, keycode: u8, state: u16) -> (Option<char>, KeyCode) {
        let unshifted = self.column(keycode, 0);
        let mut sym = unshifted;
        if state & u16::from(KeyButMask::SHIFT) != 0 {
            let shifted = self.column(keycode, 1);
            if shifted != 0 {
                sym = shifted;
            }
        }

        let code = keysym_code(unshifted);
        let mut rune = keysym_rune(sym);
        if state & u16::from(KeyButMask::LOCK) != 0 {
            rune = rune.map(|c| c.to_uppercase().next().unwrap_or(c));
        }
        (rune, code)
    }
}

/// Character produced by a keysym, if it is printable or a control key with
/// a conventional ASCII meaning
fn keysym_rune(sym: Keysym) -> Option<char> {
    match sym {
        0x20..=0x7e | 0xa0..=0xff => char::from_u32(sym),
        s if s & 0xff00_0000 == UNICODE_KEYSYM => char::from_u32(s & 0x00ff_ffff),
        XK_BACKSPACE => Some('\u{8}'),
        XK_TAB => Some('\t'),
        XK_RETURN | XK_KP_ENTER => Some('\r'),
        XK_ESCAPE => Some('\u{1b}'),
        XK_DELETE => Some('\u{7f}'),
        _ => None,
    }
}

fn keysym_code(sym: Keysym) -> KeyCode {
    match sym {
        0x61..=0x7a => KeyCode::Letter((sym as u8 - 0x20) as char),
        0x41..=0x5a => KeyCode::Letter(sym as u8 as char),
        0x30..=0x39 => KeyCode::Digit(sym as u8 as char),
        0x20 => KeyCode::Space,
        0x2d => KeyCode::Minus,
        0x3d => KeyCode::Equal,
        0x5b => KeyCode::LeftBracket,
        0x5d => KeyCode::RightBracket,
        0x5c => KeyCode::Backslash,
        0x3b => KeyCode::Semicolon,
        0x27 => KeyCode::Apostrophe,
        0x60 => KeyCode::GraveAccent,
        0x2c => KeyCode::Comma,
        0x2e => KeyCode::Period,
        0x2f => KeyCode::Slash,
        XK_BACKSPACE => KeyCode::Backspace,
        XK_TAB => KeyCode::Tab,
        XK_RETURN => KeyCode::Return,
        XK_ESCAPE => KeyCode::Escape,
        XK_HOME => KeyCode::Home,
        XK_LEFT => KeyCode::Left,
        XK_UP => KeyCode::Up,
        XK_RIGHT => KeyCode::Right,
        XK_DOWN => KeyCode::Down,
        XK_PAGE_UP => KeyCode::PageUp,
        XK_PAGE_DOWN => KeyCode::PageDown,
        XK_END => KeyCode::End,
        XK_INSERT => KeyCode::Insert,
        XK_DELETE => KeyCode::Delete,
        XK_KP_ENTER => KeyCode::KeypadEnter,
        XK_F1..=XK_F24 => KeyCode::F((sym - XK_F1 + 1) as u8),
        XK_SHIFT_L => KeyCode::LeftShift,
        XK_SHIFT_R => KeyCode::RightShift,
        XK_CONTROL_L => KeyCode::LeftControl,
        XK_CONTROL_R => KeyCode::RightControl,
        XK_CAPS_LOCK => KeyCode::CapsLock,
        XK_ALT_L => KeyCode::LeftAlt,
        XK_ALT_R => KeyCode::RightAlt,
        XK_SUPER_L => KeyCode::LeftMeta,
        XK_SUPER_R => KeyCode::RightMeta,
        _ => KeyCode::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIFT: u16 = 1;
    const LOCK: u16 = 2;

    /// keycode 10 = a/A, 11 = 1/!, 12 = Escape, 13 = F5
    fn table() -> KeysymTable {
        KeysymTable::new(
            10,
            2,
            vec![0x61, 0x41, 0x31, 0x21, XK_ESCAPE, 0, XK_F1 + 4, 0],
        )
    }

    #[test]
    fn test_lookup_letter_follows_shift_and_lock() {
        let t = table();
        assert_eq!(t.lookup(10, 0), (Some('a'), KeyCode::Letter('A')));
        assert_eq!(t.lookup(10, SHIFT), (Some('A'), KeyCode::Letter('A')));
        assert_eq!(t.lookup(10, LOCK), (Some('A'), KeyCode::Letter('A')));
    }

    #[test]
    fn test_lookup_code_independent_of_shift() {
        let t = table();
        assert_eq!(t.lookup(11, 0), (Some('1'), KeyCode::Digit('1')));
        assert_eq!(t.lookup(11, SHIFT), (Some('!'), KeyCode::Digit('1')));
    }

    #[test]
    fn test_lookup_empty_shift_column_falls_back() {
        let t = table();
        assert_eq!(t.lookup(12, SHIFT), (Some('\u{1b}'), KeyCode::Escape));
        assert_eq!(t.lookup(13, 0), (None, KeyCode::F(5)));
    }

    #[test]
    fn test_lookup_out_of_range() {
        let t = table();
        assert_eq!(t.lookup(9, 0), (None, KeyCode::Unknown));
        assert_eq!(t.lookup(200, 0), (None, KeyCode::Unknown));
    }

    #[test]
    fn test_modifiers_from_state() {
        let state = u16::from(KeyButMask::SHIFT | KeyButMask::MOD4);
        assert_eq!(Modifiers::from_x11_state(state), Modifiers::SHIFT | Modifiers::META);
        assert_eq!(Modifiers::from_x11_state(0), Modifiers::empty());
    }
}
