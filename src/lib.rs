//! Area Window
//!
//! Per-window adapter over an X11 connection. A [`Display`] creates windows
//! and routes the connection's events to them; each [`Window`] turns those
//! events into [`Event`]s on its own queue and exposes drawing, title,
//! cursor, pointer warp, raise and position requests.

pub mod config;
pub mod conn;
pub mod cursor;
pub mod display;
pub mod drawer;
pub mod error;
pub mod event;
pub mod geom;
pub mod keys;
pub mod lifecycle;
pub mod ops;
pub mod resource;
pub mod session;
pub mod surface;
pub mod window;
pub mod x11_async;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use conn::XConnection;
pub use cursor::CursorKind;
pub use display::{Display, WindowOptions};
pub use error::{Result, WindowError};
pub use event::{
    Event, EventQueue, KeyDirection, KeyEvent, LifecycleEvent, MouseButton, MouseDirection,
    MouseEvent, SizeEvent,
};
pub use geom::{Aff3, Color, DrawOp, DrawOptions, Point, Rect};
pub use keys::{KeyCode, Modifiers};
pub use lifecycle::Stage;
pub use session::Session;
pub use surface::{Buffer, DrawTarget, Drawer, PublishResult, Texture};
pub use window::Window;
pub use x11_async::X11EventStream;
