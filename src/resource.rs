//! Native resource ownership
//!
//! A window owns three server-side resources. They are freed exactly once,
//! in the order picture, GC, window.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};
use x11rb::protocol::render::Picture;
use x11rb::protocol::xproto::{Gcontext, Window};

use crate::conn::XConnection;

/// Server-assigned ids of one window's resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeHandles {
    pub window: Window,
    pub gc: Gcontext,
    pub picture: Picture,
}

#[derive(Debug)]
pub struct ResourceHandle {
    handles: NativeHandles,
    released: AtomicBool,
}

impl ResourceHandle {
    pub fn new(handles: NativeHandles) -> Self {
        Self {
            handles,
            released: AtomicBool::new(false),
        }
    }

    pub fn handles(&self) -> NativeHandles {
        self.handles
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Free the native resources.
    ///
    /// Only the first caller performs the frees and gets `true`; every
    /// later or concurrent caller gets `false` and sends nothing.
    pub fn release<C: XConnection + ?Sized>(&self, conn: &C) -> bool {
        if self.released.swap(true, Ordering::SeqCst) {
            return false;
        }

        let NativeHandles { window, gc, picture } = self.handles;
        debug!("Freeing picture {:#x}, gc {:#x}, window {:#x}", picture, gc, window);
        if let Err(e) = conn.free_picture(picture) {
            warn!("Failed to free picture {:#x}: {}", picture, e);
        }
        if let Err(e) = conn.free_gc(gc) {
            warn!("Failed to free gc {:#x}: {}", gc, e);
        }
        if let Err(e) = conn.destroy_window(window) {
            warn!("Failed to destroy window {:#x}: {}", window, e);
        }
        if let Err(e) = conn.flush() {
            warn!("Failed to flush after releasing window {:#x}: {}", window, e);
        }
        true
    }

    /// Mark the resources gone without freeing them, for when the server
    /// destroyed the window itself. Returns `true` for the first caller,
    /// like [`release`](Self::release).
    pub fn forget(&self) -> bool {
        !self.released.swap(true, Ordering::SeqCst)
    }
}
