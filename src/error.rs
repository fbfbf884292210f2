//! Error types for window operations

use thiserror::Error;
use x11rb::errors::{ConnectionError, ReplyError, ReplyOrIdError};

/// Failure reported by a drawing or window operation
#[derive(Debug, Error)]
pub enum WindowError {
    /// The connection to the X server failed while sending a request
    #[error("X11 connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// A checked request or a request/reply pair came back with an error
    #[error("X11 request failed: {0}")]
    Reply(#[from] ReplyError),

    /// Allocating a resource id or creating a resource failed
    #[error("X11 resource allocation failed: {0}")]
    Id(#[from] ReplyOrIdError),

    /// The RENDER extension has no picture format for the root visual
    #[error("no RENDER picture format for visual {0:#x}")]
    NoPictFormat(u32),

    /// The connection setup lists no screen with this number
    #[error("X11 screen {0} does not exist")]
    NoScreen(usize),

    /// The window has already been released
    #[error("window {0} has been released")]
    Closed(u32),
}

pub type Result<T, E = WindowError> = std::result::Result<T, E>;
