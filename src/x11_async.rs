//! X11 Async Event Stream
//!
//! The connection read path. A blocking task polls the X11 socket with mio
//! and wakes the async side through a [`Notify`]; the async side drains
//! every queued event into the [`Display`] in arrival order.

use std::os::unix::io::AsRawFd;
use std::sync::Arc;
use std::time::Duration;
use anyhow::{Context, Result};
use tokio::sync::{Notify, oneshot};
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::rust_connection::RustConnection;

use crate::display::Display;

const POLL_TIMEOUT: Duration = Duration::from_millis(100);
/// How long a key release waits for the press that would make it a repeat
const REPEAT_GRACE: Duration = Duration::from_millis(5);

/// How long the read loop may sleep before the next pump
fn idle_timeout<C: crate::conn::XConnection>(display: &Display<C>) -> Duration {
    if display.has_pending_key() {
        REPEAT_GRACE
    } else {
        POLL_TIMEOUT
    }
}

/// X11 event stream with async readiness notification
pub struct X11EventStream {
    conn: Arc<RustConnection>,
    readable: Arc<Notify>,
    /// Dropping this stops the polling task
    _shutdown: oneshot::Receiver<()>,
}

impl X11EventStream {
    /// Register the connection's socket with mio and start the polling task
    pub fn new(conn: Arc<RustConnection>) -> Result<Self> {
        let fd = conn.stream().as_raw_fd();
        let readable = Arc::new(Notify::new());
        let task_readable = readable.clone();

        let (alive, shutdown) = oneshot::channel::<()>();
        let mut poll = mio::Poll::new().context("Failed to create mio Poll")?;
        let mut events = mio::Events::with_capacity(1);
        poll.registry()
            .register(
                &mut mio::unix::SourceFd(&fd),
                mio::Token(0),
                mio::Interest::READABLE,
            )
            .context("Failed to register X11 socket with mio")?;

        tokio::task::spawn_blocking(move || loop {
            if alive.is_closed() {
                info!("X11 socket polling task shutting down");
                return;
            }
            if let Err(err) = poll.poll(&mut events, Some(POLL_TIMEOUT)) {
                warn!("X11 socket poll failed: {:?}", err);
                continue;
            }
            if events.iter().any(|event| event.token() == mio::Token(0)) {
                task_readable.notify_one();
            }
        });

        Ok(Self {
            conn,
            readable,
            _shutdown: shutdown,
        })
    }

    /// Drain every event already read from the socket into `display`.
    ///
    /// Returns the number of events routed. Pending requests are flushed
    /// first so replies and errors for them can arrive. A trailing key
    /// release stays held in the display; see [`run`](Self::run).
    pub fn pump(&self, display: &Display<RustConnection>) -> Result<usize> {
        self.conn.flush().context("Failed to flush X11 requests")?;

        let mut routed = 0;
        while let Some(event) = self
            .conn
            .poll_for_event()
            .context("X11 connection lost")?
        {
            display.handle_event(&event);
            routed += 1;
        }

        if routed > 0 {
            debug!("Routed {} X11 event(s)", routed);
        }
        Ok(routed)
    }

    /// Wait until the socket becomes readable
    pub async fn wait_readable(&self) {
        self.readable.notified().await;
    }

    /// Read loop: pump, then sleep until the socket is readable again.
    /// Returns when the display has no windows left or the connection fails.
    ///
    /// A held key release is emitted once a wait times out without the
    /// matching autorepeat press showing up.
    pub async fn run(&self, display: &Display<RustConnection>) -> Result<()> {
        loop {
            self.pump(display)?;
            if display.window_count() == 0 {
                display.flush_pending_key();
                info!("No windows left, stopping event loop");
                return Ok(());
            }
            // Threads waiting on replies can pull events into the
            // connection's buffer without the socket turning readable again
            tokio::select! {
                _ = self.wait_readable() => {}
                _ = tokio::time::sleep(idle_timeout(display)) => {
                    self.pump(display)?;
                    display.flush_pending_key();
                }
            }
        }
    }
}
