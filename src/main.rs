//! area-window demo
//!
//! Opens one window, paints it, and logs the events it receives.
//! Escape or the window manager's close button ends the program.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use x11rb::rust_connection::RustConnection;

use area_window::{
    Color, Config, Display, DrawOp, Event, KeyCode, KeyDirection, Rect, Session, Stage, Window,
    X11EventStream,
};

/// Background plus a centered accent block
fn paint(window: &Window<RustConnection>, size: (i32, i32), config: &Config) -> Result<()> {
    let (w, h) = size;
    window.fill(
        Rect::new(0, 0, w, h),
        Color::from_hex(config.window.background),
        DrawOp::Src,
    )?;
    window.fill(
        Rect::new(w / 4, h / 4, w - w / 4, h - h / 4),
        Color::from_hex(config.window.accent),
        DrawOp::Over,
    )?;
    window.publish()?;
    Ok(())
}

async fn consume(
    display: Arc<Display<RustConnection>>,
    window: Arc<Window<RustConnection>>,
    config: Config,
) {
    let mut size = (i32::from(config.window.width), i32::from(config.window.height));

    while let Some(event) = window.next_event().await {
        match event {
            Event::Size(e) => {
                info!(
                    "Size {}x{} px ({:.1}x{:.1} pt)",
                    e.width_px, e.height_px, e.width_pt, e.height_pt
                );
                size = (e.width_px, e.height_px);
            }
            Event::Paint => {
                // publish waits on a round trip
                let result = tokio::task::block_in_place(|| paint(&window, size, &config));
                if let Err(e) = result {
                    warn!("Paint failed: {:#}", e);
                }
            }
            Event::Key(k) => {
                debug!("Key {:?} {:?} rune={:?} mods={:?}", k.direction, k.code, k.rune, k.modifiers);
                if k.code == KeyCode::Escape && k.direction == KeyDirection::Press {
                    info!("Escape pressed, closing window");
                    display.release_window(window.id());
                }
            }
            Event::Mouse(m) => {
                debug!("Mouse {:?} {:?} at ({}, {})", m.direction, m.button, m.x, m.y);
            }
            Event::Lifecycle(l) => {
                info!("Lifecycle {:?} -> {:?}", l.from, l.to);
                if l.to == Stage::Dead {
                    display.release_window(window.id());
                }
            }
        }
    }
    debug!("Event queue for window {:#x} closed", window.id());
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {:#}", e);
        Config::default()
    });

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.filter.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting area-window");

    let (conn, screen_num) =
        x11rb::connect(config.display.name.as_deref()).context("Failed to connect to X server")?;
    let conn = Arc::new(conn);
    info!("Connected to X server, screen {}", screen_num);

    let session = Session::connect(conn.clone(), screen_num, config.display.pixels_per_pt)
        .context("Failed to initialize X11 session")?;
    info!(
        "Screen {}x{} px, {:.2} px/pt",
        session.screen.width_px, session.screen.height_px, session.screen.pixels_per_pt
    );
    let display = Arc::new(Display::new(Arc::new(session)));

    let window = display
        .new_window(&config.window.to_options())
        .context("Failed to create window")?;
    info!("Created window {:#x}", window.id());

    let consumer = tokio::spawn(consume(display.clone(), window, config));
    let stream = X11EventStream::new(conn)?;

    // Setup signal handlers for graceful shutdown
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let tx = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    let _ = tx.send(()).await;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    let _ = tx.send(()).await;
                }
            }
        });
    }

    tokio::select! {
        result = stream.run(&display) => {
            if let Err(e) = result {
                error!("Event loop error: {:#}", e);
                display.release_all();
                return Err(e);
            }
        }
        _ = shutdown_rx.recv() => {
            info!("Shutdown signal received, cleaning up...");
        }
    }

    display.release_all();
    if let Err(e) = consumer.await {
        warn!("Event consumer task failed: {}", e);
    }

    info!("area-window exited");
    Ok(())
}
