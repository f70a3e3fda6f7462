//! Gallery demo application
//!
//! This demonstrates backend resolution end to end: a software raster
//! backend and a stub GUI backend are registered, auto-detection picks the
//! first loadable candidate, and the chosen toolkit's canvas is driven once.

use plot_engine::prelude::*;
use std::sync::Arc;
use std::time::Duration;

/// Offscreen raster canvas. Rendering itself is outside the resolver's
/// scope, so the event loop just sleeps out its timeout.
struct RasterCanvas;

impl Canvas for RasterCanvas {
    fn start_event_loop(&mut self, timeout: Duration) {
        log::info!("raster canvas pumping events for {timeout:?}");
        std::thread::sleep(timeout);
    }
}

struct RasterWindowManager;

impl WindowManager for RasterWindowManager {
    fn show(&mut self) {
        log::info!("offscreen backend has no window to show");
    }

    fn destroy(&mut self) {
        log::info!("offscreen window manager destroyed");
    }
}

fn raster_backend() -> Arc<BackendHandle> {
    Arc::new(BackendHandle::new(
        "agg",
        env!("CARGO_PKG_VERSION"),
        || Box::new(RasterCanvas),
        || Box::new(RasterWindowManager),
    ))
}

fn main() -> Result<(), SelectError> {
    plot_engine::logging::init();

    log::info!("Creating toolkit registry...");
    let mut registry = StaticRegistry::new();
    registry.register("agg", || Ok(raster_backend()));
    // Stands in for a GUI toolkit whose native library is not installed
    registry.register("tkagg", || {
        Err(SelectError::Unavailable {
            backend: "tkagg".to_owned(),
            reason: "tk support is not compiled into this demo".to_owned(),
        })
    });

    log::info!("Resolving backend...");
    let prefs = MemoryPreferences::new(BackendPreference::Auto);
    let mut resolver = BackendResolver::new(
        Box::new(registry),
        Box::new(NoRunningFramework),
        Box::new(prefs),
    );

    let backend = resolver.current()?;
    log::info!(
        "selected backend {} version {}",
        backend.name(),
        backend.version()
    );

    let mut manager = backend.create_window_manager();
    manager.show();

    let mut canvas = backend.create_canvas();
    canvas.start_event_loop(Duration::from_millis(250));

    manager.destroy();
    log::info!("gallery demo complete");
    Ok(())
}
