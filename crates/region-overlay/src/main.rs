//! # Region Overlay
//! Mirrors a region of the primary monitor into a small click-through overlay window.
//!

#![allow(clippy::std_instead_of_alloc)]
// hide console window on Windows in release
#![cfg_attr(feature = "hide-console", windows_subsystem = "windows")]

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use config::{Config, config_dir};
use logger::setup_logger;
use tracing::{info, info_span};

#[cfg(windows)]
mod app;
mod config;
mod logger;
#[cfg(windows)]
mod render_thread;
#[cfg(windows)]
mod utilities;

/// The Cargo package version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// If this instance should have debug enabled.
pub fn should_debug() -> bool {
    std::env::args().any(|arg| arg.eq("--debug"))
}

fn main() {
    let _logger_guards = setup_logger(should_debug(), config_dir().as_deref());

    let _span = info_span!("[Main Thread]").entered();
    info!("Region Overlay v{}", VERSION);

    let config = Config::load();

    run(config);
}

#[cfg(windows)]
fn run(config: Config) {
    use desktop_duplication::Monitor;
    use utilities::failure::Failure;
    use winit::event_loop::{ControlFlow, DeviceEvents, EventLoop};

    let event_loop = EventLoop::new().report_fatal("Creating the event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    // Creating the event loop makes the process DPI aware, before that the monitor reports its
    // scaled size rather than the desktop pixels the duplication and cursor use.
    let monitor = Monitor::primary();

    // The overlay never has focus, the drag keys must be seen regardless.
    event_loop.listen_device_events(DeviceEvents::Always);

    let mut app = app::App::new(config, monitor.size);
    event_loop
        .run_app(&mut app)
        .report_fatal("Running the event loop");
}

#[cfg(not(windows))]
fn run(_config: Config) {
    tracing::error!("Region Overlay requires the Windows desktop duplication API");
    std::process::exit(1);
}
