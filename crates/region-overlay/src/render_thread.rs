use std::thread::{self, JoinHandle};

use desktop_duplication::{DesktopDuplicator, SendHWND};
use overlay_core::{CaptureLoop, Size, Subscriber};
use overlay_renderer::Renderer;
use tracing::{info, info_span};

use crate::{
    config::Config,
    utilities::failure::{Failure, report_fatal},
};

/// Start the thread that owns every GPU and capture resource.
///
/// The thread only returns by exiting the process.
pub fn spawn(
    window: SendHWND,
    monitor: Size,
    subscriber: Subscriber,
    config: Config,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("Render".into())
        .spawn(move || run(window, monitor, subscriber, config))
        .report_fatal("Spawning the render thread")
}

fn run(window: SendHWND, monitor: Size, subscriber: Subscriber, config: Config) {
    let _span = info_span!("[Render]").entered();

    let renderer = Renderer::new(window.0, monitor).report_fatal("Creating the renderer");
    let duplicator = DesktopDuplicator::new(config.frame_timeout_ms);

    let capture_loop = CaptureLoop::new(
        duplicator,
        renderer,
        subscriber,
        config.access_denied_backoff(),
    );

    info!("Render loop started");
    let error = capture_loop.run();
    report_fatal(&error, error.operation());
}
