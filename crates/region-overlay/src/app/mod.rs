mod input;
mod window;

use std::thread::JoinHandle;

use desktop_duplication::{SendHWND, cursor_position};
use overlay_core::{
    CaptureRegion, DragOutcome, Point, RegionDrag, Size, Transform, WindowRect, shared::channel,
};
use tracing::{debug, info};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, RawKeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::{config::Config, render_thread, utilities::failure::Failure};

type CursorFn = fn() -> Option<Point>;

/// The interaction thread's application.
pub struct App {
    config: Config,
    monitor: Size,
    active: Option<ActiveApp>,
}

struct ActiveApp {
    window: Window,
    drag: RegionDrag<CursorFn>,
    _render_thread: JoinHandle<()>,
}

impl App {
    /// An app that creates its window when the event loop resumes.
    pub fn new(config: Config, monitor: Size) -> Self {
        Self {
            config,
            monitor,
            active: None,
        }
    }

    fn activate(&self, event_loop: &ActiveEventLoop) -> ActiveApp {
        let display_size = self.config.display_size();
        let reference = self.config.reference_size();

        let bounds = WindowRect::centred(self.monitor, display_size);
        let window = window::create_window(event_loop, bounds).report_fatal("Creating the window");
        window
            .set_cursor_hittest(false)
            .report_fatal("Making the window click-through");

        let hwnd = window::hwnd(&window).report_fatal("Retrieving the window handle");

        let region = CaptureRegion::bottom_right(self.monitor, display_size);
        let transform = Transform::for_region(&region, reference);
        let (publisher, subscriber) = channel(region, transform, bounds.size);
        info!("Capturing {region:?} into {bounds:?}");

        let render_thread =
            render_thread::spawn(SendHWND(hwnd), self.monitor, subscriber, self.config);

        let drag = RegionDrag::new(
            cursor_position as CursorFn,
            publisher,
            self.config.key_bindings(),
            self.monitor,
            reference,
            bounds,
        );

        ActiveApp {
            window,
            drag,
            _render_thread: render_thread,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.active.is_none() {
            self.active = Some(self.activate(event_loop));
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        if matches!(event, WindowEvent::CloseRequested) {
            info!("Window closed, exiting");
            event_loop.exit();
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: DeviceId, event: DeviceEvent) {
        let DeviceEvent::Key(RawKeyEvent {
            physical_key,
            state,
        }) = event
        else {
            return;
        };

        let Some(active) = self.active.as_mut() else {
            return;
        };

        let Some(scan_code) = input::scan_code(physical_key) else {
            return;
        };

        match active.drag.handle_key(scan_code, state.is_pressed()) {
            DragOutcome::WindowChanged(bounds) => window::apply_bounds(&active.window, bounds),
            DragOutcome::Ignored => {}
            outcome => debug!("{outcome:?}"),
        }
    }
}
