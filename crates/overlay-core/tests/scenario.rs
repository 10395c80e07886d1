//! A drag on the interaction side flowing through to the render side.

mod common;

use core::cell::RefCell;
use std::collections::VecDeque;

use common::{DISPLAY, FakeRenderer, FakeSource, MONITOR, RenderEvent, initial_channel};
use overlay_core::{
    CaptureLoop, CaptureRegion, DragOutcome, KeyBindings, Point, RegionDrag, Size, Transform,
    WindowRect, geometry::DEFAULT_REFERENCE_SIZE,
};

fn scripted_cursor(samples: &[Point]) -> impl Fn() -> Option<Point> + use<> {
    let samples: RefCell<VecDeque<Point>> = RefCell::new(samples.iter().copied().collect());
    move || samples.borrow_mut().pop_front()
}

#[test]
fn plain_drag_moves_the_capture_region() {
    let (publisher, subscriber) = initial_channel();
    let keys = KeyBindings::default();

    let mut drag = RegionDrag::new(
        scripted_cursor(&[Point::new(0, 0), Point::new(400, 300)]),
        publisher,
        keys,
        MONITOR,
        DEFAULT_REFERENCE_SIZE,
        WindowRect::centred(MONITOR, DISPLAY),
    );
    let mut capture_loop = CaptureLoop::new(
        FakeSource::default(),
        FakeRenderer::default(),
        subscriber,
        core::time::Duration::ZERO,
    );

    capture_loop.step().unwrap();
    let initial = capture_loop.renderer().copies()[0].1;
    assert_eq!(
        initial,
        CaptureRegion {
            left: 1720,
            top: 880,
            right: 1920,
            bottom: 1080
        }
    );
    assert_eq!(
        capture_loop.renderer().uploads(),
        vec![Transform {
            x: 200.0 / 1280.0,
            y: 200.0 / 1024.0
        }]
    );

    drag.handle_key(keys.drag, true);
    let outcome = drag.handle_key(keys.drag, false);

    let region = CaptureRegion {
        left: 0,
        top: 0,
        right: 400,
        bottom: 300,
    };
    let transform = Transform {
        x: 400.0 / 1280.0,
        y: 300.0 / 1024.0,
    };
    assert_eq!(
        outcome,
        DragOutcome::RegionChanged {
            region,
            transform,
            version: 1
        }
    );

    capture_loop.step().unwrap();

    let renderer = capture_loop.renderer();
    assert_eq!(renderer.copies()[1].1, region);
    assert_eq!(renderer.uploads()[1], transform);
    assert_eq!(capture_loop.applied_version(), Some(1));
}

#[test]
fn modifier_drag_moves_the_window() {
    let (publisher, subscriber) = initial_channel();
    let keys = KeyBindings::default();
    let before = subscriber.snapshot();

    let mut drag = RegionDrag::new(
        scripted_cursor(&[Point::new(0, 0), Point::new(400, 300)]),
        publisher,
        keys,
        MONITOR,
        DEFAULT_REFERENCE_SIZE,
        WindowRect::centred(MONITOR, DISPLAY),
    );
    let mut capture_loop = CaptureLoop::new(
        FakeSource::default(),
        FakeRenderer::default(),
        subscriber,
        core::time::Duration::ZERO,
    );
    capture_loop.step().unwrap();

    drag.handle_key(keys.modifier, true);
    drag.handle_key(keys.drag, true);
    let outcome = drag.handle_key(keys.drag, false);

    let window = WindowRect {
        position: Point::new(0, 0),
        size: Size::new(400, 300),
    };
    assert_eq!(outcome, DragOutcome::WindowChanged(window));
    assert_eq!(drag.window(), window);
    assert_eq!(drag.publisher().snapshot(), before);

    capture_loop.step().unwrap();

    let renderer = capture_loop.renderer();
    assert_eq!(renderer.viewports(), vec![DISPLAY, Size::new(400, 300)]);
    assert_eq!(renderer.uploads().len(), 1);
    assert_eq!(renderer.copies()[1].1, before.region);
    assert_eq!(renderer.count(RenderEvent::Present), 2);
    assert_eq!(capture_loop.applied_version(), Some(0));
}
