//! Scriptable stand-ins for the duplication facility and the GPU.

#![allow(dead_code, missing_docs)]

use core::{cell::Cell, time::Duration};
use std::{collections::VecDeque, rc::Rc};

use overlay_core::{
    BindError, CaptureLoop, CaptureRegion, CaptureSource, FrameError, OverlayRenderer,
    PresentError, SessionError, Size, Subscriber, Transform,
    geometry::DEFAULT_REFERENCE_SIZE,
    shared::{Publisher, channel},
};
use thiserror::Error;

pub const MONITOR: Size = Size::new(1920, 1080);
pub const DISPLAY: Size = Size::new(200, 200);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("fake failure in {0}")]
pub struct FakeError(pub &'static str);

pub struct FakeSession {
    pub id: u32,
    released: Rc<Cell<u32>>,
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeFrame {
    pub number: u32,
    pub session: u32,
}

/// Every call succeeds unless a result was queued for it.
#[derive(Default)]
pub struct FakeSource {
    pub bind_results: VecDeque<Result<(), BindError<FakeError>>>,
    pub acquire_results: VecDeque<Result<(), FrameError<FakeError>>>,
    pub release_results: VecDeque<Result<(), SessionError<FakeError>>>,

    /// The device each successful bind was made against.
    pub bound_devices: Vec<u32>,
    pub bind_attempts: u32,
    pub frames_acquired: u32,
    pub frames_released: u32,

    /// Number of sessions that have been dropped.
    pub sessions_released: Rc<Cell<u32>>,
}

impl CaptureSource for FakeSource {
    type Device = u32;
    type Session = FakeSession;
    type Frame = FakeFrame;
    type Error = FakeError;

    fn bind(&mut self, device: &u32) -> Result<FakeSession, BindError<FakeError>> {
        self.bind_attempts += 1;
        self.bind_results.pop_front().unwrap_or(Ok(()))?;

        self.bound_devices.push(*device);
        Ok(FakeSession {
            id: self.bound_devices.len() as u32,
            released: Rc::clone(&self.sessions_released),
        })
    }

    fn acquire_next_frame(
        &mut self,
        session: &mut FakeSession,
    ) -> Result<FakeFrame, FrameError<FakeError>> {
        self.acquire_results.pop_front().unwrap_or(Ok(()))?;

        self.frames_acquired += 1;
        Ok(FakeFrame {
            number: self.frames_acquired,
            session: session.id,
        })
    }

    fn release_frame(&mut self, _session: &mut FakeSession) -> Result<(), SessionError<FakeError>> {
        self.release_results.pop_front().unwrap_or(Ok(()))?;

        self.frames_released += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderEvent {
    Copy { frame: FakeFrame, region: CaptureRegion },
    Upload(Transform),
    Viewport(Size),
    Draw,
    Present,
    Rebuild,
}

/// Records every call, every call succeeds unless a result was queued for it.
#[derive(Default)]
pub struct FakeRenderer {
    pub device: u32,
    pub events: Vec<RenderEvent>,

    pub upload_results: VecDeque<Result<(), FakeError>>,
    pub present_results: VecDeque<Result<(), PresentError<FakeError>>>,
    pub rebuild_results: VecDeque<Result<(), FakeError>>,
}

impl FakeRenderer {
    pub fn uploads(&self) -> Vec<Transform> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RenderEvent::Upload(transform) => Some(*transform),
                _ => None,
            })
            .collect()
    }

    pub fn viewports(&self) -> Vec<Size> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RenderEvent::Viewport(size) => Some(*size),
                _ => None,
            })
            .collect()
    }

    pub fn copies(&self) -> Vec<(FakeFrame, CaptureRegion)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RenderEvent::Copy { frame, region } => Some((*frame, *region)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: RenderEvent) -> usize {
        self.events.iter().filter(|event| **event == wanted).count()
    }
}

impl OverlayRenderer for FakeRenderer {
    type Device = u32;
    type Frame = FakeFrame;
    type Error = FakeError;

    fn device(&self) -> &u32 {
        &self.device
    }

    fn copy_region(&mut self, frame: &FakeFrame, region: CaptureRegion) {
        self.events.push(RenderEvent::Copy {
            frame: *frame,
            region,
        });
    }

    fn upload_transform(&mut self, transform: Transform) -> Result<(), FakeError> {
        self.upload_results.pop_front().unwrap_or(Ok(()))?;
        self.events.push(RenderEvent::Upload(transform));
        Ok(())
    }

    fn set_viewport(&mut self, size: Size) {
        self.events.push(RenderEvent::Viewport(size));
    }

    fn draw(&mut self) {
        self.events.push(RenderEvent::Draw);
    }

    fn present(&mut self) -> Result<(), PresentError<FakeError>> {
        self.present_results.pop_front().unwrap_or(Ok(()))?;
        self.events.push(RenderEvent::Present);
        Ok(())
    }

    fn rebuild(&mut self) -> Result<(), FakeError> {
        self.rebuild_results.pop_front().unwrap_or(Ok(()))?;
        self.device += 1;
        self.events.push(RenderEvent::Rebuild);
        Ok(())
    }
}

pub type FakeLoop = CaptureLoop<FakeSource, FakeRenderer>;

/// The initial shared state of the overlay: the bottom-right display-sized square.
pub fn initial_channel() -> (Publisher, Subscriber) {
    let region = CaptureRegion::bottom_right(MONITOR, DISPLAY);
    let transform = Transform::for_region(&region, DEFAULT_REFERENCE_SIZE);

    channel(region, transform, DISPLAY)
}

pub fn fake_loop(source: FakeSource, renderer: FakeRenderer) -> (FakeLoop, Publisher) {
    fake_loop_with_backoff(source, renderer, Duration::ZERO)
}

pub fn fake_loop_with_backoff(
    source: FakeSource,
    renderer: FakeRenderer,
    backoff: Duration,
) -> (FakeLoop, Publisher) {
    let (publisher, subscriber) = initial_channel();
    let capture_loop = CaptureLoop::new(source, renderer, subscriber, backoff);

    (capture_loop, publisher)
}
