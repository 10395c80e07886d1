//! The capture-render loop.
//!
//! Each iteration acquires a desktop frame, copies the published capture region into the display
//! texture, then draws and presents the overlay. Losing the duplication session or the GPU device
//! is recovered from inside the loop, anything else ends it with an [`Error`].

mod renderer;
mod source;

use core::time::Duration;
use std::thread;

use thiserror::Error;
use tracing::{debug, warn};
use utilities::PresentStats;

use crate::{geometry::Size, shared::Subscriber};

pub use renderer::{OverlayRenderer, PresentError};
pub use source::{BindError, CaptureSource, FrameError, SessionError};

/// How often present statistics are logged.
const STATS_INTERVAL: Duration = Duration::from_secs(10);

/// The duplication session's state.
#[derive(Debug)]
pub enum SessionState<S> {
    /// No session, the next iteration binds one.
    Unbound,

    /// A live session.
    Bound(S),
}

impl<S> SessionState<S> {
    /// Whether a session is live.
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }
}

/// What a single iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A frame was presented.
    Presented {
        /// Whether a fresh desktop frame was copied before drawing.
        fresh_frame: bool,
    },

    /// Binding was denied, the loop slept before the next attempt.
    BackedOff,

    /// The duplication session was lost, the next iteration rebinds.
    AccessLost,

    /// The GPU device was lost and every device resource was rebuilt.
    DeviceRebuilt,
}

/// A failure the loop can't recover from, the variants name the operation that failed.
#[derive(Debug, Error)]
pub enum Error<C, R> {
    /// Binding the duplication session.
    #[error("Failed to duplicate the output:\n{0}")]
    Bind(#[source] C),

    /// Acquiring a frame.
    #[error("Failed to acquire the next frame:\n{0}")]
    AcquireFrame(#[source] C),

    /// Releasing a frame.
    #[error("Failed to release the frame:\n{0}")]
    ReleaseFrame(#[source] C),

    /// Writing the transform.
    #[error("Failed to upload the transform:\n{0}")]
    UploadTransform(#[source] R),

    /// Presenting.
    #[error("Failed to present:\n{0}")]
    Present(#[source] R),

    /// Recreating the device after it was lost.
    #[error("Failed to rebuild the GPU device:\n{0}")]
    RebuildDevice(#[source] R),
}

impl<C, R> Error<C, R> {
    /// The name of the failing operation, suitable for reporting to the user.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Bind(_) => "DuplicateOutput",
            Self::AcquireFrame(_) => "AcquireNextFrame",
            Self::ReleaseFrame(_) => "ReleaseFrame",
            Self::UploadTransform(_) => "UploadTransform",
            Self::Present(_) => "Present",
            Self::RebuildDevice(_) => "RebuildDevice",
        }
    }
}

enum Capture {
    Copied,
    NoNewFrame,
    Interrupted(StepOutcome),
}

/// The render thread's loop, the sole owner of the capture session and the renderer.
pub struct CaptureLoop<S, R>
where
    S: CaptureSource,
    R: OverlayRenderer<Device = S::Device, Frame = S::Frame>,
{
    source: S,
    renderer: R,
    subscriber: Subscriber,

    session: SessionState<S::Session>,
    applied_version: Option<u64>,
    viewport: Option<Size>,

    access_denied_backoff: Duration,
    stats: PresentStats,
}

impl<S, R> CaptureLoop<S, R>
where
    S: CaptureSource,
    R: OverlayRenderer<Device = S::Device, Frame = S::Frame>,
{
    /// Create a loop with no session bound and nothing uploaded yet.
    pub fn new(
        source: S,
        renderer: R,
        subscriber: Subscriber,
        access_denied_backoff: Duration,
    ) -> Self {
        Self {
            source,
            renderer,
            subscriber,
            session: SessionState::Unbound,
            applied_version: None,
            viewport: None,
            access_denied_backoff,
            stats: PresentStats::new(STATS_INTERVAL),
        }
    }

    /// Run until an unrecoverable error occurs.
    pub fn run(mut self) -> Error<S::Error, R::Error> {
        loop {
            if let Err(error) = self.step() {
                return error;
            }
        }
    }

    /// Run one iteration.
    pub fn step(&mut self) -> Result<StepOutcome, Error<S::Error, R::Error>> {
        let fresh_frame = match self.capture()? {
            Capture::Copied => true,
            Capture::NoNewFrame => false,
            Capture::Interrupted(outcome) => {
                self.stats.skipped();
                return Ok(outcome);
            }
        };

        let outcome = self.render(fresh_frame)?;
        match outcome {
            StepOutcome::Presented { fresh_frame } => self.stats.presented(fresh_frame),
            _ => self.stats.skipped(),
        };

        Ok(outcome)
    }

    fn capture(&mut self) -> Result<Capture, Error<S::Error, R::Error>> {
        let mut session = match core::mem::replace(&mut self.session, SessionState::Unbound) {
            SessionState::Bound(session) => session,
            SessionState::Unbound => match self.source.bind(self.renderer.device()) {
                Ok(session) => {
                    debug!("Bound duplication session");
                    session
                }
                Err(BindError::AccessDenied) => {
                    warn!(
                        "Duplication access denied, retrying in {:?}",
                        self.access_denied_backoff
                    );
                    thread::sleep(self.access_denied_backoff);
                    return Ok(Capture::Interrupted(StepOutcome::BackedOff));
                }
                Err(BindError::Failed(error)) => return Err(Error::Bind(error)),
            },
        };

        let frame = match self.source.acquire_next_frame(&mut session) {
            Ok(frame) => frame,
            Err(FrameError::Timeout) => {
                self.session = SessionState::Bound(session);
                return Ok(Capture::NoNewFrame);
            }
            Err(FrameError::AccessLost) => {
                debug!("Duplication access lost while acquiring, unbinding");
                return Ok(Capture::Interrupted(StepOutcome::AccessLost));
            }
            Err(FrameError::Failed(error)) => return Err(Error::AcquireFrame(error)),
        };

        let region = self.subscriber.snapshot().region;
        self.renderer.copy_region(&frame, region);
        drop(frame);

        match self.source.release_frame(&mut session) {
            Ok(()) => {}
            Err(SessionError::AccessLost) => {
                debug!("Duplication access lost while releasing, unbinding");
                return Ok(Capture::Interrupted(StepOutcome::AccessLost));
            }
            Err(SessionError::Failed(error)) => return Err(Error::ReleaseFrame(error)),
        }

        self.session = SessionState::Bound(session);
        Ok(Capture::Copied)
    }

    fn render(&mut self, fresh_frame: bool) -> Result<StepOutcome, Error<S::Error, R::Error>> {
        let snapshot = self.subscriber.snapshot();
        if self.applied_version != Some(snapshot.version) {
            self.renderer
                .upload_transform(snapshot.transform)
                .map_err(Error::UploadTransform)?;
            self.applied_version = Some(snapshot.version);
        }

        let display_size = self.subscriber.display_size();
        if self.viewport != Some(display_size) {
            self.renderer.set_viewport(display_size);
            self.viewport = Some(display_size);
        }

        self.renderer.draw();

        match self.renderer.present() {
            Ok(()) => Ok(StepOutcome::Presented { fresh_frame }),

            Err(PresentError::DeviceLost) => {
                warn!("GPU device lost, rebuilding device resources");

                // The session belongs to the lost device.
                self.session = SessionState::Unbound;

                self.renderer.rebuild().map_err(Error::RebuildDevice)?;
                self.applied_version = None;
                self.viewport = None;

                Ok(StepOutcome::DeviceRebuilt)
            }

            Err(PresentError::Failed(error)) => Err(Error::Present(error)),
        }
    }

    /// The duplication session's state.
    pub fn session(&self) -> &SessionState<S::Session> {
        &self.session
    }

    /// The version of the last transform uploaded to the renderer.
    pub fn applied_version(&self) -> Option<u64> {
        self.applied_version
    }

    /// The capture source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}
