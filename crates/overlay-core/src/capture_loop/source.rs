use thiserror::Error;

/// A screen duplication facility that hands out one desktop frame at a time.
///
/// A session is bound against the render device and must be rebound after it is lost. Dropping a
/// session releases it.
pub trait CaptureSource {
    /// The GPU device sessions are bound against.
    type Device;

    /// A live duplication session.
    type Session;

    /// One acquired desktop frame, valid until the frame is released.
    type Frame;

    /// A failure that can't be recovered from.
    type Error: core::error::Error + 'static;

    /// Start a new duplication session.
    fn bind(&mut self, device: &Self::Device) -> Result<Self::Session, BindError<Self::Error>>;

    /// Wait for the next desktop frame.
    fn acquire_next_frame(
        &mut self,
        session: &mut Self::Session,
    ) -> Result<Self::Frame, FrameError<Self::Error>>;

    /// Hand the current frame back to the session.
    fn release_frame(&mut self, session: &mut Self::Session)
    -> Result<(), SessionError<Self::Error>>;
}

/// Failure to bind a duplication session.
#[derive(Debug, Error)]
pub enum BindError<E> {
    /// Duplication is temporarily unavailable, e.g. while the secure desktop is shown.
    #[error("Access to the output was denied")]
    AccessDenied,

    /// Any other failure.
    #[error(transparent)]
    Failed(E),
}

/// Failure to acquire a frame.
#[derive(Debug, Error)]
pub enum FrameError<E> {
    /// No new frame arrived within the wait.
    #[error("Timed out waiting for a frame")]
    Timeout,

    /// The session was invalidated and must be rebound.
    #[error("Access to the duplication session was lost")]
    AccessLost,

    /// Any other failure.
    #[error(transparent)]
    Failed(E),
}

/// Failure of an operation on a bound session.
#[derive(Debug, Error)]
pub enum SessionError<E> {
    /// The session was invalidated and must be rebound.
    #[error("Access to the duplication session was lost")]
    AccessLost,

    /// Any other failure.
    #[error(transparent)]
    Failed(E),
}
