use thiserror::Error;

use crate::geometry::{CaptureRegion, Size, Transform};

/// Draws the captured region into the overlay.
pub trait OverlayRenderer {
    /// The GPU device capture sessions must be bound against.
    type Device;

    /// A desktop frame from the capture source.
    type Frame;

    /// A failure that can't be recovered from.
    type Error: core::error::Error + 'static;

    /// The current device, changes after [`OverlayRenderer::rebuild`].
    fn device(&self) -> &Self::Device;

    /// Copy `region` of `frame` to the origin of the display texture.
    fn copy_region(&mut self, frame: &Self::Frame, region: CaptureRegion);

    /// Write the transform into the GPU-visible buffer.
    fn upload_transform(&mut self, transform: Transform) -> Result<(), Self::Error>;

    /// Resize the viewport.
    fn set_viewport(&mut self, size: Size);

    /// Clear the render target and draw the overlay.
    fn draw(&mut self);

    /// Present without waiting for vertical sync.
    fn present(&mut self) -> Result<(), PresentError<Self::Error>>;

    /// Recreate every device dependent resource on a new device.
    ///
    /// Any previously uploaded transform and viewport are lost.
    fn rebuild(&mut self) -> Result<(), Self::Error>;
}

/// Failure to present.
#[derive(Debug, Error)]
pub enum PresentError<E> {
    /// The device was reset or removed and must be rebuilt.
    #[error("The GPU device was lost")]
    DeviceLost,

    /// Any other failure.
    #[error(transparent)]
    Failed(E),
}
