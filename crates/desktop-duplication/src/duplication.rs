use overlay_core::{BindError, CaptureSource, FrameError, SessionError};
use tracing::debug;
use windows::Win32::{
    Foundation::E_ACCESSDENIED,
    Graphics::{
        Direct3D11::{ID3D11Device, ID3D11Texture2D},
        Dxgi::{
            DXGI_ERROR_ACCESS_LOST, DXGI_ERROR_WAIT_TIMEOUT, DXGI_OUTDUPL_FRAME_INFO,
            IDXGIDevice, IDXGIOutputDuplication, IDXGIResource,
        },
    },
    System::Threading::INFINITE,
};
use windows_core::Interface;

use crate::{WinError, directx::primary_output};

/// Duplicates the primary output of whichever device it is bound against.
#[derive(Debug, Clone, Copy)]
pub struct DesktopDuplicator {
    timeout_ms: u32,
}

impl DesktopDuplicator {
    /// Wait at most `timeout_ms` for each frame, `None` waits indefinitely.
    pub fn new(timeout_ms: Option<u32>) -> Self {
        Self {
            timeout_ms: timeout_ms.unwrap_or(INFINITE),
        }
    }

    /// Release a frame that was acquired but can't be handed out.
    fn release_unused(
        &mut self,
        session: &mut DuplicationSession,
    ) -> Result<(), FrameError<WinError>> {
        self.release_frame(session).map_err(|error| match error {
            SessionError::AccessLost => FrameError::AccessLost,
            SessionError::Failed(error) => FrameError::Failed(error),
        })
    }
}

impl Default for DesktopDuplicator {
    fn default() -> Self {
        Self::new(None)
    }
}

/// A live duplication of the primary output.
///
/// Dropping the session releases the duplication.
pub struct DuplicationSession {
    duplication: IDXGIOutputDuplication,
}

/// The desktop image of one acquired frame.
pub struct DuplicatedFrame {
    /// The desktop texture, only valid until the frame is released.
    pub texture: ID3D11Texture2D,

    /// The number of presents accumulated since the last acquired frame.
    pub accumulated_frames: u32,
}

impl CaptureSource for DesktopDuplicator {
    type Device = ID3D11Device;
    type Session = DuplicationSession;
    type Frame = DuplicatedFrame;
    type Error = WinError;

    fn bind(&mut self, device: &ID3D11Device) -> Result<DuplicationSession, BindError<WinError>> {
        let dxgi_device: IDXGIDevice = device
            .cast()
            .map_err(|e| BindError::Failed(WinError::new(e, "ID3D11Device::cast")))?;

        let adapter = unsafe { dxgi_device.GetAdapter() }
            .map_err(|e| BindError::Failed(WinError::new(e, "IDXGIDevice::GetAdapter")))?;

        let output = primary_output(&adapter).map_err(BindError::Failed)?;

        let duplication = unsafe { output.DuplicateOutput(device) }.map_err(|e| {
            if e.code() == E_ACCESSDENIED {
                BindError::AccessDenied
            } else {
                BindError::Failed(WinError::new(e, "IDXGIOutput1::DuplicateOutput"))
            }
        })?;

        Ok(DuplicationSession { duplication })
    }

    fn acquire_next_frame(
        &mut self,
        session: &mut DuplicationSession,
    ) -> Result<DuplicatedFrame, FrameError<WinError>> {
        let mut info = DXGI_OUTDUPL_FRAME_INFO::default();
        let mut resource: Option<IDXGIResource> = None;

        unsafe {
            session
                .duplication
                .AcquireNextFrame(self.timeout_ms, &mut info, &mut resource)
        }
        .map_err(|e| match e.code() {
            DXGI_ERROR_WAIT_TIMEOUT => FrameError::Timeout,
            DXGI_ERROR_ACCESS_LOST => FrameError::AccessLost,
            _ => FrameError::Failed(WinError::new(e, "IDXGIOutputDuplication::AcquireNextFrame")),
        })?;

        // From here on the frame is held and must be released even if it can't be used.
        let Some(resource) = resource else {
            debug!("Acquired frame carried no desktop image");
            self.release_unused(session)?;
            return Err(FrameError::Timeout);
        };

        let texture = match resource.cast::<ID3D11Texture2D>() {
            Ok(texture) => texture,
            Err(e) => {
                self.release_unused(session)?;
                return Err(FrameError::Failed(WinError::new(e, "IDXGIResource::cast")));
            }
        };

        Ok(DuplicatedFrame {
            texture,
            accumulated_frames: info.AccumulatedFrames,
        })
    }

    fn release_frame(
        &mut self,
        session: &mut DuplicationSession,
    ) -> Result<(), SessionError<WinError>> {
        unsafe { session.duplication.ReleaseFrame() }.map_err(|e| {
            if e.code() == DXGI_ERROR_ACCESS_LOST {
                SessionError::AccessLost
            } else {
                SessionError::Failed(WinError::new(e, "IDXGIOutputDuplication::ReleaseFrame"))
            }
        })
    }
}
