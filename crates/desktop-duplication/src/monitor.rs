use overlay_core::Size;
use tracing::{debug, warn};
use windows::Win32::{
    Foundation::POINT,
    Graphics::Gdi::{GetMonitorInfoW, MONITOR_DEFAULTTOPRIMARY, MONITORINFO, MonitorFromPoint},
};

/// The size assumed when the primary monitor can't be queried.
pub const FALLBACK_MONITOR_SIZE: Size = Size::new(1920, 1080);

/// The primary monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monitor {
    /// The monitor's size in desktop pixels.
    pub size: Size,
}

impl Monitor {
    /// Query the primary monitor, falling back to [`FALLBACK_MONITOR_SIZE`].
    pub fn primary() -> Self {
        let handle = unsafe { MonitorFromPoint(POINT { x: 0, y: 0 }, MONITOR_DEFAULTTOPRIMARY) };

        let mut info = MONITORINFO {
            cbSize: size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };

        if !unsafe { GetMonitorInfoW(handle, &mut info) }.as_bool() {
            warn!("GetMonitorInfoW failed, assuming {FALLBACK_MONITOR_SIZE:?}");
            return Self {
                size: FALLBACK_MONITOR_SIZE,
            };
        }

        let rect = info.rcMonitor;
        let size = Size::new(rect.left.abs_diff(rect.right), rect.top.abs_diff(rect.bottom));
        debug!("Primary monitor: {size:?}");

        Self {
            size: size.at_least_one(),
        }
    }
}
