use overlay_core::Point;
use tracing::debug;
use windows::Win32::{Foundation::POINT, UI::WindowsAndMessaging::GetCursorPos};

/// Sample the cursor in desktop coordinates, `None` if the OS refused.
pub fn cursor_position() -> Option<Point> {
    let mut point = POINT::default();

    match unsafe { GetCursorPos(&mut point) } {
        Ok(()) => Some(Point::new(point.x, point.y)),
        Err(error) => {
            debug!("GetCursorPos failed: {error}");
            None
        }
    }
}
