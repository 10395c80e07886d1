use overlay_core::WindowRect;
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    error::OsError,
    event_loop::ActiveEventLoop,
    platform::windows::WindowAttributesExtWindows,
    raw_window_handle::{HasWindowHandle, RawWindowHandle},
    window::{Window, WindowAttributes, WindowLevel},
};
use windows::Win32::Foundation::HWND;

const TITLE: &str = "Region Overlay";

/// Create the overlay window: undecorated, transparent, topmost and never activated.
///
/// No redirection bitmap is allocated, its content comes from the compositor alone.
pub fn create_window(event_loop: &ActiveEventLoop, bounds: WindowRect) -> Result<Window, OsError> {
    event_loop.create_window(attributes(bounds))
}

/// The window keeps its taskbar entry, the overlay is never focused or hit so closing it from
/// the taskbar is the only way to exit.
fn attributes(bounds: WindowRect) -> WindowAttributes {
    Window::default_attributes()
        .with_title(TITLE)
        .with_decorations(false)
        .with_transparent(true)
        .with_resizable(false)
        .with_active(false)
        .with_window_level(WindowLevel::AlwaysOnTop)
        .with_position(position(bounds))
        .with_inner_size(size(bounds))
        .with_no_redirection_bitmap(true)
}

/// Move and resize the window.
pub fn apply_bounds(window: &Window, bounds: WindowRect) {
    window.set_outer_position(position(bounds));
    let _ = window.request_inner_size(size(bounds));
}

/// The window's native handle.
pub fn hwnd(window: &Window) -> Option<HWND> {
    match window.window_handle().ok()?.as_raw() {
        RawWindowHandle::Win32(handle) => Some(HWND(handle.hwnd.get() as *mut _)),
        _ => None,
    }
}

fn position(bounds: WindowRect) -> PhysicalPosition<i32> {
    PhysicalPosition::new(bounds.position.x, bounds.position.y)
}

fn size(bounds: WindowRect) -> PhysicalSize<u32> {
    PhysicalSize::new(bounds.size.width, bounds.size.height)
}
