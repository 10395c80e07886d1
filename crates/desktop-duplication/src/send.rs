use windows::Win32::Foundation::HWND;

/// A wrapper to make [HWND] [Send].
///
/// The overlay window is created on the interaction thread and composited from the render thread.
#[derive(Debug, Clone, Copy)]
pub struct SendHWND(pub HWND);
unsafe impl Send for SendHWND {}
