use windows::Win32::UI::WindowsAndMessaging::{MESSAGEBOX_RESULT, MESSAGEBOX_STYLE, MessageBoxW};
use windows_core::{HSTRING, h};

/// Display a Windows message box.
pub fn display_message(message: &str, style: MESSAGEBOX_STYLE) -> MESSAGEBOX_RESULT {
    unsafe {
        let message = HSTRING::from(message);

        MessageBoxW(None, &message, h!("Region Overlay"), style)
    }
}
