use overlay_core::ScanCode;
use winit::{keyboard::PhysicalKey, platform::scancode::PhysicalKeyExtScancode};

/// The hardware scan code of a key, `None` for keys winit couldn't identify.
pub fn scan_code(key: PhysicalKey) -> Option<ScanCode> {
    key.to_scancode().map(ScanCode)
}
