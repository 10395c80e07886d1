//! Tests for device creation and output queries.
//!

#![cfg(windows)]

use desktop_duplication::{DirectX, Monitor};
use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext,
};

#[test]
fn create_direct_x() {
    let direct_x = DirectX::new().unwrap();
    drop(direct_x);
}

#[test]
fn primary_output_is_attached() {
    let direct_x = DirectX::new().unwrap();
    let output = direct_x.primary_output().unwrap();

    let descriptor = unsafe { output.GetDesc() }.unwrap();

    assert!(descriptor.AttachedToDesktop.as_bool());
    assert!(!descriptor.Monitor.is_invalid());
}

#[test]
fn primary_monitor_has_a_size() {
    let monitor = Monitor::primary();

    assert!(monitor.size.width > 0);
    assert!(monitor.size.height > 0);
}

#[test]
fn dpi_aware_monitor_matches_the_duplicated_output() {
    // The event loop makes the process per-monitor aware before the monitor is queried.
    let _ = unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) };

    let monitor = Monitor::primary();

    let direct_x = DirectX::new().unwrap();
    let output = direct_x.primary_output().unwrap();
    let coordinates = unsafe { output.GetDesc() }.unwrap().DesktopCoordinates;

    assert_eq!(
        monitor.size.width,
        coordinates.left.abs_diff(coordinates.right)
    );
    assert_eq!(
        monitor.size.height,
        coordinates.top.abs_diff(coordinates.bottom)
    );
}
