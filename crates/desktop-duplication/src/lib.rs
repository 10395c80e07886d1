//! # Desktop Duplication
//! Captures the primary monitor through the DXGI desktop duplication API.
//!

#![cfg(windows)]

mod cursor;
mod directx;
mod duplication;
mod monitor;
mod result;
mod send;

pub use cursor::cursor_position;
pub use directx::DirectX;
pub use duplication::{DesktopDuplicator, DuplicatedFrame, DuplicationSession};
pub use monitor::{FALLBACK_MONITOR_SIZE, Monitor};
pub use result::{LabelledWinResult, WinError};
pub use send::SendHWND;
