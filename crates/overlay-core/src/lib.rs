//! # Overlay Core
//! Platform independent core of Region Overlay: the capture region geometry, the lock-free
//! hand-off between the interaction and render threads, the region drag state machine, and the
//! capture-render loop.
//!

extern crate alloc;

pub mod capture_loop;
pub mod drag;
pub mod geometry;
pub mod shared;

pub use capture_loop::{
    BindError, CaptureLoop, CaptureSource, Error as CaptureLoopError, FrameError, OverlayRenderer,
    PresentError, SessionError, SessionState, StepOutcome,
};
pub use drag::{CursorSource, DiscardReason, DragOutcome, DragState, KeyBindings, RegionDrag, ScanCode};
pub use geometry::{CaptureRegion, Point, Size, Transform, WindowRect};
pub use shared::{Publisher, Snapshot, Subscriber};
