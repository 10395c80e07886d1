//! The region drag state machine.
//!
//! Holding the drag key marks one corner at the cursor, releasing it marks the other. A plain
//! drag redefines the captured region, a drag with the modifier held redefines the overlay
//! window's bounds instead.

use tracing::{debug, info};

use crate::{
    geometry::{CaptureRegion, Point, Size, Transform, WindowRect},
    shared::Publisher,
};

/// A hardware keyboard scan code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanCode(pub u32);

/// The keys that drive the drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    /// Held to drag.
    pub drag: ScanCode,

    /// Held while releasing the drag key to resize the window instead of the region.
    pub modifier: ScanCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            drag: ScanCode(0x4C),
            modifier: ScanCode(0x1D),
        }
    }
}

/// Samples the current cursor position, `None` if the sample failed.
pub trait CursorSource {
    /// The current cursor position in desktop coordinates.
    fn cursor_position(&self) -> Option<Point>;
}

impl<F> CursorSource for F
where
    F: Fn() -> Option<Point>,
{
    fn cursor_position(&self) -> Option<Point> {
        self()
    }
}

/// The state of the gesture.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    /// No gesture in progress.
    #[default]
    Idle,

    /// The drag key is held and the start corner was sampled.
    Dragging {
        /// The corner sampled when the drag key went down.
        start: Point,
    },
}

/// Why a gesture was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The cursor could not be sampled when the drag key went down.
    InvalidStart,

    /// The cursor could not be sampled when the drag key went up.
    EndSampleFailed,
}

/// The effect of a key event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// The event did not affect the gesture.
    Ignored,

    /// A gesture started at the given corner.
    Started(Point),

    /// The drag key went down but the cursor could not be sampled.
    StartFailed,

    /// The gesture was dropped without changing anything.
    Discarded(DiscardReason),

    /// A new capture region was published to the render thread.
    RegionChanged {
        /// The new region.
        region: CaptureRegion,

        /// The new transform.
        transform: Transform,

        /// The version the region was published as.
        version: u64,
    },

    /// The window bounds changed, the caller must apply them to the window.
    WindowChanged(WindowRect),
}

/// Turns drag key gestures into capture region or window changes.
///
/// Lives on the interaction thread, it is the only owner of the window bounds and the only
/// writer of the published capture region.
pub struct RegionDrag<C> {
    cursor: C,
    publisher: Publisher,
    bindings: KeyBindings,

    monitor: Size,
    reference: Size,
    window: WindowRect,

    state: DragState,
    drag_held: bool,
    modifier_held: bool,
}

impl<C: CursorSource> RegionDrag<C> {
    /// Create an idle state machine.
    ///
    /// `monitor` bounds the capture regions, `reference` is the size transforms are expressed
    /// against, `window` is the overlay window's current bounds.
    pub fn new(
        cursor: C,
        publisher: Publisher,
        bindings: KeyBindings,
        monitor: Size,
        reference: Size,
        window: WindowRect,
    ) -> Self {
        Self {
            cursor,
            publisher,
            bindings,
            monitor,
            reference,
            window,
            state: DragState::Idle,
            drag_held: false,
            modifier_held: false,
        }
    }

    /// Handle a key going down (`pressed`) or up.
    pub fn handle_key(&mut self, scan_code: ScanCode, pressed: bool) -> DragOutcome {
        if scan_code == self.bindings.modifier {
            self.modifier_held = pressed;
            return DragOutcome::Ignored;
        }

        if scan_code != self.bindings.drag {
            return DragOutcome::Ignored;
        }

        let was_held = self.drag_held;
        self.drag_held = pressed;

        match (was_held, pressed) {
            (false, true) => self.begin(),
            (true, false) => self.finish(),
            // Key repeat or a release we never saw go down.
            _ => DragOutcome::Ignored,
        }
    }

    fn begin(&mut self) -> DragOutcome {
        match self.cursor.cursor_position() {
            Some(start) => {
                debug!("Drag started at {start:?}");
                self.state = DragState::Dragging { start };
                DragOutcome::Started(start)
            }
            None => {
                debug!("Could not sample the cursor at drag start");
                self.state = DragState::Idle;
                DragOutcome::StartFailed
            }
        }
    }

    fn finish(&mut self) -> DragOutcome {
        let state = core::mem::take(&mut self.state);

        let DragState::Dragging { start } = state else {
            debug!("Drag discarded, the start was invalid");
            return DragOutcome::Discarded(DiscardReason::InvalidStart);
        };

        let Some(end) = self.cursor.cursor_position() else {
            debug!("Drag discarded, could not sample the cursor at drag end");
            return DragOutcome::Discarded(DiscardReason::EndSampleFailed);
        };

        if self.modifier_held {
            let window = WindowRect::from_corners(start, end);
            self.window = window;
            self.publisher.set_display_size(window.size);

            info!("Window moved to {window:?}");
            DragOutcome::WindowChanged(window)
        } else {
            let region = CaptureRegion::from_corners(start, end, self.monitor);
            let transform = Transform::for_region(&region, self.reference);
            let version = self.publisher.publish(region, transform);

            info!("Capture region changed to {region:?} (version {version})");
            DragOutcome::RegionChanged {
                region,
                transform,
                version,
            }
        }
    }

    /// The current gesture state.
    pub fn state(&self) -> DragState {
        self.state
    }

    /// The overlay window's bounds.
    pub fn window(&self) -> WindowRect {
        self.window
    }

    /// Whether the modifier key is currently held.
    pub fn modifier_held(&self) -> bool {
        self.modifier_held
    }

    /// The publishing half of the shared region state.
    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }
}
