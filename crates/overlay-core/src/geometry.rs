//! Geometry shared between the interaction and render threads.
//!
//! All coordinates are desktop pixels relative to the top-left corner of the primary monitor.

/// The width and height that region transforms are expressed against.
pub const DEFAULT_REFERENCE_SIZE: Size = Size::new(1280, 1024);

/// A point in desktop coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    /// Horizontal position.
    pub x: i32,

    /// Vertical position.
    pub y: i32,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A size in pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Horizontal extent.
    pub width: u32,

    /// Vertical extent.
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// This size with each extent raised to at least one pixel.
    pub fn at_least_one(self) -> Self {
        Self {
            width: self.width.max(1),
            height: self.height.max(1),
        }
    }
}

/// The axis-aligned region of the desktop that is mirrored into the overlay.
///
/// The region always lies inside the monitor it was created for and is at least one pixel wide
/// and tall. Depth is implicitly `front = 0, back = 1`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    /// Left edge, inclusive.
    pub left: u32,

    /// Top edge, inclusive.
    pub top: u32,

    /// Right edge, exclusive.
    pub right: u32,

    /// Bottom edge, exclusive.
    pub bottom: u32,
}

impl CaptureRegion {
    /// The region of size `extent` in the bottom-right corner of `monitor`.
    pub fn bottom_right(monitor: Size, extent: Size) -> Self {
        let monitor = monitor.at_least_one();
        let extent = extent.at_least_one();

        let width = extent.width.min(monitor.width);
        let height = extent.height.min(monitor.height);

        Self {
            left: monitor.width - width,
            top: monitor.height - height,
            right: monitor.width,
            bottom: monitor.height,
        }
    }

    /// The bounding box of two drag corners, clamped into `monitor`.
    ///
    /// A zero extent on either axis is widened to one pixel, towards the monitor's interior if the
    /// region sits on the far edge.
    pub fn from_corners(start: Point, end: Point, monitor: Size) -> Self {
        let monitor = monitor.at_least_one();

        let (left, right) = clamp_span(start.x, end.x, monitor.width);
        let (top, bottom) = clamp_span(start.y, end.y, monitor.height);

        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The width of the region.
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    /// The height of the region.
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

fn clamp_span(a: i32, b: i32, limit: u32) -> (u32, u32) {
    let clamp = |value: i32| value.max(0).unsigned_abs().min(limit);

    let mut low = clamp(a.min(b));
    let mut high = clamp(a.max(b));

    if low == high {
        if high < limit {
            high += 1;
        } else {
            low -= 1;
        }
    }

    (low, high)
}

/// Per-axis scale applied to the overlay's texture coordinates so that they address exactly the
/// cropped region copied into the top-left of the display texture.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Horizontal scale.
    pub x: f32,

    /// Vertical scale.
    pub y: f32,
}

impl Transform {
    /// The transform for `region` expressed against `reference`.
    pub fn for_region(region: &CaptureRegion, reference: Size) -> Self {
        let reference = reference.at_least_one();

        Self {
            x: region.width() as f32 / reference.width as f32,
            y: region.height() as f32 / reference.height as f32,
        }
    }
}

/// The position and size of the overlay window.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowRect {
    /// Top-left corner of the window.
    pub position: Point,

    /// Size of the window, at least one pixel on each axis.
    pub size: Size,
}

impl WindowRect {
    /// A window of `size` centred on `monitor`.
    pub fn centred(monitor: Size, size: Size) -> Self {
        let size = size.at_least_one();

        let x = (i64::from(monitor.width) - i64::from(size.width)) / 2;
        let y = (i64::from(monitor.height) - i64::from(size.height)) / 2;

        Self {
            position: Point::new(saturate_i32(x), saturate_i32(y)),
            size,
        }
    }

    /// The bounding box of two drag corners.
    pub fn from_corners(start: Point, end: Point) -> Self {
        let position = Point::new(start.x.min(end.x), start.y.min(end.y));
        let size = Size::new(start.x.abs_diff(end.x), start.y.abs_diff(end.y)).at_least_one();

        Self { position, size }
    }
}

fn saturate_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use super::{CaptureRegion, DEFAULT_REFERENCE_SIZE, Point, Size, Transform, WindowRect};

    const MONITOR: Size = Size::new(1920, 1080);

    #[test]
    fn initial_region_is_bottom_right_square() {
        let region = CaptureRegion::bottom_right(MONITOR, Size::new(200, 200));

        assert_eq!(
            region,
            CaptureRegion {
                left: 1720,
                top: 880,
                right: 1920,
                bottom: 1080,
            }
        );

        let transform = Transform::for_region(&region, DEFAULT_REFERENCE_SIZE);
        assert_eq!(transform.x, 200.0 / 1280.0);
        assert_eq!(transform.y, 200.0 / 1024.0);
    }

    #[test]
    fn corners_in_any_order() {
        let expected = CaptureRegion {
            left: 10,
            top: 20,
            right: 110,
            bottom: 70,
        };

        let corners = [
            (Point::new(10, 20), Point::new(110, 70)),
            (Point::new(110, 70), Point::new(10, 20)),
            (Point::new(10, 70), Point::new(110, 20)),
            (Point::new(110, 20), Point::new(10, 70)),
        ];

        for (start, end) in corners {
            assert_eq!(CaptureRegion::from_corners(start, end, MONITOR), expected);
        }
    }

    #[test]
    fn zero_extent_widens_to_one_pixel() {
        let region = CaptureRegion::from_corners(Point::new(50, 60), Point::new(50, 60), MONITOR);
        assert_eq!((region.width(), region.height()), (1, 1));
        assert_eq!((region.left, region.top), (50, 60));

        let transform = Transform::for_region(&region, DEFAULT_REFERENCE_SIZE);
        assert!(transform.x.is_finite() && transform.x > 0.0);
        assert!(transform.y.is_finite() && transform.y > 0.0);
    }

    #[test]
    fn zero_extent_on_far_edge_widens_inwards() {
        let region =
            CaptureRegion::from_corners(Point::new(1920, 1080), Point::new(1920, 1080), MONITOR);

        assert_eq!(
            region,
            CaptureRegion {
                left: 1919,
                top: 1079,
                right: 1920,
                bottom: 1080,
            }
        );
    }

    #[test]
    fn region_is_clamped_to_monitor() {
        let region =
            CaptureRegion::from_corners(Point::new(-300, -10), Point::new(2500, 400), MONITOR);

        assert_eq!(
            region,
            CaptureRegion {
                left: 0,
                top: 0,
                right: 1920,
                bottom: 400,
            }
        );
    }

    #[test]
    fn region_entirely_off_monitor_keeps_a_pixel() {
        let region =
            CaptureRegion::from_corners(Point::new(-500, -500), Point::new(-100, -100), MONITOR);

        assert_eq!((region.left, region.right), (0, 1));
        assert_eq!((region.top, region.bottom), (0, 1));
    }

    #[test]
    fn window_centred_on_monitor() {
        let window = WindowRect::centred(MONITOR, Size::new(200, 200));

        assert_eq!(window.position, Point::new(860, 440));
        assert_eq!(window.size, Size::new(200, 200));
    }

    #[test]
    fn window_from_corners_is_never_empty() {
        let window = WindowRect::from_corners(Point::new(-40, 30), Point::new(-40, 30));

        assert_eq!(window.position, Point::new(-40, 30));
        assert_eq!(window.size, Size::new(1, 1));

        let window = WindowRect::from_corners(Point::new(400, 300), Point::new(0, 0));
        assert_eq!(window.position, Point::new(0, 0));
        assert_eq!(window.size, Size::new(400, 300));
    }
}
