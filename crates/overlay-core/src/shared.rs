//! Lock-free hand-off of the capture region and transform from the interaction thread to the
//! render thread.
//!
//! There is exactly one [`Publisher`] and one [`Subscriber`] per overlay. The region and transform
//! are published together behind a sequence lock: the publisher makes the sequence odd, stores the
//! fields and makes it even again; the subscriber retries a read until it sees the same even
//! sequence before and after loading the fields. Neither side ever waits on the other for longer
//! than a single publish.
//!
//! The published version is half the sequence, so it increases by exactly one per publish.

use alloc::sync::Arc;
use core::{
    hint::spin_loop,
    sync::atomic::{AtomicU32, AtomicU64, Ordering, fence},
};

use crate::geometry::{CaptureRegion, Size, Transform};

/// A self-consistent view of the published state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// The region of the desktop to copy.
    pub region: CaptureRegion,

    /// The transform matching `region`.
    pub transform: Transform,

    /// The number of publishes that preceded this snapshot.
    pub version: u64,
}

struct Slot {
    sequence: AtomicU64,

    left: AtomicU32,
    top: AtomicU32,
    right: AtomicU32,
    bottom: AtomicU32,

    transform_x: AtomicU32,
    transform_y: AtomicU32,

    display_size: AtomicU64,
}

impl Slot {
    fn write(&self, region: CaptureRegion, transform: Transform) -> u64 {
        // Only the publisher writes, so the sequence can't change underneath it.
        let sequence = self.sequence.load(Ordering::Relaxed);
        debug_assert!(sequence % 2 == 0, "publish started while another was in progress");

        self.sequence.store(sequence.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        self.left.store(region.left, Ordering::Relaxed);
        self.top.store(region.top, Ordering::Relaxed);
        self.right.store(region.right, Ordering::Relaxed);
        self.bottom.store(region.bottom, Ordering::Relaxed);
        self.transform_x.store(transform.x.to_bits(), Ordering::Relaxed);
        self.transform_y.store(transform.y.to_bits(), Ordering::Relaxed);

        let sequence = sequence.wrapping_add(2);
        self.sequence.store(sequence, Ordering::Release);

        sequence / 2
    }

    fn read(&self) -> Snapshot {
        loop {
            let before = self.sequence.load(Ordering::Acquire);
            if before % 2 == 1 {
                spin_loop();
                continue;
            }

            let region = CaptureRegion {
                left: self.left.load(Ordering::Relaxed),
                top: self.top.load(Ordering::Relaxed),
                right: self.right.load(Ordering::Relaxed),
                bottom: self.bottom.load(Ordering::Relaxed),
            };
            let transform = Transform {
                x: f32::from_bits(self.transform_x.load(Ordering::Relaxed)),
                y: f32::from_bits(self.transform_y.load(Ordering::Relaxed)),
            };

            fence(Ordering::Acquire);
            let after = self.sequence.load(Ordering::Relaxed);

            if before == after {
                return Snapshot {
                    region,
                    transform,
                    version: before / 2,
                };
            }

            spin_loop();
        }
    }

    fn version(&self) -> u64 {
        self.sequence.load(Ordering::Acquire) / 2
    }

    fn display_size(&self) -> Size {
        let packed = self.display_size.load(Ordering::Acquire);

        Size::new((packed >> 32) as u32, packed as u32)
    }

    fn set_display_size(&self, size: Size) {
        let packed = (u64::from(size.width) << 32) | u64::from(size.height);

        self.display_size.store(packed, Ordering::Release);
    }
}

/// Create the publisher and subscriber pair, starting at version 0.
pub fn channel(
    region: CaptureRegion,
    transform: Transform,
    display_size: Size,
) -> (Publisher, Subscriber) {
    let slot = Arc::new(Slot {
        sequence: AtomicU64::new(0),
        left: AtomicU32::new(region.left),
        top: AtomicU32::new(region.top),
        right: AtomicU32::new(region.right),
        bottom: AtomicU32::new(region.bottom),
        transform_x: AtomicU32::new(transform.x.to_bits()),
        transform_y: AtomicU32::new(transform.y.to_bits()),
        display_size: AtomicU64::new(0),
    });
    slot.set_display_size(display_size);

    let publisher = Publisher {
        slot: Arc::clone(&slot),
    };
    let subscriber = Subscriber { slot };

    (publisher, subscriber)
}

/// The writing half, owned by the interaction thread.
pub struct Publisher {
    slot: Arc<Slot>,
}

impl Publisher {
    /// Publish a new region and transform, returns the new version.
    pub fn publish(&mut self, region: CaptureRegion, transform: Transform) -> u64 {
        self.slot.write(region, transform)
    }

    /// Publish the size the overlay window intends to display.
    pub fn set_display_size(&mut self, size: Size) {
        self.slot.set_display_size(size);
    }

    /// The currently published state.
    pub fn snapshot(&self) -> Snapshot {
        self.slot.read()
    }

    /// The number of publishes so far.
    pub fn version(&self) -> u64 {
        self.slot.version()
    }
}

/// The reading half, owned by the render thread.
pub struct Subscriber {
    slot: Arc<Slot>,
}

impl Subscriber {
    /// Read a consistent snapshot of the published state.
    pub fn snapshot(&self) -> Snapshot {
        self.slot.read()
    }

    /// The latest published version.
    pub fn version(&self) -> u64 {
        self.slot.version()
    }

    /// The size the overlay window intends to display.
    pub fn display_size(&self) -> Size {
        self.slot.display_size()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crate::geometry::{CaptureRegion, DEFAULT_REFERENCE_SIZE, Size, Transform};

    use super::channel;

    fn region(size: u32) -> CaptureRegion {
        CaptureRegion {
            left: size,
            top: size,
            right: size * 2,
            bottom: size * 2,
        }
    }

    #[test]
    fn starts_at_version_zero() {
        let initial = region(10);
        let transform = Transform::for_region(&initial, DEFAULT_REFERENCE_SIZE);
        let (publisher, subscriber) = channel(initial, transform, Size::new(200, 100));

        let snapshot = subscriber.snapshot();
        assert_eq!(snapshot.version, 0);
        assert_eq!(snapshot.region, initial);
        assert_eq!(snapshot.transform, transform);
        assert_eq!(publisher.version(), 0);
        assert_eq!(subscriber.display_size(), Size::new(200, 100));
    }

    #[test]
    fn each_publish_bumps_version_by_one() {
        let (mut publisher, subscriber) =
            channel(region(1), Transform::default(), Size::new(1, 1));

        for expected in 1..=5 {
            let next = region(expected as u32 + 1);
            let version =
                publisher.publish(next, Transform::for_region(&next, DEFAULT_REFERENCE_SIZE));

            assert_eq!(version, expected);
            assert_eq!(subscriber.version(), expected);
            assert_eq!(subscriber.snapshot().region, next);
        }
    }

    #[test]
    fn display_size_is_independent_of_version() {
        let (mut publisher, subscriber) =
            channel(region(1), Transform::default(), Size::new(200, 200));

        publisher.set_display_size(Size::new(u32::MAX, 7));

        assert_eq!(subscriber.display_size(), Size::new(u32::MAX, 7));
        assert_eq!(subscriber.version(), 0);
    }

    #[test]
    fn concurrent_reads_are_never_torn() {
        let (mut publisher, subscriber) =
            channel(region(1), Transform { x: 1.0, y: 1.0 }, Size::new(1, 1));

        let reader = thread::spawn(move || {
            let mut last_version = 0;
            for _ in 0..100_000 {
                let snapshot = subscriber.snapshot();

                // Every published region is square with left == top, and the transform's axes are
                // always equal.
                assert_eq!(snapshot.region.left, snapshot.region.top);
                assert_eq!(snapshot.region.right, snapshot.region.bottom);
                assert_eq!(snapshot.region.right, snapshot.region.left * 2);
                assert_eq!(snapshot.transform.x, snapshot.transform.y);
                assert!(snapshot.version >= last_version);

                last_version = snapshot.version;
            }
        });

        for size in 1..20_000u32 {
            let scale = size as f32;
            publisher.publish(region(size), Transform { x: scale, y: scale });
        }

        reader.join().expect("reader thread panicked");
    }
}
