use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

/// Work to run before the next repaint. Receives the frame timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Ticket returned by [`FrameScheduler::register`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// The host's "next animation frame" primitive.
pub trait FrameScheduler {
    fn register(&self, callback: FrameCallback) -> FrameHandle;

    /// Drops a registered callback. Cancelling a handle that already ran is a no-op.
    fn cancel(&self, handle: FrameHandle);
}

/// Monotonic time source, in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

impl<F: Fn() -> f64> Clock for F {
    fn now_ms(&self) -> f64 {
        self()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self(Rc::new(Cell::new(start_ms)))
    }

    pub fn now(&self) -> f64 {
        self.0.get()
    }

    pub fn set(&self, now_ms: f64) {
        self.0.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) -> f64 {
        let now = self.0.get() + delta_ms;
        self.0.set(now);
        now
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now()
    }
}

/// Wall-clock time since construction.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

#[derive(Default)]
struct FrameQueue {
    next: u64,
    queued: Vec<(FrameHandle, FrameCallback)>,
}

/// A frame scheduler driven by hand, for tests and headless hosts.
///
/// [`ManualFrames::run_frame`] runs the callbacks that were queued when it was called.
/// Callbacks registered while a frame runs wait for the next one, like `requestAnimationFrame`.
/// Clones share the same queue.
#[derive(Clone, Default)]
pub struct ManualFrames {
    inner: Rc<RefCell<FrameQueue>>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for a frame.
    pub fn pending(&self) -> usize {
        self.inner.borrow().queued.len()
    }

    /// Runs one frame at `time_ms`. Returns how many callbacks ran.
    pub fn run_frame(&self, time_ms: f64) -> usize {
        let limit = self.inner.borrow().next;
        let mut ran = 0;
        loop {
            // Re-borrow per callback: a callback may register or cancel frames.
            let due = {
                let mut queue = self.inner.borrow_mut();
                if queue.queued.first().is_some_and(|(h, _)| h.0 < limit) {
                    Some(queue.queued.remove(0).1)
                } else {
                    None
                }
            };
            let Some(callback) = due else {
                break;
            };
            callback(time_ms);
            ran += 1;
        }
        ran
    }

    /// Advances `clock` by `step_ms` and runs a frame, until nothing is queued or `max_frames`
    /// frames ran. Returns the number of frames run.
    pub fn pump(&self, clock: &ManualClock, step_ms: f64, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.pending() > 0 {
            let now = clock.advance(step_ms);
            self.run_frame(now);
            frames += 1;
        }
        frames
    }
}

impl FrameScheduler for ManualFrames {
    fn register(&self, callback: FrameCallback) -> FrameHandle {
        let mut queue = self.inner.borrow_mut();
        let handle = FrameHandle(queue.next);
        queue.next += 1;
        queue.queued.push((handle, callback));
        handle
    }

    fn cancel(&self, handle: FrameHandle) {
        // Dropping a callback may drop state that owns this scheduler; release the borrow first.
        let removed = {
            let mut queue = self.inner.borrow_mut();
            let index = queue.queued.iter().position(|(h, _)| *h == handle);
            index.map(|i| queue.queued.remove(i))
        };
        drop(removed);
    }
}

impl fmt::Debug for ManualFrames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualFrames")
            .field("pending", &self.pending())
            .finish()
    }
}
