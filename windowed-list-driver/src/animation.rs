use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::future::Future;
use core::mem;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use windowed_list::Point;

use crate::{Clock, Easing, FrameHandle, FrameScheduler, Tween};

/// Frame timestamps above this are assumed to be epoch milliseconds rather than a
/// monotonic origin.
const EPOCH_THRESHOLD_MS: f64 = 1e12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimationStatus {
    Running,
    Completed,
    Cancelled,
}

struct AnimationState {
    status: AnimationStatus,
    frame: Option<(FrameHandle, Rc<dyn FrameScheduler>)>,
    on_complete: Vec<Box<dyn FnOnce()>>,
    on_settle: Vec<Box<dyn FnOnce(AnimationStatus)>>,
    waker: Option<Waker>,
}

/// Handle to a running (or finished) scroll animation.
///
/// Clones share the same animation. Awaiting the handle resolves once it completes or is
/// cancelled.
#[derive(Clone)]
pub struct Animation {
    state: Rc<RefCell<AnimationState>>,
}

impl Animation {
    fn with_status(status: AnimationStatus) -> Self {
        Self {
            state: Rc::new(RefCell::new(AnimationState {
                status,
                frame: None,
                on_complete: Vec::new(),
                on_settle: Vec::new(),
                waker: None,
            })),
        }
    }

    /// An animation that has already completed.
    pub fn completed() -> Self {
        Self::with_status(AnimationStatus::Completed)
    }

    pub fn status(&self) -> AnimationStatus {
        self.state.borrow().status
    }

    pub fn is_settled(&self) -> bool {
        self.status() != AnimationStatus::Running
    }

    /// Stops the animation. Settle callbacks run; completion callbacks never will.
    pub fn cancel(&self) {
        let (frame, settle, waker) = {
            let mut state = self.state.borrow_mut();
            if state.status != AnimationStatus::Running {
                return;
            }
            state.status = AnimationStatus::Cancelled;
            state.on_complete.clear();
            (
                state.frame.take(),
                mem::take(&mut state.on_settle),
                state.waker.take(),
            )
        };
        if let Some((handle, scheduler)) = frame {
            scheduler.cancel(handle);
        }
        for f in settle {
            f(AnimationStatus::Cancelled);
        }
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Runs `f` when the animation reaches its end. Dropped if it is cancelled first.
    pub fn on_complete(&self, f: impl FnOnce() + 'static) {
        let status = {
            let mut state = self.state.borrow_mut();
            if state.status == AnimationStatus::Running {
                state.on_complete.push(Box::new(f));
                return;
            }
            state.status
        };
        if status == AnimationStatus::Completed {
            f();
        }
    }

    /// Runs `f` once the animation completes or is cancelled.
    pub fn on_settle(&self, f: impl FnOnce(AnimationStatus) + 'static) {
        let status = {
            let mut state = self.state.borrow_mut();
            if state.status == AnimationStatus::Running {
                state.on_settle.push(Box::new(f));
                return;
            }
            state.status
        };
        f(status);
    }

    fn is_running(&self) -> bool {
        self.status() == AnimationStatus::Running
    }

    fn set_frame(&self, handle: FrameHandle, scheduler: Rc<dyn FrameScheduler>) {
        self.state.borrow_mut().frame = Some((handle, scheduler));
    }

    fn complete(&self) {
        let (complete, settle, waker) = {
            let mut state = self.state.borrow_mut();
            if state.status != AnimationStatus::Running {
                return;
            }
            state.status = AnimationStatus::Completed;
            state.frame = None;
            (
                mem::take(&mut state.on_complete),
                mem::take(&mut state.on_settle),
                state.waker.take(),
            )
        };
        for f in complete {
            f();
        }
        for f in settle {
            f(AnimationStatus::Completed);
        }
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

impl Future for Animation {
    type Output = AnimationStatus;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.state.borrow_mut();
        if state.status != AnimationStatus::Running {
            return Poll::Ready(state.status);
        }
        state.waker = Some(cx.waker().clone());
        Poll::Pending
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("status", &self.status())
            .finish()
    }
}

/// Runs [`Tween`]s frame by frame on an injected clock and scheduler.
#[derive(Clone)]
pub struct AnimationDriver {
    clock: Rc<dyn Clock>,
    scheduler: Rc<dyn FrameScheduler>,
    use_clock_time: Rc<Cell<Option<bool>>>,
}

struct Run {
    tween: Tween,
    animation: Animation,
    on_update: RefCell<Box<dyn FnMut(Point)>>,
    driver: AnimationDriver,
}

impl AnimationDriver {
    pub fn new(clock: Rc<dyn Clock>, scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            clock,
            scheduler,
            use_clock_time: Rc::new(Cell::new(None)),
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Interpolates from `from` to `to` over `duration_ms`, calling `on_update` once per frame
    /// and a final time with exactly `to`.
    pub fn run(
        &self,
        from: Point,
        to: Point,
        duration_ms: f64,
        easing: Easing,
        mut on_update: impl FnMut(Point) + 'static,
    ) -> Animation {
        if duration_ms.is_nan() || duration_ms <= 0.0 {
            on_update(to);
            return Animation::completed();
        }

        let animation = Animation::with_status(AnimationStatus::Running);
        let tween = Tween::new(from, to, self.clock.now_ms(), duration_ms, easing);
        vdebug!(?from, ?to, duration_ms, "animation start");

        let run = Rc::new(Run {
            tween,
            animation: animation.clone(),
            on_update: RefCell::new(Box::new(on_update)),
            driver: self.clone(),
        });
        Run::schedule(run);
        animation
    }

    /// Frame timestamps and the clock may disagree on units or origin. The first frame
    /// decides, once per driver, whether frame times are trusted or the clock is read instead.
    fn frame_time(&self, frame_ms: f64) -> f64 {
        let use_clock = match self.use_clock_time.get() {
            Some(v) => v,
            None => {
                let v = (frame_ms > EPOCH_THRESHOLD_MS) != (self.clock.now_ms() > EPOCH_THRESHOLD_MS);
                if v {
                    vwarn!(frame_ms, "animation: frame clock mismatch, using the driver clock");
                }
                self.use_clock_time.set(Some(v));
                v
            }
        };
        if use_clock {
            self.clock.now_ms()
        } else {
            frame_ms
        }
    }
}

impl fmt::Debug for AnimationDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationDriver")
            .field("now_ms", &self.clock.now_ms())
            .field("use_clock_time", &self.use_clock_time.get())
            .finish()
    }
}

impl Run {
    fn schedule(run: Rc<Self>) {
        let scheduler = Rc::clone(&run.driver.scheduler);
        let animation = run.animation.clone();
        let handle = scheduler.register(Box::new(move |t| Run::step(run, t)));
        animation.set_frame(handle, scheduler);
    }

    fn step(run: Rc<Self>, frame_ms: f64) {
        if !run.animation.is_running() {
            return;
        }
        let now = run.driver.frame_time(frame_ms);

        if run.tween.is_done(now) {
            (run.on_update.borrow_mut())(run.tween.to);
            vdebug!(now, "animation complete");
            run.animation.complete();
            return;
        }

        let point = run.tween.sample(now);
        vtrace!(now, x = point.x, y = point.y, "animation frame");
        (run.on_update.borrow_mut())(point);

        // `on_update` may have cancelled us.
        if run.animation.is_running() {
            Run::schedule(run);
        }
    }
}
