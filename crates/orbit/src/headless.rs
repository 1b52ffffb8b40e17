//! In-memory hosts for driving the engine without a toolkit.

use crate::frame::{FrameCallback, FrameClock, ListenerGuard, ResizeCallback, Viewport};
use crate::geometry::{Rect, Size};
use crate::stage::Stage;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;
use std::rc::Rc;
use std::time::Duration;

/// Frame clock advanced by hand.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
    callbacks: Rc<RefCell<Vec<FrameCallback>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of loops still registered.
    pub fn pending(&self) -> usize {
        self.callbacks.borrow().len()
    }

    /// Moves time forward by `dt` and runs one refresh.
    pub fn tick(&self, dt: Duration) {
        self.now.set(self.now.get() + dt);
        let now = self.now.get();

        // callbacks may register new loops while running
        let running = std::mem::take(&mut *self.callbacks.borrow_mut());
        let kept: Vec<FrameCallback> = running
            .into_iter()
            .filter_map(|mut cb| match cb(now) {
                ControlFlow::Continue(()) => Some(cb),
                ControlFlow::Break(()) => None,
            })
            .collect();

        let mut callbacks = self.callbacks.borrow_mut();
        let added = std::mem::replace(&mut *callbacks, kept);
        callbacks.extend(added);
    }

    pub fn run(&self, frames: usize, dt: Duration) {
        (0..frames).for_each(|_| self.tick(dt));
    }
}

impl FrameClock for ManualClock {
    fn request_frames(&self, callback: FrameCallback) {
        self.callbacks.borrow_mut().push(callback);
    }
}

/// Viewport whose width is set by the caller; every `resize` notifies.
#[derive(Clone, Default)]
pub struct FixedViewport {
    width: Rc<Cell<f64>>,
    next_id: Rc<Cell<u64>>,
    listeners: Rc<RefCell<BTreeMap<u64, Rc<dyn Fn(f64)>>>>,
}

impl FixedViewport {
    pub fn new(width: f64) -> Self {
        let viewport = Self::default();
        viewport.width.set(width);
        viewport
    }

    pub fn resize(&self, width: f64) {
        self.width.set(width);
        let listeners: Vec<_> = self.listeners.borrow().values().cloned().collect();
        for listener in listeners {
            listener(width);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl Viewport for FixedViewport {
    fn width(&self) -> f64 {
        self.width.get()
    }

    fn on_resize(&self, callback: ResizeCallback) -> ListenerGuard {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().insert(id, Rc::from(callback));

        let listeners = Rc::downgrade(&self.listeners);
        ListenerGuard::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.borrow_mut().remove(&id);
            }
        })
    }
}

/// Fixed measurements for the orbit loop.
#[derive(Debug, Clone, Default)]
pub struct StaticStage {
    container: Option<Size>,
    heading: Option<Rect>,
    detached: BTreeSet<usize>,
}

impl StaticStage {
    pub fn new(container: Size) -> Self {
        Self {
            container: Some(container),
            ..Self::default()
        }
    }

    /// A stage whose container has not been measured yet.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn with_heading(mut self, heading: Rect) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn without_slot(mut self, slot: usize) -> Self {
        self.detached.insert(slot);
        self
    }
}

impl Stage for StaticStage {
    fn container(&self) -> Option<Size> {
        self.container
    }

    fn heading(&self) -> Option<Rect> {
        self.heading
    }

    fn is_attached(&self, slot: usize) -> bool {
        !self.detached.contains(&slot)
    }
}
