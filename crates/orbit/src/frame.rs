//! Seams to the host's scheduler: per-refresh callbacks, resize subscriptions,
//! and the cancellation flag that stops a self-requeuing frame loop.

use std::cell::Cell;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::time::Duration;

/// Called once per display refresh with the host's monotonic frame time.
pub type FrameCallback = Box<dyn FnMut(Duration) -> ControlFlow<()>>;

pub type ResizeCallback = Box<dyn Fn(f64)>;

pub trait FrameClock {
    /// Keeps invoking `callback` on every refresh until it breaks.
    fn request_frames(&self, callback: FrameCallback);
}

pub trait Viewport {
    fn width(&self) -> f64;

    fn on_resize(&self, callback: ResizeCallback) -> ListenerGuard;
}

/// Shared stop flag checked before a loop requeues itself.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` only for the call that actually cancelled.
    pub fn cancel(&self) -> bool {
        !self.0.replace(true)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Deregisters a listener exactly once, on [`release`](Self::release) or drop.
pub struct ListenerGuard {
    release: Option<Box<dyn FnOnce()>>,
}

impl ListenerGuard {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn release(&mut self) -> bool {
        match self.release.take() {
            Some(release) => {
                release();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_idempotent() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        assert!(token.cancel());
        assert!(!token.cancel());
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_guard_releases_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let mut guard = ListenerGuard::new(move || c.set(c.get() + 1));

        assert!(guard.release());
        assert!(!guard.release());
        drop(guard);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        {
            let _guard = ListenerGuard::new(move || c.set(c.get() + 1));
        }
        assert_eq!(count.get(), 1);
    }
}
