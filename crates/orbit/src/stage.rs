use crate::geometry::{Rect, Size};

/// What the rendering layer exposes to the orbit loop.
///
/// The stage owns the element handles; the engine only reads measurements from
/// it. Any of these may be unavailable while the host is still mounting or
/// already tearing down, and the engine treats that as "skip", not as an error.
pub trait Stage {
    fn container(&self) -> Option<Size>;

    /// Heading box in container coordinates.
    fn heading(&self) -> Option<Rect>;

    fn is_attached(&self, _slot: usize) -> bool {
        true
    }
}

impl<S: Stage + ?Sized> Stage for std::cell::RefCell<S> {
    fn container(&self) -> Option<Size> {
        self.try_borrow().ok()?.container()
    }

    fn heading(&self) -> Option<Rect> {
        self.try_borrow().ok()?.heading()
    }

    fn is_attached(&self, slot: usize) -> bool {
        self.try_borrow().is_ok_and(|s| s.is_attached(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::StaticStage;
    use std::cell::RefCell;

    #[test]
    fn test_refcell_stage_reads_through_when_free() {
        let stage = RefCell::new(
            StaticStage::new(Size::new(1200.0, 900.0))
                .with_heading(Rect::new(100.0, 100.0, 400.0, 200.0))
                .without_slot(3),
        );
        assert_eq!(stage.container(), Some(Size::new(1200.0, 900.0)));
        assert!(stage.heading().is_some());
        assert!(stage.is_attached(0));
        assert!(!stage.is_attached(3));
    }

    #[test]
    fn test_refcell_stage_is_unavailable_while_mutably_borrowed() {
        let stage = RefCell::new(
            StaticStage::new(Size::new(1200.0, 900.0))
                .with_heading(Rect::new(100.0, 100.0, 400.0, 200.0)),
        );
        let writer = stage.borrow_mut();
        assert_eq!(stage.container(), None);
        assert_eq!(stage.heading(), None);
        assert!(!stage.is_attached(0));
        drop(writer);
        assert!(stage.container().is_some());
    }
}
