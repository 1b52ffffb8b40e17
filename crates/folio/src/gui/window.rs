//! GTK implementations of the orbit host seams: the widget frame clock
//! drives frame loops, and the widget's own size stands in for the viewport.

use gtk::prelude::*;
use gtk4 as gtk;
use orbit::frame::{FrameCallback, FrameClock, ListenerGuard, ResizeCallback, Viewport};
use std::cell::RefCell;
use std::ops::ControlFlow;
use std::time::Duration;

pub struct WidgetClock {
    widget: gtk::DrawingArea,
}

impl WidgetClock {
    pub fn new(widget: &gtk::DrawingArea) -> Self {
        Self {
            widget: widget.clone(),
        }
    }
}

impl FrameClock for WidgetClock {
    fn request_frames(&self, callback: FrameCallback) {
        let callback = RefCell::new(callback);
        let _ = self.widget.add_tick_callback(move |widget, clock| {
            let now = Duration::from_micros(u64::try_from(clock.frame_time()).unwrap_or_default());
            match (&mut *callback.borrow_mut())(now) {
                ControlFlow::Continue(()) => {
                    widget.queue_draw();
                    glib::ControlFlow::Continue
                }
                ControlFlow::Break(()) => glib::ControlFlow::Break,
            }
        });
    }
}

pub struct WidgetViewport {
    widget: gtk::DrawingArea,
    fallback_width: f64,
}

impl WidgetViewport {
    /// `fallback_width` is used until the widget has been allocated.
    pub fn new(widget: &gtk::DrawingArea, fallback_width: f64) -> Self {
        Self {
            widget: widget.clone(),
            fallback_width,
        }
    }
}

impl Viewport for WidgetViewport {
    fn width(&self) -> f64 {
        match self.widget.width() {
            w if w > 0 => f64::from(w),
            _ => self.fallback_width,
        }
    }

    fn on_resize(&self, callback: ResizeCallback) -> ListenerGuard {
        let id = self
            .widget
            .connect_resize(move |_, width, _| callback(f64::from(width)));
        let widget = self.widget.clone();
        ListenerGuard::new(move || widget.disconnect(id))
    }
}
